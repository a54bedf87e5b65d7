//! Periodic JSON backups of the in-memory stores.
//!
//! Each backup run writes one file per registered [Backup] to
//! `<data dir>/backups/<YYYY-MM-DD>/<name>_backup_<HH-MM-SS>.json`.

use std::{
    fmt::Debug,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use async_trait::async_trait;
use time::{
    OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
};
use tokio::{sync::watch, time::MissedTickBehavior};

use crate::{Error, date::format_date, timezone::LocalClock};

const TIME_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[hour]-[minute]-[second]");

/// A component whose state is saved by the [BackupService].
#[async_trait]
pub trait Backup: Send + Sync {
    /// A self-consistent copy of the component's state.
    async fn backup_data(&self) -> Result<serde_json::Value, Error>;

    /// The name backup files of this component start with, e.g. "transactions".
    fn backup_file_name(&self) -> &'static str;
}

/// Saves every registered [Backup] to JSON files on a fixed interval.
pub struct BackupService {
    backups: Vec<Arc<dyn Backup>>,
    data_dir: PathBuf,
    interval: Duration,
    clock: LocalClock,
}

impl BackupService {
    /// Create a service that writes backups under `data_dir` every `interval`.
    pub fn new(data_dir: impl Into<PathBuf>, interval: Duration, clock: LocalClock) -> Self {
        Self {
            backups: Vec::new(),
            data_dir: data_dir.into(),
            interval,
            clock,
        }
    }

    /// Add a component to every future backup.
    pub fn register(&mut self, backup: Arc<dyn Backup>) {
        tracing::info!("Registered backup: {}", backup.backup_file_name());
        self.backups.push(backup);
    }

    /// The directory the backup for `now` is written to.
    fn backup_dir(&self, now: OffsetDateTime) -> PathBuf {
        self.data_dir.join("backups").join(format_date(now.date()))
    }

    /// Back up every registered component once.
    ///
    /// A component that fails to back up is logged and skipped, the others are
    /// still written. Returns the number of components backed up.
    ///
    /// # Errors
    ///
    /// Returns [Error::Io] if the backup directory cannot be created.
    pub async fn perform_backup(&self) -> Result<usize, Error> {
        if self.backups.is_empty() {
            tracing::debug!("No backups registered, skipping backup");
            return Ok(0);
        }

        tracing::info!("Starting backup");

        let now = self.clock.now();
        let dir = self.backup_dir(now);
        tokio::fs::create_dir_all(&dir).await?;

        let timestamp = now
            .format(TIME_FORMAT)
            .map_err(|error| Error::Io(format!("could not format backup timestamp: {error}")))?;

        let mut success_count = 0;
        for backup in &self.backups {
            match write_backup(backup.as_ref(), &dir, &timestamp).await {
                Ok(path) => {
                    tracing::debug!(
                        "Backed up {} to {}",
                        backup.backup_file_name(),
                        path.display()
                    );
                    success_count += 1;
                }
                Err(error) => {
                    tracing::error!("Failed to back up {}: {error}", backup.backup_file_name());
                }
            }
        }

        tracing::info!(
            "Backup completed: {success_count}/{} backed up successfully",
            self.backups.len()
        );

        Ok(success_count)
    }

    /// Back up immediately and then once every interval until `shutdown` is set.
    ///
    /// Failed backups are logged and retried at the next interval.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!("Starting backup service");

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(error) = self.perform_backup().await {
                        tracing::error!("Backup failed: {error}");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Backup service stopped");
    }
}

impl Debug for BackupService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self
            .backups
            .iter()
            .map(|backup| backup.backup_file_name())
            .collect();

        f.debug_struct("BackupService")
            .field("backups", &names)
            .field("data_dir", &self.data_dir)
            .field("interval", &self.interval)
            .finish()
    }
}

async fn write_backup(backup: &dyn Backup, dir: &Path, timestamp: &str) -> Result<PathBuf, Error> {
    let name = backup.backup_file_name();
    if name.is_empty() {
        return Err(Error::Io("empty backup file name".to_owned()));
    }

    let data = backup.backup_data().await?;
    let json = serde_json::to_string_pretty(&data)?;

    let path = dir.join(format!("{name}_backup_{timestamp}.json"));
    tokio::fs::write(&path, json).await?;

    Ok(path)
}
