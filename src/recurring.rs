//! The daily background task that spawns the next occurrence of recurring transactions.

use std::{sync::Arc, time::Duration};

use tokio::{sync::watch, time::MissedTickBehavior};

use crate::{timezone::LocalClock, transaction::TransactionStore};

/// How often recurring transactions are checked.
pub const RECURRENCE_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Materializes due recurring transactions once at startup and then on a fixed interval.
#[derive(Debug, Clone)]
pub struct RecurringTransactionsService {
    store: Arc<TransactionStore>,
    clock: LocalClock,
    interval: Duration,
}

impl RecurringTransactionsService {
    /// Create a service that checks `store` every [RECURRENCE_INTERVAL].
    pub fn new(store: Arc<TransactionStore>, clock: LocalClock) -> Self {
        Self {
            store,
            clock,
            interval: RECURRENCE_INTERVAL,
        }
    }

    /// Spawn every recurring transaction due today. Returns how many were created.
    pub async fn process(&self) -> usize {
        let today = self.clock.today();
        tracing::info!("Processing recurring transactions for {today}");

        let created = self.store.materialize_recurrences(today).await;
        tracing::info!("Recurring transactions processed, {created} created");

        created
    }

    /// Process immediately and then once every interval until `shutdown` is set.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!("Starting recurring transactions service");

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.process().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Recurring transactions service stopped");
    }
}
