use std::{
    fs::OpenOptions,
    net::{IpAddr, SocketAddr},
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
};
use axum_server::Handle;
use clap::Parser;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{
    EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt,
};

use spendings_rs::{
    AppState, AuthState, BackupService, CategoryStore, LocalClock, PaginationConfig,
    RecurringTransactionsService, TransactionStore, build_router, graceful_shutdown,
    load_financial_data, load_revoked_tokens,
};

/// The REST API server for spendings_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The port to serve the API from.
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    port: u16,

    /// The address to listen on.
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    host: IpAddr,

    /// The directory backups are written to.
    #[arg(long, env = "DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// JSON file with the transactions and categories to start with.
    #[arg(long, env = "INITIAL_DATA", default_value = "data/financial_data.json")]
    initial_data: PathBuf,

    /// JSON file with the list of revoked token IDs.
    #[arg(long, env = "REVOKED_TOKENS", default_value = "data/blocked_tokens.json")]
    revoked_tokens: PathBuf,

    /// File that a line is appended to for every token issued through the API.
    #[arg(long, env = "CREATED_TOKENS", default_value = "data/created_tokens.csv")]
    created_tokens: PathBuf,

    /// How often to back up the data, in hours.
    #[arg(long, env = "BACKUP_INTERVAL_HOURS", default_value_t = 24)]
    backup_interval_hours: u64,

    /// The canonical name of the time zone used for "today", e.g. "Pacific/Auckland".
    #[arg(long, env = "TIMEZONE", default_value = "UTC")]
    timezone: String,

    /// The secret used to sign and verify access tokens.
    #[arg(long, env = "SECRET", hide_env_values = true)]
    secret: String,

    /// How long issued tokens stay valid, in days.
    #[arg(long, env = "TOKEN_LIFETIME_DAYS", default_value_t = 30)]
    token_lifetime_days: i64,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    if args.secret.is_empty() {
        tracing::error!("The token secret must not be empty");
        std::process::exit(1);
    }

    let clock = match LocalClock::new(&args.timezone) {
        Ok(clock) => clock,
        Err(error) => {
            tracing::error!("Could not start the server: {error}");
            std::process::exit(1);
        }
    };

    let initial_data = load_financial_data(&args.initial_data);
    let revoked_tokens = load_revoked_tokens(&args.revoked_tokens);

    let transaction_store = Arc::new(TransactionStore::new(initial_data.transactions, clock));
    let category_store = Arc::new(CategoryStore::new(initial_data.categories));
    let auth = AuthState::new(
        &args.secret,
        revoked_tokens,
        time::Duration::days(args.token_lifetime_days),
        Some(args.created_tokens),
    );

    let mut backup_service = BackupService::new(
        &args.data_dir,
        Duration::from_secs(args.backup_interval_hours.max(1) * 60 * 60),
        clock,
    );
    backup_service.register(transaction_store.clone());
    backup_service.register(category_store.clone());
    let backup_service = Arc::new(backup_service);

    let recurring_service = RecurringTransactionsService::new(transaction_store.clone(), clock);

    let state = AppState::new(
        transaction_store,
        category_store,
        auth,
        clock,
        PaginationConfig::default(),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone(), shutdown_tx));

    let backup_task = tokio::spawn({
        let backup_service = backup_service.clone();
        let shutdown_rx = shutdown_rx.clone();
        async move { backup_service.run(shutdown_rx).await }
    });
    let recurring_task = tokio::spawn(async move { recurring_service.run(shutdown_rx).await });

    let router = add_tracing_layer(build_router(state));
    let addr = SocketAddr::new(args.host, args.port);

    tracing::info!("HTTP server listening on {}", addr);
    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("Server error: {error}");
    }

    for (name, task) in [("backup", backup_task), ("recurring transactions", recurring_task)] {
        if let Err(error) = task.await {
            tracing::error!("The {name} service did not stop cleanly: {error}");
        }
    }

    tracing::info!("Performing final backup before exiting");
    if let Err(error) = backup_service.perform_backup().await {
        tracing::error!("Final backup failed: {error}");
    }
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")));

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file))
        .with_filter(filter::LevelFilter::DEBUG);

    tracing_subscriber::registry()
        .with(stdout_log)
        .with(debug_log)
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
