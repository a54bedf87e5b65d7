//! Spendings is a backend for tracking personal finances.
//!
//! This library provides a JSON REST API, authenticated with JSON Web Tokens,
//! for recording transactions, managing spending categories and computing
//! statistics over a period. All data lives in memory and is periodically
//! backed up to JSON files.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::{signal, sync::watch};

mod app_state;
mod auth;
mod backup;
mod category;
mod config;
mod date;
mod endpoints;
mod logging;
mod pagination;
mod recurring;
mod repeat_spec;
mod routing;
mod statistics;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{AuthError, AuthState, Claims};
pub use backup::{Backup, BackupService};
pub use category::{
    BASE_CATEGORIES, CategoriesByUser, Category, CategoryName, CategoryStore, INCOME_CATEGORY,
};
pub use config::{FinancialData, load_financial_data, load_revoked_tokens};
pub use date::{format_date, parse_date};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use pagination::PaginationConfig;
pub use recurring::{RECURRENCE_INTERVAL, RecurringTransactionsService};
pub use repeat_spec::{RepeatSpec, RepeatToken, compute_next_occurrence, validate_repeat_spec};
pub use routing::{MAX_REQUEST_BODY_BYTES, build_router};
pub use statistics::{
    GeneralStatistics, MAX_PERIOD_DAYS, SpendingCurvePoint, Statistics, StatisticsService,
    TransactionProvider, resolve_period,
};
pub use timezone::LocalClock;
pub use transaction::{
    NewTransaction, Transaction, TransactionId, TransactionPage, TransactionQuery,
    TransactionStore, TransactionsByUser, UserTransactions,
};

/// The identifier of an authenticated user, taken from the `jti` claim of their token.
pub type UserId = String;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server and the background services to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`. `true` is sent on `shutdown` once a signal arrives.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>, shutdown: watch::Sender<bool>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
        },
    }

    handle.graceful_shutdown(Some(Duration::from_secs(1)));

    if shutdown.send(true).is_err() {
        tracing::debug!("All background services had already stopped.");
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A date, repeat spec, category name or query parameter was malformed.
    ///
    /// The message names the offending value and is safe to show to the client.
    #[error("{0}")]
    InvalidFormat(String),

    /// The requested resource was not found.
    ///
    /// Only raised by operations that update an existing resource. Deleting a
    /// missing transaction is not an error.
    #[error("the requested resource could not be found")]
    NotFound,

    /// A resource with the same identity already exists, e.g. a category whose
    /// name differs from an existing one only in case.
    #[error("{0}")]
    Conflict(String),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// An error occurred while serializing or deserializing JSON.
    #[error("could not (de)serialize JSON: {0}")]
    JsonSerialization(String),

    /// An error occurred while reading or writing a file.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::JsonSerialization(value.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Io(value.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Error::InvalidFormat(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            Error::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            Error::Conflict(_) => (StatusCode::CONFLICT, self.to_string()),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred, check the server logs for more details."
                        .to_owned(),
                )
            }
        };

        if status.is_client_error() {
            tracing::warn!("Rejected request: {message}");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}
