//! Implements a struct that holds the state of the REST server.

use std::sync::Arc;

use crate::{
    auth::AuthState, category::CategoryStore, pagination::PaginationConfig,
    statistics::StatisticsService, timezone::LocalClock, transaction::TransactionStore,
};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Every user's transactions.
    pub transaction_store: Arc<TransactionStore>,

    /// Every user's own categories.
    pub category_store: Arc<CategoryStore>,

    /// Computes statistics from the transaction store.
    pub statistics: Arc<StatisticsService>,

    /// Verifies and issues access tokens.
    pub auth: AuthState,

    /// Reports today's date in the server's time zone.
    pub clock: LocalClock,

    /// The config that controls how to page lists of transactions.
    pub pagination_config: PaginationConfig,
}

impl AppState {
    /// Create a new [AppState] around the given stores.
    ///
    /// The statistics are computed from `transaction_store`.
    pub fn new(
        transaction_store: Arc<TransactionStore>,
        category_store: Arc<CategoryStore>,
        auth: AuthState,
        clock: LocalClock,
        pagination_config: PaginationConfig,
    ) -> Self {
        let statistics = Arc::new(StatisticsService::new(transaction_store.clone()));

        Self {
            transaction_store,
            category_store,
            statistics,
            auth,
            clock,
            pagination_config,
        }
    }
}
