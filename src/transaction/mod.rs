//! Transaction management for the finance backend.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `NewTransaction` for creating and overwriting transactions
//! - The in-memory `TransactionStore` with filtering, paging and recurrence materialization
//! - The route handlers for the transaction API

mod core;
mod create_endpoint;
mod delete_endpoint;
mod demo;
mod edit_endpoint;
mod list_endpoint;
mod query;
mod store;

pub use core::{NewTransaction, Transaction, TransactionId};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::edit_transaction_endpoint;
pub use list_endpoint::list_transactions_endpoint;
pub use query::{TransactionPage, TransactionQuery};
pub use store::{TransactionStore, TransactionsByUser, UserTransactions};

use std::sync::Arc;

use axum::extract::FromRef;

use crate::AppState;

/// The state needed by the transaction route handlers.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The store holding every user's transactions.
    pub store: Arc<TransactionStore>,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: state.transaction_store.clone(),
        }
    }
}
