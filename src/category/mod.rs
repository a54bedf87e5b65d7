//! Spending categories.
//!
//! Every user sees the same fixed set of base categories followed by the
//! categories they created themselves.

mod create;
mod domain;
mod list;
mod store;

pub use create::create_category_endpoint;
pub use domain::{CategoriesByUser, Category, CategoryName};
pub use list::list_categories_endpoint;
pub use store::CategoryStore;

use std::sync::Arc;

use axum::extract::FromRef;

use crate::AppState;

/// The reserved category whose transactions count as income rather than expenses.
///
/// Matched exactly, so imported data must use this name for its income.
pub const INCOME_CATEGORY: &str = "Income";

/// The categories shared by all users, in display order.
pub const BASE_CATEGORIES: [&str; 9] = [
    "Food",
    "Transport",
    "Entertainment",
    "Health",
    "Clothes",
    INCOME_CATEGORY,
    "Education",
    "Gifts",
    "Other",
];

/// The state needed by the category route handlers.
#[derive(Debug, Clone)]
pub struct CategoryState {
    /// The store holding every user's own categories.
    pub store: Arc<CategoryStore>,
}

impl FromRef<AppState> for CategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: state.category_store.clone(),
        }
    }
}
