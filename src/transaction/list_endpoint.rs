use std::{collections::HashSet, sync::Arc};

use axum::{
    Json,
    extract::{FromRef, State},
};
use axum_extra::extract::Query;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::Claims,
    date::parse_optional_date,
    pagination::PaginationConfig,
};

use super::{TransactionPage, TransactionQuery, TransactionStore};

/// The state needed to list a user's transactions.
#[derive(Debug, Clone)]
pub struct ListTransactionsState {
    store: Arc<TransactionStore>,
    pagination_config: PaginationConfig,
}

impl FromRef<AppState> for ListTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: state.transaction_store.clone(),
            pagination_config: state.pagination_config,
        }
    }
}

/// The query parameters for listing transactions.
///
/// `category` may be repeated to select several categories.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTransactionsParams {
    #[serde(default)]
    category: Vec<String>,
    from: Option<String>,
    to: Option<String>,
    page: Option<i64>,
    page_size: Option<i64>,
}

impl ListTransactionsParams {
    fn into_query(self, pagination_config: PaginationConfig) -> Result<TransactionQuery, Error> {
        let page = positive(self.page, pagination_config.default_page, "page")?;
        let page_size = positive(
            self.page_size,
            pagination_config.default_page_size,
            "pageSize",
        )?;

        Ok(TransactionQuery {
            categories: self
                .category
                .into_iter()
                .filter(|category| !category.is_empty())
                .collect::<HashSet<_>>(),
            from: parse_optional_date(self.from.as_deref())?,
            to: parse_optional_date(self.to.as_deref())?,
            page,
            page_size,
        })
    }
}

fn positive(value: Option<i64>, default: u64, name: &str) -> Result<u64, Error> {
    match value {
        None => Ok(default),
        Some(value) => u64::try_from(value)
            .ok()
            .filter(|value| *value >= 1)
            .ok_or_else(|| {
                Error::InvalidFormat(format!("invalid {name} {value}, must be at least 1"))
            }),
    }
}

/// A route handler for getting one page of the user's transactions, newest first.
pub async fn list_transactions_endpoint(
    State(state): State<ListTransactionsState>,
    claims: Claims,
    Query(params): Query<ListTransactionsParams>,
) -> Result<Json<TransactionPage>, Error> {
    let query = params.into_query(state.pagination_config)?;
    let page = state.store.query(&claims.jti, &query).await?;

    Ok(Json(page))
}
