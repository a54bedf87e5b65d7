//! Filtering, sorting and paging of a user's transactions.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    pagination::{PaginationConfig, page_count, paginate},
};

use super::core::Transaction;

/// Defines which transactions [TransactionStore::query](super::TransactionStore::query) returns.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionQuery {
    /// Only include transactions in one of these categories. Empty means every category.
    pub categories: HashSet<String>,
    /// Only include transactions on or after this date.
    pub from: Option<Date>,
    /// Only include transactions on or before this date.
    pub to: Option<Date>,
    /// The 1-based page to return.
    pub page: u64,
    /// The maximum number of transactions per page.
    pub page_size: u64,
}

impl TransactionQuery {
    /// A query for every transaction, paged per `pagination_config`.
    pub fn new(pagination_config: PaginationConfig) -> Self {
        Self {
            categories: HashSet::new(),
            from: None,
            to: None,
            page: pagination_config.default_page,
            page_size: pagination_config.default_page_size,
        }
    }

    /// Check that the page and page size are at least one.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidFormat] naming the offending parameter.
    pub fn validate(&self) -> Result<(), Error> {
        if self.page < 1 {
            return Err(Error::InvalidFormat(format!(
                "invalid page {}, must be at least 1",
                self.page
            )));
        }

        if self.page_size < 1 {
            return Err(Error::InvalidFormat(format!(
                "invalid page size {}, must be at least 1",
                self.page_size
            )));
        }

        Ok(())
    }

    fn matches(&self, transaction: &Transaction) -> bool {
        in_date_range(transaction, self.from, self.to)
            && (self.categories.is_empty() || self.categories.contains(&transaction.category))
    }
}

impl Default for TransactionQuery {
    fn default() -> Self {
        Self::new(PaginationConfig::default())
    }
}

/// One page of transactions, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPage {
    /// The page that was requested.
    pub current_page: u64,
    /// The number of pages of transactions matching the query.
    pub total_pages: u64,
    /// The transactions on the current page.
    pub data: Vec<Transaction>,
}

pub(super) fn in_date_range(transaction: &Transaction, from: Option<Date>, to: Option<Date>) -> bool {
    from.is_none_or(|from| transaction.date >= from) && to.is_none_or(|to| transaction.date <= to)
}

/// Sort newest first, then by ID to keep the order stable between requests.
pub(super) fn sort_newest_first(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
}

pub(super) fn select_page<'a>(
    transactions: impl Iterator<Item = &'a Transaction>,
    query: &TransactionQuery,
) -> TransactionPage {
    let mut matching: Vec<Transaction> = transactions
        .filter(|transaction| query.matches(transaction))
        .cloned()
        .collect();
    sort_newest_first(&mut matching);

    TransactionPage {
        current_page: query.page,
        total_pages: page_count(matching.len(), query.page_size),
        data: paginate(matching, query.page, query.page_size),
    }
}
