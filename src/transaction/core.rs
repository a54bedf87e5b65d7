//! Defines the core data models for transactions.

use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use crate::{Error, category::INCOME_CATEGORY, date::parse_date, repeat_spec::RepeatSpec};

/// The opaque, unique identifier of a transaction.
pub type TransactionId = String;

/// Create a fresh transaction ID.
pub(crate) fn new_transaction_id() -> TransactionId {
    Uuid::new_v4().to_string()
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// Amounts are stored as positive numbers, whether the transaction is income
/// or an expense is decided by its category (see [INCOME_CATEGORY]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The amount of money spent or earned in this transaction.
    pub amount: f64,
    /// A text description of what the transaction was for.
    pub title: String,
    /// The name of the category the transaction belongs to.
    pub category: String,
    /// When the transaction happened.
    pub date: Date,
    /// When the transaction is next due to repeat.
    ///
    /// Set if and only if the transaction was created with a repeat spec.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_appear_date: Option<Date>,
    /// The repeat spec, empty for transactions that do not repeat.
    ///
    /// Cleared once the transaction has spawned its next occurrence, which
    /// then carries the spec forward.
    #[serde(rename = "repeatTime", default, skip_serializing_if = "String::is_empty")]
    pub repeat_spec: String,
}

impl Transaction {
    /// Whether the transaction counts as income rather than an expense.
    pub fn is_income(&self) -> bool {
        self.category == INCOME_CATEGORY
    }

    /// The signed effect of the transaction on the balance.
    pub fn balance_change(&self) -> f64 {
        if self.is_income() {
            self.amount
        } else {
            -self.amount
        }
    }

    /// Whether the transaction should spawn its next occurrence on `today`.
    pub fn is_due(&self, today: Date) -> bool {
        !self.repeat_spec.is_empty() && self.next_appear_date == Some(today)
    }
}

/// The fields for creating or overwriting a transaction, as sent by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    /// The amount of money spent or earned.
    pub amount: f64,
    /// A text description of what the transaction was for.
    pub title: String,
    /// The name of the category the transaction belongs to.
    pub category: String,
    /// When the transaction happened, formatted as `YYYY-MM-DD`.
    pub date: String,
    /// An optional repeat spec, e.g. `"1, 15"` or `"mon, fri"`.
    #[serde(rename = "repeatTime", default)]
    pub repeat_spec: String,
}

impl NewTransaction {
    /// Validate the fields and build the transaction stored under `id`.
    ///
    /// The next appear date is the nearest occurrence of the repeat spec on or
    /// after the transaction date.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidFormat] if the date is not `YYYY-MM-DD` or the
    /// repeat spec contains an invalid token.
    pub fn into_transaction(self, id: TransactionId) -> Result<Transaction, Error> {
        let date = parse_date(&self.date)?;
        let repeat_spec = RepeatSpec::parse(&self.repeat_spec)?;

        let (next_appear_date, repeat_spec) = match repeat_spec {
            Some(spec) => (Some(spec.next_occurrence(date)), spec.as_str().to_owned()),
            None => (None, String::new()),
        };

        Ok(Transaction {
            id,
            amount: self.amount,
            title: self.title,
            category: self.category,
            date,
            next_appear_date,
            repeat_spec,
        })
    }
}
