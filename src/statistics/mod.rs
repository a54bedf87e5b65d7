//! Income, expense and spending statistics over a period.

mod aggregation;
mod endpoint;

pub use endpoint::get_statistics_endpoint;

use std::{collections::BTreeMap, fmt::Debug, sync::Arc};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    date::month_bounds,
    transaction::{Transaction, TransactionStore},
};

use aggregation::{balance_changes_by_date, general_statistics, spending_curve};

/// The longest period, in days, statistics can be requested for.
///
/// A response holds one balance change and one spending curve point per day
/// of the period, so this caps the size of a single response.
pub const MAX_PERIOD_DAYS: i64 = 3660;

/// The source of the transactions the statistics are computed from.
#[async_trait]
pub trait TransactionProvider: Debug + Send + Sync {
    /// Get all of a user's transactions between `from` and `to` (inclusive).
    ///
    /// Missing bounds are unbounded.
    async fn transactions_between(
        &self,
        user_id: &str,
        from: Option<Date>,
        to: Option<Date>,
    ) -> Vec<Transaction>;
}

#[async_trait]
impl TransactionProvider for TransactionStore {
    async fn transactions_between(
        &self,
        user_id: &str,
        from: Option<Date>,
        to: Option<Date>,
    ) -> Vec<Transaction> {
        self.query_all(user_id, from, to).await
    }
}

/// The totals over a period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeneralStatistics {
    /// The sum of the income transactions.
    pub income: f64,
    /// The sum of every other transaction.
    pub expenses: f64,
    /// `income - expenses`.
    pub balance: f64,
}

/// The spending on a single day of a period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingCurvePoint {
    /// The total spent on this calendar date across the user's entire history.
    ///
    /// Despite the name this is a total rather than a mean. Zero if nothing
    /// was ever spent on this date.
    pub average_spending: f64,
    /// The total spent on this date within the requested period.
    pub current_spending: f64,
    /// The day of the period.
    pub date: Date,
}

/// The statistics for a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    /// The income, expense and balance totals.
    pub general_statistics: GeneralStatistics,
    /// The net change in balance for every day of the period, including days without transactions.
    pub balance_changes_by_date: BTreeMap<Date, f64>,
    /// The spending for every day of the period, in date order.
    pub spending_curve_info: Vec<SpendingCurvePoint>,
    /// The first day of the period.
    pub from_date: Date,
    /// The last day of the period.
    pub to_date: Date,
}

/// Computes statistics from a user's transactions.
#[derive(Debug, Clone)]
pub struct StatisticsService {
    transactions: Arc<dyn TransactionProvider>,
}

impl StatisticsService {
    /// Create a service that reads transactions from `transactions`.
    pub fn new(transactions: Arc<dyn TransactionProvider>) -> Self {
        Self { transactions }
    }

    /// Compute the statistics for the period from `from` to `to`, inclusive.
    ///
    /// Missing bounds are resolved by [resolve_period] relative to `today`.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidFormat] if the period is inverted or too long.
    pub async fn get_statistics(
        &self,
        user_id: &str,
        from: Option<Date>,
        to: Option<Date>,
        today: Date,
    ) -> Result<Statistics, Error> {
        let (from, to) = resolve_period(from, to, today)?;

        let in_period = self
            .transactions
            .transactions_between(user_id, Some(from), Some(to))
            .await;
        let all_time = self
            .transactions
            .transactions_between(user_id, None, None)
            .await;

        tracing::debug!(
            "Computing statistics for user {user_id} from {from} to {to} over {} transactions",
            in_period.len()
        );

        Ok(Statistics {
            general_statistics: general_statistics(&in_period),
            balance_changes_by_date: balance_changes_by_date(&in_period, from, to),
            spending_curve_info: spending_curve(&in_period, &all_time, from, to),
            from_date: from,
            to_date: to,
        })
    }
}

/// Fill in the missing bounds of a period.
///
/// Without either bound the period is the month containing `today`. With only
/// one bound the period runs to the end of, or from the start of, that bound's month.
///
/// # Errors
///
/// Returns [Error::InvalidFormat] if `from` is after `to` or the period spans
/// more than [MAX_PERIOD_DAYS] days.
pub fn resolve_period(
    from: Option<Date>,
    to: Option<Date>,
    today: Date,
) -> Result<(Date, Date), Error> {
    let bounds = |date: Date| {
        month_bounds(date)
            .ok_or_else(|| Error::InvalidFormat(format!("date {date} is out of range")))
    };

    let (from, to) = match (from, to) {
        (Some(from), Some(to)) => (from, to),
        (Some(from), None) => (from, bounds(from)?.1),
        (None, Some(to)) => (bounds(to)?.0, to),
        (None, None) => bounds(today)?,
    };

    if from > to {
        return Err(Error::InvalidFormat(format!(
            "invalid period, from date {from} is after to date {to}"
        )));
    }

    let days = (to - from).whole_days() + 1;
    if days > MAX_PERIOD_DAYS {
        return Err(Error::InvalidFormat(format!(
            "invalid period of {days} days, must be at most {MAX_PERIOD_DAYS} days"
        )));
    }

    Ok((from, to))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use time::macros::date;

    use crate::{
        Error, INCOME_CATEGORY,
        statistics::{MAX_PERIOD_DAYS, StatisticsService, resolve_period},
        timezone::LocalClock,
        transaction::{NewTransaction, TransactionStore, TransactionsByUser},
    };

    fn new_transaction(amount: f64, category: &str, date: &str) -> NewTransaction {
        NewTransaction {
            amount,
            title: "Test".to_owned(),
            category: category.to_owned(),
            date: date.to_owned(),
            repeat_spec: String::new(),
        }
    }

    async fn service_with(transactions: &[(f64, &str, &str)]) -> StatisticsService {
        let store = TransactionStore::without_demo_data(TransactionsByUser::new(), LocalClock::utc());
        for (amount, category, date) in transactions {
            store
                .create("alice", new_transaction(*amount, category, date))
                .await
                .unwrap();
        }

        StatisticsService::new(Arc::new(store))
    }

    #[test]
    fn defaults_to_current_month() {
        assert_eq!(
            resolve_period(None, None, date!(2024 - 02 - 10)),
            Ok((date!(2024 - 02 - 01), date!(2024 - 02 - 29)))
        );
    }

    #[test]
    fn fills_missing_bound_from_other_bounds_month() {
        assert_eq!(
            resolve_period(Some(date!(2025 - 04 - 10)), None, date!(2025 - 10 - 01)),
            Ok((date!(2025 - 04 - 10), date!(2025 - 04 - 30)))
        );
        assert_eq!(
            resolve_period(None, Some(date!(2025 - 04 - 10)), date!(2025 - 10 - 01)),
            Ok((date!(2025 - 04 - 01), date!(2025 - 04 - 10)))
        );
    }

    #[test]
    fn rejects_inverted_period() {
        assert!(matches!(
            resolve_period(
                Some(date!(2025 - 04 - 10)),
                Some(date!(2025 - 04 - 09)),
                date!(2025 - 10 - 01)
            ),
            Err(Error::InvalidFormat(_))
        ));
    }

    #[test]
    fn accepts_period_of_max_length() {
        let from = date!(2020 - 01 - 01);
        let longest = from + time::Duration::days(MAX_PERIOD_DAYS - 1);

        assert_eq!(
            resolve_period(Some(from), Some(longest), date!(2025 - 10 - 01)),
            Ok((from, longest))
        );
        assert!(matches!(
            resolve_period(
                Some(from),
                Some(longest + time::Duration::days(1)),
                date!(2025 - 10 - 01)
            ),
            Err(Error::InvalidFormat(_))
        ));
    }

    #[test]
    fn rejects_very_long_period() {
        assert!(matches!(
            resolve_period(
                Some(date!(1900 - 01 - 01)),
                Some(date!(2100 - 01 - 01)),
                date!(2025 - 10 - 01)
            ),
            Err(Error::InvalidFormat(_))
        ));
    }

    #[tokio::test]
    async fn income_and_expense_totals() {
        let service = service_with(&[
            (1000.0, INCOME_CATEGORY, "2025-10-02"),
            (300.0, "Food", "2025-10-05"),
        ])
        .await;

        let statistics = service
            .get_statistics(
                "alice",
                Some(date!(2025 - 10 - 01)),
                Some(date!(2025 - 10 - 07)),
                date!(2025 - 10 - 19),
            )
            .await
            .unwrap();

        let general = statistics.general_statistics;
        assert_eq!(general.income, 1000.0);
        assert_eq!(general.expenses, 300.0);
        assert_eq!(general.balance, 700.0);

        assert_eq!(statistics.balance_changes_by_date.len(), 7);
        for (date, change) in &statistics.balance_changes_by_date {
            let want = match *date {
                date if date == date!(2025 - 10 - 02) => 1000.0,
                date if date == date!(2025 - 10 - 05) => -300.0,
                _ => 0.0,
            };
            assert_eq!(*change, want, "balance change on {date}");
        }
    }

    #[tokio::test]
    async fn excludes_transactions_outside_period() {
        let service = service_with(&[
            (50.0, "Food", "2025-09-30"),
            (20.0, "Food", "2025-10-01"),
            (70.0, "Food", "2025-11-01"),
        ])
        .await;

        let statistics = service
            .get_statistics("alice", None, None, date!(2025 - 10 - 19))
            .await
            .unwrap();

        assert_eq!(statistics.from_date, date!(2025 - 10 - 01));
        assert_eq!(statistics.to_date, date!(2025 - 10 - 31));
        assert_eq!(statistics.general_statistics.expenses, 20.0);
        assert_eq!(statistics.spending_curve_info.len(), 31);
    }

    #[tokio::test]
    async fn spending_curve_uses_all_time_same_date_totals() {
        let service = service_with(&[
            (10.0, "Food", "2025-10-03"),
            (5.0, "Transport", "2025-10-03"),
            (500.0, INCOME_CATEGORY, "2025-10-03"),
        ])
        .await;

        let statistics = service
            .get_statistics(
                "alice",
                Some(date!(2025 - 10 - 02)),
                Some(date!(2025 - 10 - 03)),
                date!(2025 - 10 - 19),
            )
            .await
            .unwrap();

        let curve = &statistics.spending_curve_info;
        assert_eq!(curve.len(), 2);
        assert_eq!(curve[0].date, date!(2025 - 10 - 02));
        assert_eq!(curve[0].current_spending, 0.0);
        assert_eq!(curve[0].average_spending, 0.0);
        assert_eq!(curve[1].date, date!(2025 - 10 - 03));
        assert_eq!(curve[1].current_spending, 15.0);
        assert_eq!(curve[1].average_spending, 15.0);
    }

    #[tokio::test]
    async fn serializes_with_wire_names() {
        let service = service_with(&[(4.5, "Food", "2025-10-01")]).await;

        let statistics = service
            .get_statistics(
                "alice",
                Some(date!(2025 - 10 - 01)),
                Some(date!(2025 - 10 - 01)),
                date!(2025 - 10 - 19),
            )
            .await
            .unwrap();

        assert_eq!(
            serde_json::to_value(&statistics).unwrap(),
            json!({
                "generalStatistics": { "income": 0.0, "expenses": 4.5, "balance": -4.5 },
                "balanceChangesByDate": { "2025-10-01": -4.5 },
                "spendingCurveInfo": [{
                    "averageSpending": 4.5,
                    "currentSpending": 4.5,
                    "date": "2025-10-01",
                }],
                "fromDate": "2025-10-01",
                "toDate": "2025-10-01",
            })
        );
    }
}
