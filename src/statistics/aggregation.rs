//! The aggregations behind [Statistics](super::Statistics).

use std::collections::{BTreeMap, HashMap};

use time::Date;

use crate::{date::days_inclusive, transaction::Transaction};

use super::{GeneralStatistics, SpendingCurvePoint};

pub(super) fn general_statistics(transactions: &[Transaction]) -> GeneralStatistics {
    let (income, expenses) =
        transactions
            .iter()
            .fold((0.0, 0.0), |(income, expenses), transaction| {
                if transaction.is_income() {
                    (income + transaction.amount, expenses)
                } else {
                    (income, expenses + transaction.amount)
                }
            });

    GeneralStatistics {
        income,
        expenses,
        balance: income - expenses,
    }
}

/// Every day from `from` to `to` mapped to the net change in balance on that day.
///
/// Days without transactions map to zero.
pub(super) fn balance_changes_by_date(
    transactions: &[Transaction],
    from: Date,
    to: Date,
) -> BTreeMap<Date, f64> {
    let mut changes: BTreeMap<Date, f64> = days_inclusive(from, to).map(|date| (date, 0.0)).collect();

    for transaction in transactions {
        *changes.entry(transaction.date).or_default() += transaction.balance_change();
    }

    changes
}

fn spending_by_date(transactions: &[Transaction]) -> HashMap<Date, f64> {
    let mut spending = HashMap::new();

    for transaction in transactions.iter().filter(|t| !t.is_income()) {
        *spending.entry(transaction.date).or_default() += transaction.amount;
    }

    spending
}

/// Compare the spending on each day of the period against the spending on the
/// same date across the entire history.
pub(super) fn spending_curve(
    in_period: &[Transaction],
    all_time: &[Transaction],
    from: Date,
    to: Date,
) -> Vec<SpendingCurvePoint> {
    let current = spending_by_date(in_period);
    let historical = spending_by_date(all_time);

    days_inclusive(from, to)
        .map(|date| SpendingCurvePoint {
            average_spending: historical
                .get(&date)
                .copied()
                .filter(|total| *total > 0.0)
                .unwrap_or(0.0),
            current_spending: current.get(&date).copied().unwrap_or(0.0),
            date,
        })
        .collect()
}
