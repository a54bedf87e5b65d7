//! The demo transactions a new user starts with.

use time::{Date, Duration};

use crate::{category::INCOME_CATEGORY, date::clamped_date};

use super::{core::Transaction, store::UserTransactions};

/// Build the demo transactions relative to `today`.
///
/// The salary repeats monthly on today's day of the month.
pub(super) fn demo_transactions(today: Date) -> UserTransactions {
    let next_month = today
        .replace_day(1)
        .ok()
        .and_then(|first| first.checked_add(Duration::days(31)))
        .and_then(|next_month| clamped_date(next_month.year(), next_month.month(), today.day()));

    let transactions = [
        Transaction {
            id: "c38bcbd2-e3c5-4a03-9001-bfcf763fbbdf".to_owned(),
            amount: 100.0,
            title: "Water at the gym".to_owned(),
            category: "Food".to_owned(),
            date: today - Duration::days(2),
            next_appear_date: None,
            repeat_spec: String::new(),
        },
        Transaction {
            id: "21867866-21d3-4846-bb5e-c56fbabec4f9".to_owned(),
            amount: 100.0,
            title: "Cinema".to_owned(),
            category: "Entertainment".to_owned(),
            date: today - Duration::days(3),
            next_appear_date: None,
            repeat_spec: String::new(),
        },
        Transaction {
            id: "a4075928-12c4-44e9-ac2a-0cf4230d4575".to_owned(),
            amount: 1000.0,
            title: "Salary".to_owned(),
            category: INCOME_CATEGORY.to_owned(),
            date: today - Duration::days(7),
            repeat_spec: match next_month {
                Some(_) => today.day().to_string(),
                None => String::new(),
            },
            next_appear_date: next_month,
        },
    ];

    transactions
        .into_iter()
        .map(|transaction| (transaction.id.clone(), transaction))
        .collect()
}
