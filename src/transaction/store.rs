//! The in-memory transaction store shared by every request.

use std::collections::HashMap;

use async_trait::async_trait;
use time::Date;
use tokio::sync::RwLock;

use crate::{
    Error, UserId,
    backup::Backup,
    repeat_spec::RepeatSpec,
    timezone::LocalClock,
};

use super::{
    core::{NewTransaction, Transaction, TransactionId, new_transaction_id},
    demo::demo_transactions,
    query::{TransactionPage, TransactionQuery, in_date_range, select_page, sort_newest_first},
};

/// A single user's transactions keyed by transaction ID.
pub type UserTransactions = HashMap<TransactionId, Transaction>;

/// Every user's transactions keyed by user ID.
pub type TransactionsByUser = HashMap<UserId, UserTransactions>;

/// Stores every user's transactions in memory.
///
/// A single [RwLock] guards the whole map. Reads share the lock, writes
/// (including seeding a new user's demo data) take it exclusively. Tokio's
/// lock is fair, so a queued writer such as the daily recurrence pass is not
/// starved by a stream of readers.
#[derive(Debug)]
pub struct TransactionStore {
    transactions: RwLock<TransactionsByUser>,
    clock: LocalClock,
    seed_demo_data: bool,
}

impl TransactionStore {
    /// Create a store from previously saved transactions.
    ///
    /// Users seen for the first time are given a set of demo transactions.
    pub fn new(initial_data: TransactionsByUser, clock: LocalClock) -> Self {
        Self {
            transactions: RwLock::new(initial_data),
            clock,
            seed_demo_data: true,
        }
    }

    /// Create a store where users seen for the first time start with no transactions.
    pub fn without_demo_data(initial_data: TransactionsByUser, clock: LocalClock) -> Self {
        Self {
            seed_demo_data: false,
            ..Self::new(initial_data, clock)
        }
    }

    fn initial_user_transactions(&self) -> UserTransactions {
        if self.seed_demo_data {
            demo_transactions(self.clock.today())
        } else {
            UserTransactions::new()
        }
    }

    /// Create the collection for `user_id` if it does not exist yet.
    ///
    /// The read lock is released before the write lock is taken, so another
    /// request may seed the user in between. Seeding only happens if the
    /// collection is still absent once the write lock is held.
    async fn ensure_user(&self, user_id: &str) {
        {
            let transactions = self.transactions.read().await;
            if transactions.contains_key(user_id) {
                return;
            }
        }

        let mut transactions = self.transactions.write().await;
        if !transactions.contains_key(user_id) {
            tracing::debug!("Creating the transaction collection for user {user_id}");
            transactions.insert(user_id.to_owned(), self.initial_user_transactions());
        }
    }

    /// Get one page of a user's transactions, newest first.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidFormat] if the page or page size is less than one.
    pub async fn query(
        &self,
        user_id: &str,
        query: &TransactionQuery,
    ) -> Result<TransactionPage, Error> {
        query.validate()?;
        self.ensure_user(user_id).await;

        let transactions = self.transactions.read().await;
        let page = match transactions.get(user_id) {
            Some(user_transactions) => select_page(user_transactions.values(), query),
            None => select_page(std::iter::empty(), query),
        };

        Ok(page)
    }

    /// Get all of a user's transactions between `from` and `to` (inclusive), newest first.
    ///
    /// Missing bounds are unbounded, so `query_all(user, None, None)` returns the entire history.
    pub async fn query_all(
        &self,
        user_id: &str,
        from: Option<Date>,
        to: Option<Date>,
    ) -> Vec<Transaction> {
        self.ensure_user(user_id).await;

        let transactions = self.transactions.read().await;
        let mut matching: Vec<Transaction> = transactions
            .get(user_id)
            .into_iter()
            .flat_map(|user_transactions| user_transactions.values())
            .filter(|transaction| in_date_range(transaction, from, to))
            .cloned()
            .collect();
        sort_newest_first(&mut matching);

        matching
    }

    /// Create a new transaction and return its ID.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidFormat] if the date or repeat spec is malformed.
    pub async fn create(
        &self,
        user_id: &str,
        new_transaction: NewTransaction,
    ) -> Result<TransactionId, Error> {
        let transaction = new_transaction.into_transaction(new_transaction_id())?;
        let id = transaction.id.clone();

        let mut transactions = self.transactions.write().await;
        transactions
            .entry(user_id.to_owned())
            .or_insert_with(|| self.initial_user_transactions())
            .insert(id.clone(), transaction);

        Ok(id)
    }

    /// Overwrite every field of an existing transaction, keeping its ID.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidFormat] if the date or repeat spec is malformed,
    /// or [Error::NotFound] if the user has no transaction with `id`.
    pub async fn replace(
        &self,
        user_id: &str,
        id: &str,
        new_transaction: NewTransaction,
    ) -> Result<Transaction, Error> {
        let transaction = new_transaction.into_transaction(id.to_owned())?;

        let mut transactions = self.transactions.write().await;
        let existing = transactions
            .entry(user_id.to_owned())
            .or_insert_with(|| self.initial_user_transactions())
            .get_mut(id)
            .ok_or(Error::NotFound)?;
        *existing = transaction.clone();

        Ok(transaction)
    }

    /// Delete a transaction.
    ///
    /// Deleting a transaction that does not exist, or for a user without any
    /// transactions, does nothing.
    pub async fn delete(&self, user_id: &str, id: &str) {
        let mut transactions = self.transactions.write().await;

        let removed = transactions
            .get_mut(user_id)
            .and_then(|user_transactions| user_transactions.remove(id));

        if removed.is_some() {
            tracing::debug!("Deleted transaction {id} for user {user_id}");
        }
    }

    /// Spawn the next occurrence of every recurring transaction due on `today`.
    ///
    /// Each due transaction is copied to a new transaction dated `today` that
    /// keeps the repeat spec and is scheduled for the nearest occurrence of
    /// that spec on or after `today`. The original keeps its place in the
    /// history but its repeat spec is cleared so it never fires again.
    ///
    /// Returns the number of transactions created.
    pub async fn materialize_recurrences(&self, today: Date) -> usize {
        let mut transactions = self.transactions.write().await;
        let mut created = 0;

        for (user_id, user_transactions) in transactions.iter_mut() {
            let due: Vec<TransactionId> = user_transactions
                .values()
                .filter(|transaction| transaction.is_due(today))
                .map(|transaction| transaction.id.clone())
                .collect();

            for id in due {
                let Some(original) = user_transactions.get_mut(&id) else {
                    continue;
                };

                let spec = match RepeatSpec::parse(&original.repeat_spec) {
                    Ok(Some(spec)) => spec,
                    Ok(None) => continue,
                    Err(error) => {
                        tracing::warn!(
                            "Skipping recurring transaction {id} for user {user_id}: {error}"
                        );
                        continue;
                    }
                };

                let next = Transaction {
                    id: new_transaction_id(),
                    amount: original.amount,
                    title: original.title.clone(),
                    category: original.category.clone(),
                    date: today,
                    next_appear_date: Some(spec.next_occurrence(today)),
                    repeat_spec: spec.as_str().to_owned(),
                };
                original.repeat_spec.clear();

                tracing::debug!(
                    "Transaction {id} for user {user_id} repeated as {}",
                    next.id
                );
                user_transactions.insert(next.id.clone(), next);
                created += 1;
            }
        }

        created
    }

    /// A deep copy of every user's transactions.
    ///
    /// Changes to the store after the snapshot is taken do not affect it.
    pub async fn snapshot(&self) -> TransactionsByUser {
        self.transactions.read().await.clone()
    }
}

#[async_trait]
impl Backup for TransactionStore {
    async fn backup_data(&self) -> Result<serde_json::Value, Error> {
        Ok(serde_json::to_value(self.snapshot().await)?)
    }

    fn backup_file_name(&self) -> &'static str {
        "transactions"
    }
}
