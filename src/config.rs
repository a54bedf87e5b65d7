//! Loading the initial state of the stores and the revoked tokens from disk.
//!
//! Missing or malformed files are not fatal: the server logs a warning and
//! starts with empty data instead.

use std::{collections::HashSet, path::Path};

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{Error, category::CategoriesByUser, transaction::TransactionsByUser};

/// The saved state of every user's transactions and categories.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialData {
    /// Every user's transactions.
    #[serde(default)]
    pub transactions: TransactionsByUser,
    /// Every user's own categories.
    #[serde(default)]
    pub categories: CategoriesByUser,
}

fn load_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, Error> {
    let text = std::fs::read_to_string(path)?;

    Ok(serde_json::from_str(&text)?)
}

/// Load the transactions and categories saved at `path`.
///
/// Returns empty data if the file cannot be read or parsed.
pub fn load_financial_data(path: &Path) -> FinancialData {
    match load_json_file::<FinancialData>(path) {
        Ok(data) => {
            tracing::info!(
                "Loaded financial data for {} users from {}",
                data.transactions.len(),
                path.display()
            );
            data
        }
        Err(error) => {
            tracing::warn!(
                "Can't load financial data from {}: {error}. Starting with empty data.",
                path.display()
            );
            FinancialData::default()
        }
    }
}

/// Load the list of revoked token IDs saved at `path`.
///
/// Returns an empty set if the file cannot be read or parsed.
pub fn load_revoked_tokens(path: &Path) -> HashSet<String> {
    match load_json_file::<Vec<String>>(path) {
        Ok(tokens) => {
            tracing::info!(
                "Loaded {} revoked tokens from {}",
                tokens.len(),
                path.display()
            );
            tokens.into_iter().collect()
        }
        Err(error) => {
            tracing::warn!("Can't load revoked tokens from {}: {error}", path.display());
            HashSet::new()
        }
    }
}
