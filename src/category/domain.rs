//! Core category domain types.

use std::{collections::HashMap, fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, UserId};

/// A validated, non-empty category name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::InvalidFormat] if `name` is empty or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::InvalidFormat(
                "category name cannot be empty".to_owned(),
            ))
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the non-empty invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }

    /// Whether the two names are equal ignoring case.
    pub fn matches(&self, other: &str) -> bool {
        self.0.to_lowercase() == other.to_lowercase()
    }

    /// Whether the name starts with `prefix`, ignoring case.
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.to_lowercase().starts_with(&prefix.to_lowercase())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryName::new(s)
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A category a transaction can be filed under, e.g. 'Food' or 'Income'.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Category {
    /// The display name, unique per user ignoring case.
    pub name: CategoryName,
}

/// Every user's own categories in creation order, keyed by user ID.
pub type CategoriesByUser = HashMap<UserId, Vec<Category>>;

#[cfg(test)]
mod tests {
    use crate::Error;

    use super::CategoryName;

    #[test]
    fn trims_name() {
        let name = CategoryName::new("  Pets ").unwrap();

        assert_eq!(name.as_ref(), "Pets");
    }

    #[test]
    fn rejects_blank_name() {
        assert!(matches!(CategoryName::new(""), Err(Error::InvalidFormat(_))));
        assert!(matches!(
            CategoryName::new(" \t "),
            Err(Error::InvalidFormat(_))
        ));
    }

    #[test]
    fn compares_ignoring_case() {
        let name = CategoryName::new_unchecked("Café");

        assert!(name.matches("CAFÉ"));
        assert!(name.starts_with("ca"));
        assert!(!name.starts_with("cafés"));
    }
}
