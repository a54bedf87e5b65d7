//! The in-memory store of user-created categories.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{Error, backup::Backup};

use super::{BASE_CATEGORIES, CategoriesByUser, Category, CategoryName};

/// Stores the categories users created, alongside the fixed base categories.
#[derive(Debug)]
pub struct CategoryStore {
    base_categories: Vec<Category>,
    user_categories: RwLock<CategoriesByUser>,
}

impl CategoryStore {
    /// Create a store from previously saved user categories.
    pub fn new(initial_data: CategoriesByUser) -> Self {
        Self {
            base_categories: BASE_CATEGORIES
                .iter()
                .map(|name| Category {
                    name: CategoryName::new_unchecked(name),
                })
                .collect(),
            user_categories: RwLock::new(initial_data),
        }
    }

    /// Get the base categories followed by the user's own, in creation order.
    ///
    /// A non-empty `name_filter` keeps only the categories whose name starts
    /// with it, ignoring case.
    pub async fn get_categories(&self, user_id: &str, name_filter: &str) -> Vec<Category> {
        let user_categories = self.user_categories.read().await;

        self.base_categories
            .iter()
            .chain(user_categories.get(user_id).into_iter().flatten())
            .filter(|category| name_filter.is_empty() || category.name.starts_with(name_filter))
            .cloned()
            .collect()
    }

    /// Create a category for the user.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidFormat] if `name` is blank, or [Error::Conflict]
    /// if the name matches one of the user's categories or a base category, ignoring case.
    pub async fn create_category(&self, user_id: &str, name: &str) -> Result<Category, Error> {
        let name = CategoryName::new(name)?;

        if self
            .base_categories
            .iter()
            .any(|category| category.name.matches(name.as_ref()))
        {
            return Err(Error::Conflict(format!(
                "category with name '{name}' already exists in base categories"
            )));
        }

        let mut user_categories = self.user_categories.write().await;
        let categories = user_categories.entry(user_id.to_owned()).or_default();

        if categories
            .iter()
            .any(|category| category.name.matches(name.as_ref()))
        {
            return Err(Error::Conflict(format!(
                "category with name '{name}' already exists"
            )));
        }

        let category = Category { name };
        categories.push(category.clone());
        tracing::debug!("User {user_id} created category {}", category.name);

        Ok(category)
    }

    /// A deep copy of every user's own categories.
    pub async fn snapshot(&self) -> CategoriesByUser {
        self.user_categories.read().await.clone()
    }
}

#[async_trait]
impl Backup for CategoryStore {
    async fn backup_data(&self) -> Result<serde_json::Value, Error> {
        Ok(serde_json::to_value(self.snapshot().await)?)
    }

    fn backup_file_name(&self) -> &'static str {
        "categories"
    }
}
