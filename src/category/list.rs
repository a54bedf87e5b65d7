use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::auth::Claims;

use super::{Category, CategoryState};

/// The query parameters for listing categories.
#[derive(Debug, Default, Deserialize)]
pub struct ListCategoriesParams {
    /// Only return categories whose name starts with this, ignoring case.
    #[serde(default)]
    name: String,
}

/// A route handler for getting the base categories and the user's own categories.
pub async fn list_categories_endpoint(
    State(state): State<CategoryState>,
    claims: Claims,
    Query(params): Query<ListCategoriesParams>,
) -> Json<Vec<Category>> {
    Json(state.store.get_categories(&claims.jti, &params.name).await)
}
