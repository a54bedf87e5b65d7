use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::{Error, auth::Claims};

use super::CategoryState;

/// The request body for creating a category.
#[derive(Debug, Deserialize)]
pub struct CategoryFormData {
    /// The name of the new category.
    pub name: String,
}

/// A route handler for creating a category for the user.
///
/// Responds with `201 Created` and the new category.
pub async fn create_category_endpoint(
    State(state): State<CategoryState>,
    claims: Claims,
    Json(new_category): Json<CategoryFormData>,
) -> Result<Response, Error> {
    let category = state
        .store
        .create_category(&claims.jti, &new_category.name)
        .await?;

    Ok((StatusCode::CREATED, Json(category)).into_response())
}
