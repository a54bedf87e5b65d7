use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{Error, auth::Claims};

use super::{NewTransaction, TransactionState};

/// A route handler for creating a new transaction.
///
/// Responds with `201 Created` and the ID of the new transaction.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    claims: Claims,
    Json(new_transaction): Json<NewTransaction>,
) -> Result<Response, Error> {
    let id = state.store.create(&claims.jti, new_transaction).await?;
    tracing::info!("User {} created transaction {id}", claims.jti);

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))).into_response())
}
