use axum::{
    extract::{Path, State},
    http::StatusCode,
};

use crate::auth::Claims;

use super::{TransactionId, TransactionState};

/// A route handler for deleting a transaction.
///
/// Always responds with `204 No Content`, deleting a transaction that does not exist is not an error.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    claims: Claims,
    Path(transaction_id): Path<TransactionId>,
) -> StatusCode {
    state.store.delete(&claims.jti, &transaction_id).await;

    StatusCode::NO_CONTENT
}
