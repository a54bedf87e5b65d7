use axum::{
    Json,
    extract::{Path, State},
};

use crate::{Error, auth::Claims};

use super::{NewTransaction, Transaction, TransactionId, TransactionState};

/// A route handler for overwriting every field of an existing transaction.
///
/// Responds with the updated transaction, or `404 Not Found` if the user has
/// no transaction with the given ID.
pub async fn edit_transaction_endpoint(
    State(state): State<TransactionState>,
    claims: Claims,
    Path(transaction_id): Path<TransactionId>,
    Json(new_transaction): Json<NewTransaction>,
) -> Result<Json<Transaction>, Error> {
    let transaction = state
        .store
        .replace(&claims.jti, &transaction_id, new_transaction)
        .await?;

    Ok(Json(transaction))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{
        endpoints::{self, format_endpoint},
        test_utils::{test_server, test_state, user_token},
        transaction::{NewTransaction, Transaction},
    };

    #[tokio::test]
    async fn overwrites_transaction() {
        let state = test_state();
        let id = state
            .transaction_store
            .create(
                "alice",
                NewTransaction {
                    amount: 5.0,
                    title: "Coffee".to_owned(),
                    category: "Food".to_owned(),
                    date: "2025-10-01".to_owned(),
                    repeat_spec: "mon".to_owned(),
                },
            )
            .await
            .unwrap();
        let server = test_server(state.clone());

        let response = server
            .put(&format_endpoint(endpoints::TRANSACTION, &id))
            .authorization_bearer(user_token(&state, "alice"))
            .json(&json!({
                "amount": 6.5,
                "title": "Tea",
                "category": "Food",
                "date": "2025-10-02",
            }))
            .await;

        response.assert_status_ok();
        let transaction = response.json::<Transaction>();
        assert_eq!(transaction.id, id);
        assert_eq!(transaction.title, "Tea");
        assert_eq!(transaction.next_appear_date, None);
        assert_eq!(
            state.transaction_store.query_all("alice", None, None).await,
            vec![transaction]
        );
    }

    #[tokio::test]
    async fn missing_transaction_is_not_found() {
        let state = test_state();
        let server = test_server(state.clone());

        server
            .put(&format_endpoint(endpoints::TRANSACTION, "missing"))
            .authorization_bearer(user_token(&state, "alice"))
            .json(&json!({
                "amount": 6.5,
                "title": "Tea",
                "category": "Food",
                "date": "2025-10-02",
            }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn cannot_edit_another_users_transaction() {
        let state = test_state();
        let id = state
            .transaction_store
            .create(
                "alice",
                NewTransaction {
                    amount: 5.0,
                    title: "Coffee".to_owned(),
                    category: "Food".to_owned(),
                    date: "2025-10-01".to_owned(),
                    repeat_spec: String::new(),
                },
            )
            .await
            .unwrap();
        let server = test_server(state.clone());

        server
            .put(&format_endpoint(endpoints::TRANSACTION, &id))
            .authorization_bearer(user_token(&state, "mallory"))
            .json(&json!({
                "amount": 0.0,
                "title": "Gone",
                "category": "Food",
                "date": "2025-10-02",
            }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
