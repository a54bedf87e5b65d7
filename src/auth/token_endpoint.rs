use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use time::OffsetDateTime;

use crate::Error;

use super::{AuthError, AuthState, Claims};

/// The query parameters for issuing a token.
#[derive(Debug, Deserialize)]
pub struct CreateTokenParams {
    /// The nickname of the user the token is for.
    #[serde(default)]
    name: String,
    /// Whether the new token may itself issue tokens.
    #[serde(default)]
    admin: bool,
}

/// A route handler for issuing a new token. Only admins may issue tokens.
///
/// Every token gets a fresh ID, so every issued token belongs to a new user.
pub async fn create_token_endpoint(
    State(state): State<AuthState>,
    claims: Claims,
    Query(params): Query<CreateTokenParams>,
) -> Response {
    if !claims.is_admin {
        tracing::warn!(
            "Denied token creation for non-admin {} ({})",
            claims.nickname,
            claims.jti
        );
        return AuthError::Forbidden.into_response();
    }

    let nickname = params.name.trim();
    if nickname.is_empty() {
        return Error::InvalidFormat("token name cannot be empty".to_owned()).into_response();
    }

    let new_claims = state.new_claims(
        &claims.nickname,
        nickname,
        params.admin,
        OffsetDateTime::now_utc(),
    );
    let token = match state.encode(&new_claims) {
        Ok(token) => token,
        Err(error) => return error.into_response(),
    };

    if let Err(error) = state.record_issued_token(&new_claims).await {
        tracing::warn!("Could not record issued token {}: {error}", new_claims.jti);
    }

    tracing::info!(
        "{} issued token {} for {nickname} (admin: {})",
        claims.nickname,
        new_claims.jti,
        new_claims.is_admin
    );

    Json(json!({ "token": token })).into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::Value;

    use crate::{
        endpoints,
        test_utils::{admin_token, test_server, test_state, user_token},
    };

    #[tokio::test]
    async fn admin_can_issue_token() {
        let state = test_state();
        let server = test_server(state.clone());

        let response = server
            .post(endpoints::TOKENS)
            .authorization_bearer(admin_token(&state))
            .add_query_param("name", "bob")
            .await;

        response.assert_status_ok();
        let token = response.json::<Value>()["token"]
            .as_str()
            .expect("response should contain a token")
            .to_owned();
        let claims = state.auth.verify(&token).unwrap();
        assert_eq!(claims.nickname, "bob");
        assert_eq!(claims.iss, "admin");
        assert!(!claims.is_admin);

        server
            .get(endpoints::TRANSACTIONS)
            .authorization_bearer(token)
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn non_admin_cannot_issue_token() {
        let state = test_state();
        let server = test_server(state.clone());

        server
            .post(endpoints::TOKENS)
            .authorization_bearer(user_token(&state, "alice"))
            .add_query_param("name", "bob")
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn token_needs_a_name() {
        let state = test_state();
        let server = test_server(state.clone());

        server
            .post(endpoints::TOKENS)
            .authorization_bearer(admin_token(&state))
            .add_query_param("admin", "true")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
