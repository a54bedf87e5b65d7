//! Token claims, verification and the extractor for authenticated requests.

use std::{collections::HashSet, fmt::Debug, path::PathBuf, sync::Arc};

use axum::{
    Json, RequestPartsExt,
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use time::{Duration, OffsetDateTime};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::{AppState, Error, UserId};

/// The contents of a JSON Web Token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// The unique ID of the token, which doubles as the ID of the user it was issued to.
    pub jti: UserId,
    /// The nickname of whoever issued the token.
    #[serde(default)]
    pub iss: String,
    /// The display name of the user.
    pub nickname: String,
    /// Whether the user may issue new tokens.
    #[serde(default)]
    pub is_admin: bool,
    /// When the token was issued, as a Unix timestamp.
    pub iat: i64,
    /// When the token expires, as a Unix timestamp.
    pub exp: i64,
}

/// The errors that may occur when authenticating a request or issuing a token.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum AuthError {
    /// The token is missing, malformed, expired or has no nickname.
    #[error("unauthorized")]
    Unauthorized,
    /// The token is valid but has been revoked, or lacks the rights for the request.
    #[error("forbidden")]
    Forbidden,
    /// A new token could not be signed.
    #[error("token creation error")]
    TokenCreation,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::TokenCreation => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// The state needed to verify and issue tokens.
#[derive(Clone)]
pub struct AuthState {
    keys: Arc<Keys>,
    validation: Validation,
    revoked_tokens: Arc<HashSet<String>>,
    token_lifetime: Duration,
    token_log: Option<PathBuf>,
}

impl AuthState {
    /// Create the auth state for tokens signed with HS256 using `secret`.
    ///
    /// Tokens whose `jti` is in `revoked_tokens` are rejected. New tokens are
    /// valid for `token_lifetime`. If `token_log` is set, a line is appended to
    /// it for every token issued through the API.
    pub fn new(
        secret: &str,
        revoked_tokens: HashSet<String>,
        token_lifetime: Duration,
        token_log: Option<PathBuf>,
    ) -> Self {
        Self {
            keys: Arc::new(Keys {
                encoding: EncodingKey::from_secret(secret.as_bytes()),
                decoding: DecodingKey::from_secret(secret.as_bytes()),
            }),
            validation: Validation::new(Algorithm::HS256),
            revoked_tokens: Arc::new(revoked_tokens),
            token_lifetime,
            token_log,
        }
    }

    /// Build the claims for a new token with a fresh ID.
    ///
    /// The issue time is backdated by a minute to tolerate clock skew between servers.
    pub fn new_claims(
        &self,
        issuer: &str,
        nickname: &str,
        is_admin: bool,
        now: OffsetDateTime,
    ) -> Claims {
        Claims {
            jti: Uuid::new_v4().to_string(),
            iss: issuer.to_owned(),
            nickname: nickname.to_owned(),
            is_admin,
            iat: (now - Duration::minutes(1)).unix_timestamp(),
            exp: (now + self.token_lifetime).unix_timestamp(),
        }
    }

    /// Sign `claims` into a token.
    ///
    /// # Errors
    ///
    /// Returns [AuthError::TokenCreation] if the token cannot be signed.
    pub fn encode(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.keys.encoding).map_err(|error| {
            tracing::error!("Could not sign token: {error}");
            AuthError::TokenCreation
        })
    }

    /// Check the signature, expiry and revocation of `token`.
    ///
    /// # Errors
    ///
    /// Returns [AuthError::Unauthorized] if the token is invalid, expired or has
    /// an empty nickname, or [AuthError::Forbidden] if it has been revoked.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = decode::<Claims>(token, &self.keys.decoding, &self.validation)
            .map_err(|error| {
                tracing::warn!("Rejected token: {error}");
                AuthError::Unauthorized
            })?
            .claims;

        if claims.nickname.is_empty() {
            tracing::warn!("Rejected token {} with an empty nickname", claims.jti);
            return Err(AuthError::Unauthorized);
        }

        if self.revoked_tokens.contains(&claims.jti) {
            tracing::warn!(
                "Rejected revoked token with nickname {} and id {}",
                claims.nickname,
                claims.jti
            );
            return Err(AuthError::Forbidden);
        }

        Ok(claims)
    }

    /// Append a record of an issued token to the token log, if one is configured.
    ///
    /// # Errors
    ///
    /// Returns [Error::Io] if the log cannot be opened or written to.
    pub async fn record_issued_token(&self, claims: &Claims) -> Result<(), Error> {
        let Some(path) = &self.token_log else {
            return Ok(());
        };

        let line = format!(
            "{};{};{};{}\n",
            claims.iss, claims.nickname, claims.jti, claims.is_admin
        );

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        Ok(())
    }
}

impl Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("revoked_tokens", &self.revoked_tokens.len())
            .field("token_lifetime", &self.token_lifetime)
            .field("token_log", &self.token_log)
            .finish_non_exhaustive()
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

impl<S> FromRequestParts<S> for Claims
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AuthError::Unauthorized)?;

        AuthState::from_ref(state).verify(bearer.token())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use axum::{Router, http::StatusCode, routing::get};
    use axum_test::TestServer;
    use time::{Duration, OffsetDateTime};

    use super::{AuthError, AuthState, Claims};

    fn auth_state(revoked: &[&str]) -> AuthState {
        AuthState::new(
            "foobar",
            revoked.iter().map(|jti| jti.to_string()).collect::<HashSet<_>>(),
            Duration::days(30),
            None,
        )
    }

    #[test]
    fn verify_returns_issued_claims() {
        let state = auth_state(&[]);
        let claims = state.new_claims("admin", "alice", false, OffsetDateTime::now_utc());

        let token = state.encode(&claims).unwrap();

        assert_eq!(state.verify(&token), Ok(claims));
    }

    #[test]
    fn issued_claims_are_backdated_and_expire_after_lifetime() {
        let state = auth_state(&[]);
        let now = OffsetDateTime::now_utc();

        let claims = state.new_claims("admin", "alice", true, now);

        assert_eq!(claims.iat, now.unix_timestamp() - 60);
        assert_eq!(claims.exp, (now + Duration::days(30)).unix_timestamp());
        assert_ne!(
            claims.jti,
            state.new_claims("admin", "alice", true, now).jti
        );
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let other = AuthState::new("not foobar", HashSet::new(), Duration::days(1), None);
        let token = other
            .encode(&other.new_claims("admin", "alice", false, OffsetDateTime::now_utc()))
            .unwrap();

        assert_eq!(auth_state(&[]).verify(&token), Err(AuthError::Unauthorized));
    }

    #[test]
    fn rejects_expired_token() {
        let state = auth_state(&[]);
        let issued = OffsetDateTime::now_utc() - Duration::days(60);
        let token = state
            .encode(&state.new_claims("admin", "alice", false, issued))
            .unwrap();

        assert_eq!(state.verify(&token), Err(AuthError::Unauthorized));
    }

    #[test]
    fn rejects_empty_nickname() {
        let state = auth_state(&[]);
        let token = state
            .encode(&state.new_claims("admin", "", false, OffsetDateTime::now_utc()))
            .unwrap();

        assert_eq!(state.verify(&token), Err(AuthError::Unauthorized));
    }

    #[test]
    fn rejects_revoked_token() {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = Claims {
            jti: "revoked-user".to_owned(),
            iss: "admin".to_owned(),
            nickname: "eve".to_owned(),
            is_admin: false,
            iat: now,
            exp: now + 3600,
        };
        let state = auth_state(&["revoked-user"]);
        let token = state.encode(&claims).unwrap();

        assert_eq!(state.verify(&token), Err(AuthError::Forbidden));
    }

    #[tokio::test]
    async fn extractor_maps_errors_to_status_codes() {
        let state = auth_state(&[]);
        let token = state
            .encode(&state.new_claims("admin", "alice", false, OffsetDateTime::now_utc()))
            .unwrap();
        let app = Router::new()
            .route("/whoami", get(|claims: Claims| async move { claims.nickname }))
            .with_state(state);
        let server = TestServer::try_new(app).expect("Could not create test server.");

        server
            .get("/whoami")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .get("/whoami")
            .authorization_bearer("not-a-token")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        let response = server.get("/whoami").authorization_bearer(token).await;
        response.assert_status_ok();
        response.assert_text("alice");
    }

    #[tokio::test]
    async fn records_issued_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.log");
        let state = AuthState::new("foobar", HashSet::new(), Duration::days(1), Some(path.clone()));
        let claims = state.new_claims("admin", "alice", false, OffsetDateTime::now_utc());

        state.record_issued_token(&claims).await.unwrap();
        state.record_issued_token(&claims).await.unwrap();

        let log = std::fs::read_to_string(path).unwrap();
        let want = format!("admin;alice;{};false\n", claims.jti);
        assert_eq!(log, want.repeat(2));
    }
}
