//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{HeaderMap, HeaderValue, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::routing::MAX_REQUEST_BODY_BYTES;

/// Bodies longer than this many bytes are truncated in the `info` logs.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level with the
/// `Authorization` header redacted. If a body is longer than
/// [LOG_BODY_LENGTH_LIMIT] bytes, it is truncated and the full body is logged
/// at the `debug` level.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match axum::body::to_bytes(body, MAX_REQUEST_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::warn!("Could not read request body for {} {}: {error}", parts.method, parts.uri);
            return (
                StatusCode::PAYLOAD_TOO_LARGE,
                axum::Json(json!({ "error": "request body is too large" })),
            )
                .into_response();
        }
    };

    tracing::info!(
        "Received request: {} {} {:?}\nheaders: {:#?}\nbody: {}",
        parts.method,
        parts.uri,
        parts.version,
        redact_headers(&parts.headers),
        truncate(&String::from_utf8_lossy(&body_bytes))
    );
    log_full_body("request", &body_bytes);

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    tracing::info!(
        "Sending response: {}\nheaders: {:#?}\nbody: {}",
        parts.status,
        parts.headers,
        truncate(&String::from_utf8_lossy(&body_bytes))
    );
    log_full_body("response", &body_bytes);

    Response::from_parts(parts, Body::from(body_bytes))
}

fn redact_headers(headers: &HeaderMap) -> HeaderMap {
    let mut headers = headers.clone();

    if headers.contains_key(AUTHORIZATION) {
        headers.insert(AUTHORIZATION, HeaderValue::from_static("********"));
    }

    headers
}

/// Shorten `body` to at most [LOG_BODY_LENGTH_LIMIT] bytes without splitting a character.
fn truncate(body: &str) -> String {
    if body.len() <= LOG_BODY_LENGTH_LIMIT {
        return format!("{body:?}");
    }

    let mut end = LOG_BODY_LENGTH_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }

    format!("{:?}...", &body[..end])
}

fn log_full_body(kind: &str, body: &Bytes) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::debug!("Full {kind} body: {:?}", String::from_utf8_lossy(body));
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue, header::AUTHORIZATION};

    use super::{LOG_BODY_LENGTH_LIMIT, redact_headers, truncate};

    #[test]
    fn redacts_authorization_header() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer secret"));
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let redacted = redact_headers(&headers);

        assert_eq!(redacted[AUTHORIZATION], "********");
        assert_eq!(redacted["content-type"], "application/json");
    }

    #[test]
    fn short_body_is_not_truncated() {
        assert_eq!(truncate("{\"id\":1}"), "\"{\\\"id\\\":1}\"");
    }

    #[test]
    fn truncates_on_char_boundary() {
        let body = "é".repeat(LOG_BODY_LENGTH_LIMIT);

        let got = truncate(&body);

        assert!(got.ends_with("..."));
        assert_eq!(got, format!("{:?}...", "é".repeat(LOG_BODY_LENGTH_LIMIT / 2)));
    }
}
