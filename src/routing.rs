//! Application router configuration.

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
};
use serde_json::{Value, json};

use crate::{
    AppState,
    auth::create_token_endpoint,
    category::{create_category_endpoint, list_categories_endpoint},
    endpoints,
    logging::logging_middleware,
    statistics::get_statistics_endpoint,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, edit_transaction_endpoint,
        list_transactions_endpoint,
    },
};

/// The largest request body the server accepts, in bytes.
pub const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;

/// Return a router with all the app's routes.
///
/// Every route except the health check requires a valid bearer token, which
/// the route handlers check by extracting [Claims](crate::Claims).
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::HEALTH, get(get_health))
        .route(endpoints::TOKENS, post(create_token_endpoint))
        .route(
            endpoints::TRANSACTIONS,
            get(list_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            put(edit_transaction_endpoint).delete(delete_transaction_endpoint),
        )
        .route(
            endpoints::CATEGORIES,
            get(list_categories_endpoint).post(create_category_endpoint),
        )
        .route(endpoints::STATISTICS, get(get_statistics_endpoint))
        .layer(middleware::from_fn(logging_middleware))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .with_state(state)
}

/// Report that the server is up.
async fn get_health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
