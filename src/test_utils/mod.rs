#![allow(missing_docs)]

use std::{collections::HashSet, sync::Arc};

use axum_test::TestServer;
use time::{Duration, OffsetDateTime};

use crate::{
    AppState,
    auth::{AuthState, Claims},
    build_router,
    category::{CategoriesByUser, CategoryStore},
    pagination::PaginationConfig,
    timezone::LocalClock,
    transaction::{TransactionStore, TransactionsByUser},
};

pub(crate) const TEST_SECRET: &str = "test-secret";

/// App state with empty stores that do not seed demo data.
pub(crate) fn test_state() -> AppState {
    let clock = LocalClock::utc();

    AppState::new(
        Arc::new(TransactionStore::without_demo_data(
            TransactionsByUser::new(),
            clock,
        )),
        Arc::new(CategoryStore::new(CategoriesByUser::new())),
        AuthState::new(TEST_SECRET, HashSet::new(), Duration::days(30), None),
        clock,
        PaginationConfig::default(),
    )
}

pub(crate) fn test_server(state: AppState) -> TestServer {
    TestServer::try_new(build_router(state)).expect("Could not create test server.")
}

fn token(state: &AppState, user_id: &str, nickname: &str, is_admin: bool) -> String {
    let now = OffsetDateTime::now_utc();
    let claims = Claims {
        jti: user_id.to_owned(),
        iss: "test".to_owned(),
        nickname: nickname.to_owned(),
        is_admin,
        iat: now.unix_timestamp(),
        exp: (now + Duration::hours(1)).unix_timestamp(),
    };

    state.auth.encode(&claims).expect("Could not sign test token.")
}

/// A token for a regular user whose ID is `user_id`.
pub(crate) fn user_token(state: &AppState, user_id: &str) -> String {
    token(state, user_id, user_id, false)
}

/// A token for an admin called "admin".
pub(crate) fn admin_token(state: &AppState) -> String {
    token(state, "admin-id", "admin", true)
}
