use std::sync::Arc;

use axum::{
    Json,
    extract::{FromRef, Query, State},
};
use serde::Deserialize;

use crate::{
    AppState, Error, auth::Claims, date::parse_optional_date, timezone::LocalClock,
};

use super::{Statistics, StatisticsService};

/// The state needed to compute statistics.
#[derive(Debug, Clone)]
pub struct StatisticsState {
    statistics: Arc<StatisticsService>,
    clock: LocalClock,
}

impl FromRef<AppState> for StatisticsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            statistics: state.statistics.clone(),
            clock: state.clock,
        }
    }
}

/// The query parameters for the statistics period, both `YYYY-MM-DD` and optional.
#[derive(Debug, Default, Deserialize)]
pub struct StatisticsParams {
    from: Option<String>,
    to: Option<String>,
}

/// A route handler for getting the user's statistics for a period.
///
/// Without dates the period is the current month in the server's time zone.
pub async fn get_statistics_endpoint(
    State(state): State<StatisticsState>,
    claims: Claims,
    Query(params): Query<StatisticsParams>,
) -> Result<Json<Statistics>, Error> {
    let from = parse_optional_date(params.from.as_deref())?;
    let to = parse_optional_date(params.to.as_deref())?;

    let statistics = state
        .statistics
        .get_statistics(&claims.jti, from, to, state.clock.today())
        .await?;

    Ok(Json(statistics))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::Value;

    use crate::{
        INCOME_CATEGORY, endpoints,
        test_utils::{test_server, test_state, user_token},
        transaction::NewTransaction,
    };

    #[tokio::test]
    async fn returns_statistics_for_period() {
        let state = test_state();
        for (amount, category, date) in [
            (1000.0, INCOME_CATEGORY, "2025-10-02"),
            (300.0, "Food", "2025-10-05"),
        ] {
            state
                .transaction_store
                .create(
                    "alice",
                    NewTransaction {
                        amount,
                        title: "Test".to_owned(),
                        category: category.to_owned(),
                        date: date.to_owned(),
                        repeat_spec: String::new(),
                    },
                )
                .await
                .unwrap();
        }
        let server = test_server(state.clone());

        let response = server
            .get(endpoints::STATISTICS)
            .authorization_bearer(user_token(&state, "alice"))
            .add_query_param("from", "2025-10-01")
            .add_query_param("to", "2025-10-10")
            .await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["generalStatistics"]["balance"], 700.0);
        assert_eq!(body["balanceChangesByDate"]["2025-10-02"], 1000.0);
        assert_eq!(body["balanceChangesByDate"]["2025-10-05"], -300.0);
        assert_eq!(body["balanceChangesByDate"]["2025-10-07"], 0.0);
        assert_eq!(body["spendingCurveInfo"].as_array().map(Vec::len), Some(10));
        assert_eq!(body["fromDate"], "2025-10-01");
        assert_eq!(body["toDate"], "2025-10-10");
    }

    #[tokio::test]
    async fn rejects_inverted_period() {
        let state = test_state();
        let server = test_server(state.clone());

        server
            .get(endpoints::STATISTICS)
            .authorization_bearer(user_token(&state, "alice"))
            .add_query_param("from", "2025-10-10")
            .add_query_param("to", "2025-10-01")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
