use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use super::domain::{EmployeeId, MonthPeriod};
use super::repository::{BadgeStore, ScoreboardRepository};
use super::service::{ScoreboardService, ScoreboardServiceError};

/// Router builder exposing badge, leaderboard, and target endpoints.
pub fn standings_router<R, S>(service: Arc<ScoreboardService<R, S>>) -> Router
where
    R: ScoreboardRepository + 'static,
    S: BadgeStore + 'static,
{
    Router::new()
        .route("/api/v1/badges", get(catalog_handler::<R, S>))
        .route(
            "/api/v1/employees/:employee_id/badges",
            get(badges_handler::<R, S>),
        )
        .route(
            "/api/v1/employees/:employee_id/targets/:year/:month",
            get(target_handler::<R, S>),
        )
        .route("/api/v1/leaderboard/:year", get(yearly_handler::<R, S>))
        .route(
            "/api/v1/leaderboard/:year/:month",
            get(monthly_handler::<R, S>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct BadgeQuery {
    #[serde(default)]
    pub(crate) today: Option<String>,
}

pub(crate) async fn catalog_handler<R, S>(
    State(service): State<Arc<ScoreboardService<R, S>>>,
) -> Response
where
    R: ScoreboardRepository + 'static,
    S: BadgeStore + 'static,
{
    (StatusCode::OK, axum::Json(service.catalog())).into_response()
}

pub(crate) async fn badges_handler<R, S>(
    State(service): State<Arc<ScoreboardService<R, S>>>,
    Path(employee_id): Path<String>,
    Query(query): Query<BadgeQuery>,
) -> Response
where
    R: ScoreboardRepository + 'static,
    S: BadgeStore + 'static,
{
    let today = match query.today.as_deref().map(parse_today).transpose() {
        Ok(today) => today.unwrap_or_else(|| Local::now().date_naive()),
        Err(message) => return bad_request(message),
    };

    let employee_id = EmployeeId(employee_id);
    run_blocking(service, move |service| service.employee_badges(&employee_id, today)).await
}

pub(crate) async fn target_handler<R, S>(
    State(service): State<Arc<ScoreboardService<R, S>>>,
    Path((employee_id, year, month)): Path<(String, i32, u32)>,
) -> Response
where
    R: ScoreboardRepository + 'static,
    S: BadgeStore + 'static,
{
    let period = match MonthPeriod::new(year, month) {
        Ok(period) => period,
        Err(err) => return bad_request(err.to_string()),
    };

    let employee_id = EmployeeId(employee_id);
    run_blocking(service, move |service| service.target_progress(&employee_id, period)).await
}

pub(crate) async fn monthly_handler<R, S>(
    State(service): State<Arc<ScoreboardService<R, S>>>,
    Path((year, month)): Path<(i32, u32)>,
) -> Response
where
    R: ScoreboardRepository + 'static,
    S: BadgeStore + 'static,
{
    let period = match MonthPeriod::new(year, month) {
        Ok(period) => period,
        Err(err) => return bad_request(err.to_string()),
    };

    run_blocking(service, move |service| service.monthly_leaderboard(period)).await
}

pub(crate) async fn yearly_handler<R, S>(
    State(service): State<Arc<ScoreboardService<R, S>>>,
    Path(year): Path<i32>,
) -> Response
where
    R: ScoreboardRepository + 'static,
    S: BadgeStore + 'static,
{
    run_blocking(service, move |service| service.yearly_leaderboard(year)).await
}

/// Runs a service read on the blocking pool; reads fan out over scoped
/// threads and must not hold a runtime worker.
async fn run_blocking<R, S, T, F>(service: Arc<ScoreboardService<R, S>>, work: F) -> Response
where
    R: ScoreboardRepository + 'static,
    S: BadgeStore + 'static,
    T: Serialize + Send + 'static,
    F: FnOnce(&ScoreboardService<R, S>) -> Result<T, ScoreboardServiceError> + Send + 'static,
{
    match tokio::task::spawn_blocking(move || work(&service)).await {
        Ok(Ok(value)) => (StatusCode::OK, axum::Json(value)).into_response(),
        Ok(Err(err)) => service_error_response(err),
        Err(join_error) => {
            error!(error = %join_error, "scoreboard read task failed");
            let payload = json!({ "error": "scoreboard read failed" });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

fn parse_today(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

fn bad_request(message: String) -> Response {
    let payload = json!({ "error": message });
    (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
}

fn service_error_response(err: ScoreboardServiceError) -> Response {
    let status = match &err {
        ScoreboardServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ScoreboardServiceError::DataUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    let payload = json!({ "error": err.to_string() });
    (status, axum::Json(payload)).into_response()
}
