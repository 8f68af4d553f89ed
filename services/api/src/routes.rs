use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use scoreboard::standings::{standings_router, BadgeStore, ScoreboardRepository, ScoreboardService};
use serde_json::json;
use std::sync::Arc;

/// Scoreboard API plus the operational endpoints.
pub(crate) fn with_scoreboard_routes<R, S>(service: Arc<ScoreboardService<R, S>>) -> axum::Router
where
    R: ScoreboardRepository + 'static,
    S: BadgeStore + 'static,
{
    standings_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::build_service;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::NaiveDate;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use scoreboard::standings::EvaluationConfig;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tower::ServiceExt;

    fn app(ready: bool) -> axum::Router {
        let today = NaiveDate::from_ymd_opt(2026, 4, 10).expect("valid date");
        let (service, _) =
            build_service(None, EvaluationConfig::default(), today).expect("demo service");
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(false)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        state.readiness.store(ready, Ordering::Release);
        with_scoreboard_routes(service).layer(Extension(state))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).expect("request builds")
    }

    #[tokio::test]
    async fn health_is_always_ok() {
        let response = app(false).oneshot(get("/health")).await.expect("responds");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn readiness_follows_flag() {
        let pending = app(false).oneshot(get("/ready")).await.expect("responds");
        assert_eq!(pending.status(), StatusCode::SERVICE_UNAVAILABLE);

        let ready = app(true).oneshot(get("/ready")).await.expect("responds");
        assert_eq!(ready.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn scoreboard_routes_are_mounted() {
        let router = app(true);

        let catalog = router
            .clone()
            .oneshot(get("/api/v1/badges"))
            .await
            .expect("responds");
        assert_eq!(catalog.status(), StatusCode::OK);

        let board = router
            .clone()
            .oneshot(get("/api/v1/leaderboard/2026/3"))
            .await
            .expect("responds");
        assert_eq!(board.status(), StatusCode::OK);

        let admin = router
            .oneshot(get("/api/v1/employees/admin/badges?today=2026-04-10"))
            .await
            .expect("responds");
        assert_eq!(admin.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn metrics_render_as_text() {
        let response = app(true).oneshot(get("/metrics")).await.expect("responds");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok()),
            Some("text/plain; version=0.0.4")
        );
    }
}
