use crate::cli::ServeArgs;
use crate::infra::{build_service, AppState};
use crate::routes::with_scoreboard_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Local;
use scoreboard::config::AppConfig;
use scoreboard::error::AppError;
use scoreboard::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let today = Local::now().date_naive();
    let (service, _) = build_service(
        config.scoreboard.data_dir.as_deref(),
        config.scoreboard.evaluation_config(),
        today,
    )?;

    let app = with_scoreboard_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        cutoff_year = config.scoreboard.cutoff_year,
        lookback_years = config.scoreboard.lookback_years,
        "scoreboard service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
