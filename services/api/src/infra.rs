use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use scoreboard::error::AppError;
use scoreboard::fixtures::FixtureImporter;
use scoreboard::standings::{
    EvaluationConfig, InMemoryBadgeStore, InMemoryScoreboardRepository, MonthPeriod,
    ScoreboardService,
};
use tracing::info;

use crate::demo::demo_fixture;

pub(crate) type MemoryScoreboardService =
    ScoreboardService<InMemoryScoreboardRepository, InMemoryBadgeStore>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// CSV exports from `data_dir` when given, otherwise the built-in demo team
/// with history leading up to `today`.
pub(crate) fn load_repository(
    data_dir: Option<&Path>,
    today: NaiveDate,
) -> Result<InMemoryScoreboardRepository, AppError> {
    let fixture = match data_dir {
        Some(dir) => FixtureImporter::from_dir(dir, MonthPeriod::from_date(today))?,
        None => {
            info!(%today, "no data directory configured; using demo roster");
            demo_fixture(today)
        }
    };
    let repository = InMemoryScoreboardRepository::from_fixture(fixture);
    info!(
        employees = repository.employee_count(),
        tasks = repository.task_count(),
        "scoreboard repository loaded"
    );
    Ok(repository)
}

pub(crate) fn build_service(
    data_dir: Option<&Path>,
    config: EvaluationConfig,
    today: NaiveDate,
) -> Result<(Arc<MemoryScoreboardService>, InMemoryBadgeStore), AppError> {
    let repository = load_repository(data_dir, today)?;
    let store = InMemoryBadgeStore::default();
    let service = Arc::new(ScoreboardService::new(
        Arc::new(repository),
        Arc::new(store.clone()),
        config,
    ));
    Ok((service, store))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_month(raw: &str) -> Result<MonthPeriod, String> {
    raw.trim()
        .parse::<MonthPeriod>()
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM ({err})"))
}
