use std::sync::Arc;

use axum::response::Response;
use axum::Router;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::standings::{
    standings_router, BadgeEvaluator, BadgeRecord, BadgeSet, BadgeStore, BadgeStoreError,
    CompletedTask, DateRange, Employee, EmployeeFilter, EmployeeId, EvaluationConfig,
    EvaluationSnapshot, InMemoryBadgeStore, InMemoryScoreboardRepository, MonthPeriod,
    MonthlyAggregate, MonthlyTarget, RepositoryError, ScoreboardFixture, ScoreboardRepository,
    ScoreboardService, YearlyAggregate,
};

pub(super) type MemoryService =
    ScoreboardService<InMemoryScoreboardRepository, InMemoryBadgeStore>;

pub(super) fn day(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("valid date")
}

pub(super) fn at(value: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M").expect("valid timestamp")
}

pub(super) fn month(year: i32, month: u32) -> MonthPeriod {
    MonthPeriod::new(year, month).expect("valid month")
}

pub(super) fn id(value: &str) -> EmployeeId {
    EmployeeId::new(value)
}

pub(super) fn employee(value: &str, rank: u32) -> Employee {
    Employee {
        id: id(value),
        name: format!("{} Example", value.to_uppercase()),
        rank: Some(rank),
        is_admin: false,
    }
}

pub(super) fn admin(value: &str) -> Employee {
    Employee {
        id: id(value),
        name: "Administrator".to_string(),
        rank: None,
        is_admin: true,
    }
}

pub(super) fn monthly(employee_id: &str, year: i32, m: u32, points: i64) -> MonthlyAggregate {
    MonthlyAggregate {
        employee_id: id(employee_id),
        period: month(year, m),
        total_points: points,
        task_count: 1,
    }
}

pub(super) fn yearly(employee_id: &str, year: i32, points: i64) -> YearlyAggregate {
    YearlyAggregate {
        employee_id: id(employee_id),
        year,
        total_points: points,
        task_count: 12,
    }
}

pub(super) fn target(employee_id: &str, year: i32, m: u32, points: i64) -> MonthlyTarget {
    MonthlyTarget {
        employee_id: id(employee_id),
        period: month(year, m),
        target_points: points,
    }
}

pub(super) fn task(
    task_id: &str,
    employee_id: &str,
    completed_at: &str,
    points: i64,
) -> CompletedTask {
    CompletedTask {
        id: task_id.to_string(),
        employee_id: id(employee_id),
        completed_at: Some(at(completed_at)),
        override_points: None,
        type_points: Some(points),
    }
}

/// Empty snapshot for `employee_id` as of `today`; tests fill in the rows.
pub(super) fn snapshot(today: &str, employee_id: &str) -> EvaluationSnapshot {
    EvaluationSnapshot {
        today: day(today),
        employee_id: id(employee_id),
        monthly_aggregates: Vec::new(),
        yearly_aggregates: Vec::new(),
        targets: Vec::new(),
        tasks: Vec::new(),
        sprint: None,
    }
}

pub(super) fn evaluate(snapshot: &EvaluationSnapshot) -> BadgeSet {
    BadgeEvaluator::new(EvaluationConfig::default()).evaluate(snapshot)
}

/// Three ranked employees and an administrator with Q1 2026 activity.
///
/// Monthly totals: ana 120/120/140, bob 50/50/60, cy 20/20/10. The
/// administrator outscores everyone in January but never ranks.
pub(super) fn team_fixture() -> ScoreboardFixture {
    ScoreboardFixture {
        employees: vec![
            employee("ana", 1),
            employee("bob", 2),
            employee("cy", 3),
            admin("root"),
        ],
        tasks: vec![
            task("a1", "ana", "2026-01-05 09:00", 40),
            task("a2", "ana", "2026-01-12 09:00", 40),
            task("a3", "ana", "2026-01-20 09:00", 40),
            task("a4", "ana", "2026-02-03 09:00", 60),
            task("a5", "ana", "2026-02-09 09:00", 60),
            task("a6", "ana", "2026-03-04 09:00", 70),
            task("a7", "ana", "2026-03-06 09:00", 70),
            task("b1", "bob", "2026-01-10 09:00", 50),
            task("b2", "bob", "2026-02-10 09:00", 50),
            task("b3", "bob", "2026-03-10 09:00", 30),
            task("b4", "bob", "2026-03-25 09:00", 30),
            task("c1", "cy", "2026-01-15 09:00", 20),
            task("c2", "cy", "2026-02-15 09:00", 20),
            task("c3", "cy", "2026-03-02 09:00", 10),
            task("r1", "root", "2026-01-02 09:00", 500),
        ],
        targets: vec![
            target("ana", 2026, 1, 100),
            target("ana", 2026, 2, 100),
            target("ana", 2026, 3, 100),
            target("bob", 2026, 1, 50),
            target("bob", 2026, 2, 50),
            target("bob", 2026, 3, 50),
        ],
    }
}

pub(super) fn build_service() -> (Arc<MemoryService>, InMemoryBadgeStore) {
    let store = InMemoryBadgeStore::default();
    let service = Arc::new(ScoreboardService::new(
        Arc::new(InMemoryScoreboardRepository::from_fixture(team_fixture())),
        Arc::new(store.clone()),
        EvaluationConfig::default(),
    ));
    (service, store)
}

pub(super) fn service_with<R, S>(repository: R, store: S) -> Arc<ScoreboardService<R, S>>
where
    R: ScoreboardRepository + 'static,
    S: BadgeStore + 'static,
{
    Arc::new(ScoreboardService::new(
        Arc::new(repository),
        Arc::new(store),
        EvaluationConfig::default(),
    ))
}

pub(super) fn router_with_service<R, S>(service: Arc<ScoreboardService<R, S>>) -> Router
where
    R: ScoreboardRepository + 'static,
    S: BadgeStore + 'static,
{
    standings_router(service)
}

pub(super) struct UnavailableRepository;

impl ScoreboardRepository for UnavailableRepository {
    fn employees(&self, _filter: EmployeeFilter) -> Result<Vec<Employee>, RepositoryError> {
        Err(RepositoryError::Unavailable("directory offline".to_string()))
    }

    fn monthly_aggregates(&self, _years: &[i32]) -> Result<Vec<MonthlyAggregate>, RepositoryError> {
        Err(RepositoryError::Unavailable("views offline".to_string()))
    }

    fn yearly_aggregates(&self, _years: &[i32]) -> Result<Vec<YearlyAggregate>, RepositoryError> {
        Err(RepositoryError::Unavailable("views offline".to_string()))
    }

    fn monthly_targets(
        &self,
        _employee_id: &EmployeeId,
        _years: &[i32],
    ) -> Result<Vec<MonthlyTarget>, RepositoryError> {
        Err(RepositoryError::Unavailable("targets offline".to_string()))
    }

    fn completed_tasks(
        &self,
        _employee_id: &EmployeeId,
        _range: DateRange,
    ) -> Result<Vec<CompletedTask>, RepositoryError> {
        Err(RepositoryError::Unavailable("tasks offline".to_string()))
    }
}

/// Directory answers but the aggregate views are down.
pub(super) struct BrokenViewsRepository {
    pub(super) inner: InMemoryScoreboardRepository,
}

impl ScoreboardRepository for BrokenViewsRepository {
    fn employees(&self, filter: EmployeeFilter) -> Result<Vec<Employee>, RepositoryError> {
        self.inner.employees(filter)
    }

    fn monthly_aggregates(&self, _years: &[i32]) -> Result<Vec<MonthlyAggregate>, RepositoryError> {
        Err(RepositoryError::Corrupt("monthly view returned NULL totals".to_string()))
    }

    fn yearly_aggregates(&self, years: &[i32]) -> Result<Vec<YearlyAggregate>, RepositoryError> {
        self.inner.yearly_aggregates(years)
    }

    fn monthly_targets(
        &self,
        employee_id: &EmployeeId,
        years: &[i32],
    ) -> Result<Vec<MonthlyTarget>, RepositoryError> {
        self.inner.monthly_targets(employee_id, years)
    }

    fn completed_tasks(
        &self,
        employee_id: &EmployeeId,
        range: DateRange,
    ) -> Result<Vec<CompletedTask>, RepositoryError> {
        self.inner.completed_tasks(employee_id, range)
    }
}

pub(super) struct FailingBadgeStore;

impl BadgeStore for FailingBadgeStore {
    fn record(&self, _record: BadgeRecord) -> Result<(), BadgeStoreError> {
        Err(BadgeStoreError::Transport("cache offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
