use std::collections::HashSet;
use std::sync::Arc;
use std::thread::{self, ScopedJoinHandle};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::badges::{
    BadgeCatalog, BadgeEvaluator, BadgeSet, BadgeView, EvaluationConfig, EvaluationSnapshot,
    SprintParticipant, SprintSnapshot,
};
use super::domain::{
    CompletedTask, DateRange, Employee, EmployeeFilter, EmployeeId, MonthPeriod,
    MonthlyAggregate, MonthlyTarget, YearlyAggregate,
};
use super::period::PeriodClassifier;
use super::ranking::{rank_monthly, rank_yearly, Ranking};
use super::repository::{BadgeRecord, BadgeStore, RepositoryError, ScoreboardRepository};

/// Service composing the data providers, the ranking engine, and the badge
/// evaluator.
pub struct ScoreboardService<R, S> {
    repository: Arc<R>,
    store: Arc<S>,
    evaluator: Arc<BadgeEvaluator>,
}

/// Roster-wide reads shared by every employee's evaluation.
struct SharedReads {
    monthly: Vec<MonthlyAggregate>,
    yearly: Vec<YearlyAggregate>,
    sprint: Option<SprintSnapshot>,
}

/// Reads scoped to a single employee.
struct PersonalReads {
    targets: Vec<MonthlyTarget>,
    tasks: Vec<CompletedTask>,
}

impl<R, S> ScoreboardService<R, S>
where
    R: ScoreboardRepository + 'static,
    S: BadgeStore + 'static,
{
    pub fn new(repository: Arc<R>, store: Arc<S>, config: EvaluationConfig) -> Self {
        Self {
            repository,
            store,
            evaluator: Arc::new(BadgeEvaluator::new(config)),
        }
    }

    pub fn config(&self) -> &EvaluationConfig {
        self.evaluator.config()
    }

    pub fn catalog(&self) -> Vec<BadgeView> {
        BadgeCatalog::render(&BadgeSet::new())
    }

    /// Eligible employees. An empty directory means the read failed upstream.
    pub fn roster(&self) -> Result<Vec<Employee>, ScoreboardServiceError> {
        let roster: Vec<Employee> = self
            .repository
            .employees(EmployeeFilter::scoreboard())?
            .into_iter()
            .filter(Employee::is_eligible)
            .collect();

        if roster.is_empty() {
            return Err(RepositoryError::Unavailable(
                "employee directory returned no employees".to_string(),
            )
            .into());
        }

        Ok(roster)
    }

    /// Reads everything needed to evaluate one employee as of `today`.
    pub fn snapshot(
        &self,
        employee_id: &EmployeeId,
        today: NaiveDate,
    ) -> Result<(Employee, EvaluationSnapshot), ScoreboardServiceError> {
        let roster = self.roster()?;
        let employee = find_employee(&roster, employee_id)?;
        let classifier = self.classifier(today);
        let years = classifier.lookback_years(self.config().lookback_years);

        let (shared, personal) = thread::scope(|scope| {
            let shared = scope.spawn(|| self.read_shared(&roster, &classifier, &years));
            let personal = scope.spawn(|| self.read_personal(employee_id, &years));
            (join_read(shared), join_read(personal))
        });

        let snapshot = assemble_snapshot(employee_id, today, &shared?, personal?);
        Ok((employee, snapshot))
    }

    pub fn employee_badges(
        &self,
        employee_id: &EmployeeId,
        today: NaiveDate,
    ) -> Result<EmployeeBadgeReport, ScoreboardServiceError> {
        let (employee, snapshot) = self.snapshot(employee_id, today)?;
        let achieved = self.evaluator.evaluate(&snapshot);
        Ok(EmployeeBadgeReport::new(employee, today, achieved))
    }

    pub fn monthly_leaderboard(
        &self,
        period: MonthPeriod,
    ) -> Result<Leaderboard, ScoreboardServiceError> {
        let roster = self.roster()?;
        let aggregates = on_roster_monthly(
            &roster,
            self.repository.monthly_aggregates(&[period.year])?,
        );
        let ranking = rank_monthly(period, &aggregates);
        Ok(Leaderboard::from_ranking(
            LeaderboardScope::Month { period },
            &ranking,
            &roster,
        ))
    }

    pub fn yearly_leaderboard(&self, year: i32) -> Result<Leaderboard, ScoreboardServiceError> {
        let roster = self.roster()?;
        let aggregates = on_roster_yearly(&roster, self.repository.yearly_aggregates(&[year])?);
        let ranking = rank_yearly(year, &aggregates);
        Ok(Leaderboard::from_ranking(
            LeaderboardScope::Year { year },
            &ranking,
            &roster,
        ))
    }

    pub fn target_progress(
        &self,
        employee_id: &EmployeeId,
        period: MonthPeriod,
    ) -> Result<TargetProgress, ScoreboardServiceError> {
        let roster = self.roster()?;
        find_employee(&roster, employee_id)?;

        let (aggregates, targets) = thread::scope(|scope| {
            let aggregates = scope.spawn(|| self.repository.monthly_aggregates(&[period.year]));
            let targets = scope
                .spawn(|| self.repository.monthly_targets(employee_id, &[period.year]));
            (join_read(aggregates), join_read(targets))
        });

        let total_points = aggregates?
            .iter()
            .find(|aggregate| &aggregate.employee_id == employee_id && aggregate.period == period)
            .map(|aggregate| aggregate.total_points)
            .unwrap_or(0);
        let target_points = targets?
            .iter()
            .find(|target| target.period == period && target.target_points > 0)
            .map(|target| target.target_points);

        Ok(TargetProgress::new(
            employee_id.clone(),
            period,
            total_points,
            target_points,
        ))
    }

    /// Batch job: evaluates every eligible employee and writes each badge set
    /// to the store. Read failures abort the run; store failures are counted.
    pub fn recompute_all(
        &self,
        today: NaiveDate,
    ) -> Result<RecomputeSummary, ScoreboardServiceError> {
        let roster = self.roster()?;
        let classifier = self.classifier(today);
        let years = classifier.lookback_years(self.config().lookback_years);
        let shared = self.read_shared(&roster, &classifier, &years)?;

        let mut summary = RecomputeSummary {
            evaluated_on: today,
            evaluated: 0,
            stored: 0,
            store_failures: 0,
            records: Vec::with_capacity(roster.len()),
        };

        for employee in &roster {
            let personal = self.read_personal(&employee.id, &years)?;
            let snapshot = assemble_snapshot(&employee.id, today, &shared, personal);
            let achieved = self.evaluator.evaluate(&snapshot);
            summary.evaluated += 1;

            let record = BadgeRecord {
                employee_id: employee.id.clone(),
                evaluated_on: today,
                achieved,
            };
            match self.store.record(record.clone()) {
                Ok(()) => summary.stored += 1,
                Err(err) => {
                    warn!(employee = %employee.id, error = %err, "failed to store badge record");
                    summary.store_failures += 1;
                }
            }
            summary.records.push(record);
        }

        info!(
            evaluated = summary.evaluated,
            stored = summary.stored,
            store_failures = summary.store_failures,
            %today,
            "badge recompute finished"
        );

        Ok(summary)
    }

    fn classifier(&self, today: NaiveDate) -> PeriodClassifier {
        PeriodClassifier::new(today, self.config().cutoff_year)
    }

    fn read_shared(
        &self,
        roster: &[Employee],
        classifier: &PeriodClassifier,
        years: &[i32],
    ) -> Result<SharedReads, RepositoryError> {
        let repository = self.repository.as_ref();
        let (monthly, yearly, sprint) = thread::scope(|scope| {
            let monthly = scope.spawn(|| repository.monthly_aggregates(years));
            let yearly = scope.spawn(|| repository.yearly_aggregates(years));
            let sprint = scope.spawn(|| match classifier.previous_complete_month() {
                Some(period) => read_sprint(repository, roster, period).map(Some),
                None => Ok(None),
            });
            (join_read(monthly), join_read(yearly), join_read(sprint))
        });

        let shared = SharedReads {
            monthly: on_roster_monthly(roster, monthly?),
            yearly: on_roster_yearly(roster, yearly?),
            sprint: sprint?,
        };
        debug!(
            monthly_rows = shared.monthly.len(),
            yearly_rows = shared.yearly.len(),
            sprint = shared.sprint.is_some(),
            "read roster aggregates"
        );
        Ok(shared)
    }

    fn read_personal(
        &self,
        employee_id: &EmployeeId,
        years: &[i32],
    ) -> Result<PersonalReads, RepositoryError> {
        let repository = self.repository.as_ref();
        let range = match (years.first(), years.last()) {
            (Some(first), Some(last)) => DateRange::for_years(*first, *last),
            _ => {
                return Ok(PersonalReads {
                    targets: Vec::new(),
                    tasks: Vec::new(),
                })
            }
        };

        let (targets, tasks) = thread::scope(|scope| {
            let targets = scope.spawn(|| repository.monthly_targets(employee_id, years));
            let tasks = scope.spawn(|| repository.completed_tasks(employee_id, range));
            (join_read(targets), join_read(tasks))
        });

        Ok(PersonalReads {
            targets: targets?,
            tasks: tasks?,
        })
    }
}

fn read_sprint<R: ScoreboardRepository>(
    repository: &R,
    roster: &[Employee],
    period: MonthPeriod,
) -> Result<SprintSnapshot, RepositoryError> {
    let mut participants = Vec::with_capacity(roster.len());
    for employee in roster {
        let target_points = repository
            .monthly_targets(&employee.id, &[period.year])?
            .into_iter()
            .find(|target| target.period == period)
            .map(|target| target.target_points);
        let tasks = repository.completed_tasks(&employee.id, period.date_range())?;
        participants.push(SprintParticipant {
            employee_id: employee.id.clone(),
            target_points,
            tasks,
        });
    }

    Ok(SprintSnapshot {
        period,
        participants,
    })
}

fn join_read<T>(
    handle: ScopedJoinHandle<'_, Result<T, RepositoryError>>,
) -> Result<T, RepositoryError> {
    handle
        .join()
        .unwrap_or_else(|_| Err(RepositoryError::Unavailable("reader thread panicked".to_string())))
}

fn assemble_snapshot(
    employee_id: &EmployeeId,
    today: NaiveDate,
    shared: &SharedReads,
    personal: PersonalReads,
) -> EvaluationSnapshot {
    EvaluationSnapshot {
        today,
        employee_id: employee_id.clone(),
        monthly_aggregates: shared.monthly.clone(),
        yearly_aggregates: shared.yearly.clone(),
        targets: personal.targets,
        tasks: personal.tasks,
        sprint: shared.sprint.clone(),
    }
}

fn find_employee(
    roster: &[Employee],
    employee_id: &EmployeeId,
) -> Result<Employee, ScoreboardServiceError> {
    roster
        .iter()
        .find(|employee| &employee.id == employee_id)
        .cloned()
        .ok_or_else(|| ScoreboardServiceError::NotFound(employee_id.clone()))
}

fn roster_ids(roster: &[Employee]) -> HashSet<&EmployeeId> {
    roster.iter().map(|employee| &employee.id).collect()
}

fn on_roster_monthly(roster: &[Employee], rows: Vec<MonthlyAggregate>) -> Vec<MonthlyAggregate> {
    let ids = roster_ids(roster);
    rows.into_iter()
        .filter(|row| ids.contains(&row.employee_id))
        .collect()
}

fn on_roster_yearly(roster: &[Employee], rows: Vec<YearlyAggregate>) -> Vec<YearlyAggregate> {
    let ids = roster_ids(roster);
    rows.into_iter()
        .filter(|row| ids.contains(&row.employee_id))
        .collect()
}

/// Badge outcome for a profile view.
#[derive(Debug, Clone, Serialize)]
pub struct EmployeeBadgeReport {
    pub employee: Employee,
    pub evaluated_on: NaiveDate,
    pub achieved: BadgeSet,
    pub badges: Vec<BadgeView>,
}

impl EmployeeBadgeReport {
    fn new(employee: Employee, evaluated_on: NaiveDate, achieved: BadgeSet) -> Self {
        let badges = BadgeCatalog::render(&achieved);
        Self {
            employee,
            evaluated_on,
            achieved,
            badges,
        }
    }

    pub fn achieved_count(&self) -> usize {
        self.achieved.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LeaderboardScope {
    Month { period: MonthPeriod },
    Year { year: i32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub employee_id: EmployeeId,
    pub name: String,
    pub total_points: i64,
    pub task_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Leaderboard {
    pub scope: LeaderboardScope,
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    fn from_ranking(scope: LeaderboardScope, ranking: &Ranking, roster: &[Employee]) -> Self {
        let entries = ranking
            .entries()
            .iter()
            .map(|entry| LeaderboardEntry {
                rank: entry.rank,
                employee_id: entry.employee_id.clone(),
                name: roster
                    .iter()
                    .find(|employee| employee.id == entry.employee_id)
                    .map(|employee| employee.name.clone())
                    .unwrap_or_else(|| entry.employee_id.to_string()),
                total_points: entry.total_points,
                task_count: entry.task_count,
            })
            .collect();

        Self { scope, entries }
    }
}

/// Points against the monthly target for one employee.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetProgress {
    pub employee_id: EmployeeId,
    pub period: MonthPeriod,
    pub total_points: i64,
    pub target_points: Option<i64>,
    pub percent: Option<f64>,
    pub remaining: Option<i64>,
    pub met: bool,
}

impl TargetProgress {
    fn new(
        employee_id: EmployeeId,
        period: MonthPeriod,
        total_points: i64,
        target_points: Option<i64>,
    ) -> Self {
        let percent = target_points.map(|target| total_points as f64 * 100.0 / target as f64);
        let remaining = target_points.map(|target| target.saturating_sub(total_points).max(0));
        let met = target_points
            .map(|target| total_points >= target)
            .unwrap_or(false);

        Self {
            employee_id,
            period,
            total_points,
            target_points,
            percent,
            remaining,
            met,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecomputeSummary {
    pub evaluated_on: NaiveDate,
    pub evaluated: usize,
    pub stored: usize,
    pub store_failures: usize,
    pub records: Vec<BadgeRecord>,
}

/// Error raised by the scoreboard service.
#[derive(Debug, thiserror::Error)]
pub enum ScoreboardServiceError {
    #[error("scoreboard data unavailable: {0}")]
    DataUnavailable(#[from] RepositoryError),
    #[error("employee {0} is not on the scoreboard")]
    NotFound(EmployeeId),
}
