use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::config::EvaluationConfig;
use crate::standings::domain::{
    CompletedTask, EmployeeId, MonthPeriod, MonthlyAggregate, MonthlyTarget, YearlyAggregate,
};
use crate::standings::period::PeriodClassifier;
use crate::standings::ranking::{rank_monthly, rank_yearly, Ranking};

/// Everything the evaluator needs for one employee, read once from the
/// providers. Aggregates cover every eligible employee so relative badges can
/// compare across the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationSnapshot {
    pub today: NaiveDate,
    pub employee_id: EmployeeId,
    pub monthly_aggregates: Vec<MonthlyAggregate>,
    pub yearly_aggregates: Vec<YearlyAggregate>,
    pub targets: Vec<MonthlyTarget>,
    pub tasks: Vec<CompletedTask>,
    #[serde(default)]
    pub sprint: Option<SprintSnapshot>,
}

/// Roster-wide target race for the most recent complete month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SprintSnapshot {
    pub period: MonthPeriod,
    pub participants: Vec<SprintParticipant>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SprintParticipant {
    pub employee_id: EmployeeId,
    pub target_points: Option<i64>,
    pub tasks: Vec<CompletedTask>,
}

/// Indexed working set derived from a snapshot; restricted to complete
/// periods.
pub(crate) struct EvaluationContext<'a> {
    pub(crate) config: &'a EvaluationConfig,
    pub(crate) classifier: PeriodClassifier,
    pub(crate) employee_id: &'a EmployeeId,
    pub(crate) monthly_rankings: BTreeMap<MonthPeriod, Ranking>,
    pub(crate) yearly_rankings: BTreeMap<i32, Ranking>,
    pub(crate) own_totals: BTreeMap<MonthPeriod, i64>,
    pub(crate) targets: BTreeMap<MonthPeriod, i64>,
    pub(crate) tasks_by_month: BTreeMap<MonthPeriod, Vec<&'a CompletedTask>>,
    pub(crate) sprint: Option<&'a SprintSnapshot>,
}

impl<'a> EvaluationContext<'a> {
    pub(crate) fn build(snapshot: &'a EvaluationSnapshot, config: &'a EvaluationConfig) -> Self {
        let classifier = PeriodClassifier::new(snapshot.today, config.cutoff_year);
        let employee_id = &snapshot.employee_id;

        let mut monthly_rankings = BTreeMap::new();
        for aggregate in &snapshot.monthly_aggregates {
            let period = aggregate.period;
            if !classifier.is_complete_month(period) || monthly_rankings.contains_key(&period) {
                continue;
            }
            monthly_rankings.insert(period, rank_monthly(period, &snapshot.monthly_aggregates));
        }

        let mut yearly_rankings = BTreeMap::new();
        for aggregate in &snapshot.yearly_aggregates {
            let year = aggregate.year;
            if !classifier.is_complete_year(year) || yearly_rankings.contains_key(&year) {
                continue;
            }
            yearly_rankings.insert(year, rank_yearly(year, &snapshot.yearly_aggregates));
        }

        let own_totals = snapshot
            .monthly_aggregates
            .iter()
            .filter(|aggregate| {
                &aggregate.employee_id == employee_id
                    && classifier.is_complete_month(aggregate.period)
            })
            .map(|aggregate| (aggregate.period, aggregate.total_points))
            .collect();

        // Non-positive targets are treated as unset.
        let targets = snapshot
            .targets
            .iter()
            .filter(|target| {
                &target.employee_id == employee_id
                    && target.target_points > 0
                    && classifier.is_complete_month(target.period)
            })
            .map(|target| (target.period, target.target_points))
            .collect();

        let mut tasks_by_month: BTreeMap<MonthPeriod, Vec<&CompletedTask>> = BTreeMap::new();
        for task in &snapshot.tasks {
            if &task.employee_id != employee_id {
                continue;
            }
            let Some(period) = task.completion_month() else {
                continue;
            };
            if classifier.is_complete_month(period) {
                tasks_by_month.entry(period).or_default().push(task);
            }
        }
        for tasks in tasks_by_month.values_mut() {
            tasks.sort_by_key(|task| task.completed_at);
        }

        let sprint = snapshot
            .sprint
            .as_ref()
            .filter(|sprint| Some(sprint.period) == classifier.previous_complete_month());

        Self {
            config,
            classifier,
            employee_id,
            monthly_rankings,
            yearly_rankings,
            own_totals,
            targets,
            tasks_by_month,
            sprint,
        }
    }

    pub(crate) fn monthly_rank(&self, period: MonthPeriod) -> Option<u32> {
        self.monthly_rankings
            .get(&period)
            .and_then(|ranking| ranking.rank_of(self.employee_id))
    }

    /// Complete months in which the employee ranked at or above `max_rank`.
    pub(crate) fn months_ranked_within(&self, max_rank: u32) -> Vec<MonthPeriod> {
        self.monthly_rankings
            .iter()
            .filter_map(|(period, ranking)| {
                ranking
                    .rank_of(self.employee_id)
                    .filter(|rank| *rank <= max_rank)
                    .map(|_| *period)
            })
            .collect()
    }

    /// Complete years in which the employee led the yearly standings.
    pub(crate) fn years_led(&self) -> Vec<i32> {
        self.yearly_rankings
            .iter()
            .filter(|(_, ranking)| ranking.rank_of(self.employee_id) == Some(1))
            .map(|(year, _)| *year)
            .collect()
    }

    pub(crate) fn own_total(&self, period: MonthPeriod) -> i64 {
        self.own_totals.get(&period).copied().unwrap_or(0)
    }

    /// Complete months of the employee's data, grouped by complete year.
    pub(crate) fn months_by_complete_year(&self) -> BTreeMap<i32, Vec<MonthPeriod>> {
        let mut grouped: BTreeMap<i32, Vec<MonthPeriod>> = BTreeMap::new();
        for period in self.own_totals.keys() {
            if self.classifier.is_complete_year(period.year) {
                grouped.entry(period.year).or_default().push(*period);
            }
        }
        grouped
    }

    pub(crate) fn best_own_month(&self) -> Option<i64> {
        self.own_totals.values().copied().max()
    }

    pub(crate) fn best_month_overall(&self) -> Option<i64> {
        self.monthly_rankings
            .values()
            .filter_map(|ranking| ranking.leader().map(|entry| entry.total_points))
            .max()
    }
}
