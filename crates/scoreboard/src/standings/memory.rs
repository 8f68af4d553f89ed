use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use super::domain::{
    aggregate_tasks, CompletedTask, DateRange, Employee, EmployeeFilter, EmployeeId,
    MonthlyAggregate, MonthlyTarget, YearlyAggregate,
};
use super::repository::{
    BadgeRecord, BadgeStore, BadgeStoreError, RepositoryError, ScoreboardRepository,
};

/// Raw rows a fixture backend is seeded with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreboardFixture {
    pub employees: Vec<Employee>,
    pub tasks: Vec<CompletedTask>,
    pub targets: Vec<MonthlyTarget>,
}

/// Snapshot-backed repository. Aggregates are derived from the seeded tasks
/// the same way the data store's views roll them up.
#[derive(Debug, Clone, Default)]
pub struct InMemoryScoreboardRepository {
    employees: Vec<Employee>,
    tasks: Vec<CompletedTask>,
    targets: Vec<MonthlyTarget>,
    monthly: Vec<MonthlyAggregate>,
    yearly: Vec<YearlyAggregate>,
}

impl InMemoryScoreboardRepository {
    pub fn from_fixture(fixture: ScoreboardFixture) -> Self {
        let (monthly, yearly) = aggregate_tasks(&fixture.tasks);
        Self {
            employees: fixture.employees,
            tasks: fixture.tasks,
            targets: fixture.targets,
            monthly,
            yearly,
        }
    }

    pub fn employee_count(&self) -> usize {
        self.employees.len()
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }
}

impl ScoreboardRepository for InMemoryScoreboardRepository {
    fn employees(&self, filter: EmployeeFilter) -> Result<Vec<Employee>, RepositoryError> {
        Ok(self
            .employees
            .iter()
            .filter(|employee| !(filter.exclude_admins && employee.is_admin))
            .cloned()
            .collect())
    }

    fn monthly_aggregates(&self, years: &[i32]) -> Result<Vec<MonthlyAggregate>, RepositoryError> {
        Ok(self
            .monthly
            .iter()
            .filter(|aggregate| years.contains(&aggregate.period.year))
            .cloned()
            .collect())
    }

    fn yearly_aggregates(&self, years: &[i32]) -> Result<Vec<YearlyAggregate>, RepositoryError> {
        Ok(self
            .yearly
            .iter()
            .filter(|aggregate| years.contains(&aggregate.year))
            .cloned()
            .collect())
    }

    fn monthly_targets(
        &self,
        employee_id: &EmployeeId,
        years: &[i32],
    ) -> Result<Vec<MonthlyTarget>, RepositoryError> {
        Ok(self
            .targets
            .iter()
            .filter(|target| {
                &target.employee_id == employee_id && years.contains(&target.period.year)
            })
            .cloned()
            .collect())
    }

    fn completed_tasks(
        &self,
        employee_id: &EmployeeId,
        range: DateRange,
    ) -> Result<Vec<CompletedTask>, RepositoryError> {
        let mut tasks: Vec<CompletedTask> = self
            .tasks
            .iter()
            .filter(|task| {
                &task.employee_id == employee_id
                    && task
                        .completed_at
                        .map(|completed_at| range.contains(completed_at.date()))
                        .unwrap_or(false)
            })
            .cloned()
            .collect();
        tasks.sort_by_key(|task| task.completed_at);
        Ok(tasks)
    }
}

/// Keeps the latest badge record per employee.
#[derive(Debug, Default, Clone)]
pub struct InMemoryBadgeStore {
    records: Arc<Mutex<BTreeMap<EmployeeId, BadgeRecord>>>,
}

impl InMemoryBadgeStore {
    pub fn get(&self, employee_id: &EmployeeId) -> Option<BadgeRecord> {
        self.records
            .lock()
            .ok()
            .and_then(|guard| guard.get(employee_id).cloned())
    }

    pub fn records(&self) -> Vec<BadgeRecord> {
        self.records
            .lock()
            .map(|guard| guard.values().cloned().collect())
            .unwrap_or_default()
    }
}

impl BadgeStore for InMemoryBadgeStore {
    fn record(&self, record: BadgeRecord) -> Result<(), BadgeStoreError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|_| BadgeStoreError::Transport("badge store mutex poisoned".to_string()))?;
        guard.insert(record.employee_id.clone(), record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn employee(id: &str, is_admin: bool) -> Employee {
        Employee {
            id: EmployeeId::new(id),
            name: id.to_uppercase(),
            rank: if is_admin { None } else { Some(3) },
            is_admin,
        }
    }

    fn task(id: &str, at: &str, points: i64) -> CompletedTask {
        CompletedTask {
            id: id.to_string(),
            employee_id: EmployeeId::new("ana"),
            completed_at: Some(
                NaiveDateTime::parse_from_str(at, "%Y-%m-%d %H:%M").expect("valid timestamp"),
            ),
            override_points: None,
            type_points: Some(points),
        }
    }

    #[test]
    fn excludes_admins_when_requested() {
        let repository = InMemoryScoreboardRepository::from_fixture(ScoreboardFixture {
            employees: vec![employee("ana", false), employee("root", true)],
            ..ScoreboardFixture::default()
        });

        let visible = repository
            .employees(EmployeeFilter::scoreboard())
            .expect("read succeeds");
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, EmployeeId::new("ana"));

        let all = repository
            .employees(EmployeeFilter {
                exclude_admins: false,
            })
            .expect("read succeeds");
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn tasks_come_back_in_completion_order_within_range() {
        let repository = InMemoryScoreboardRepository::from_fixture(ScoreboardFixture {
            employees: vec![employee("ana", false)],
            tasks: vec![
                task("late", "2026-03-20 09:00", 5),
                task("early", "2026-03-02 09:00", 5),
                task("outside", "2026-04-01 09:00", 5),
            ],
            targets: Vec::new(),
        });

        let range = DateRange {
            start: NaiveDate::from_ymd_opt(2026, 3, 1).expect("valid"),
            end: NaiveDate::from_ymd_opt(2026, 3, 31).expect("valid"),
        };
        let tasks = repository
            .completed_tasks(&EmployeeId::new("ana"), range)
            .expect("read succeeds");
        let ids: Vec<&str> = tasks.iter().map(|task| task.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "late"]);

        let monthly = repository
            .monthly_aggregates(&[2026])
            .expect("read succeeds");
        assert_eq!(monthly.len(), 2);
    }

    #[test]
    fn badge_store_keeps_latest_record() {
        let store = InMemoryBadgeStore::default();
        let employee_id = EmployeeId::new("ana");
        for day in [1, 2] {
            store
                .record(BadgeRecord {
                    employee_id: employee_id.clone(),
                    evaluated_on: NaiveDate::from_ymd_opt(2026, 5, day).expect("valid"),
                    achieved: Default::default(),
                })
                .expect("store accepts record");
        }

        assert_eq!(store.records().len(), 1);
        assert_eq!(
            store.get(&employee_id).map(|record| record.evaluated_on),
            NaiveDate::from_ymd_opt(2026, 5, 2)
        );
    }
}
