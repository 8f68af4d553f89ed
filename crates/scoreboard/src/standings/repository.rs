use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::badges::BadgeSet;
use super::domain::{
    CompletedTask, DateRange, Employee, EmployeeFilter, EmployeeId, MonthlyAggregate,
    MonthlyTarget, YearlyAggregate,
};

/// Read contract over the employing system's data store. Implementations
/// must be safe to call from several threads at once; the service issues
/// independent reads concurrently.
pub trait ScoreboardRepository: Send + Sync {
    fn employees(&self, filter: EmployeeFilter) -> Result<Vec<Employee>, RepositoryError>;

    /// Monthly totals for every employee in the given years.
    fn monthly_aggregates(&self, years: &[i32]) -> Result<Vec<MonthlyAggregate>, RepositoryError>;

    fn yearly_aggregates(&self, years: &[i32]) -> Result<Vec<YearlyAggregate>, RepositoryError>;

    fn monthly_targets(
        &self,
        employee_id: &EmployeeId,
        years: &[i32],
    ) -> Result<Vec<MonthlyTarget>, RepositoryError>;

    /// Completed tasks in ascending completion order.
    fn completed_tasks(
        &self,
        employee_id: &EmployeeId,
        range: DateRange,
    ) -> Result<Vec<CompletedTask>, RepositoryError>;
}

/// Error enumeration for provider read failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("data store unavailable: {0}")]
    Unavailable(String),
    #[error("data store returned malformed rows: {0}")]
    Corrupt(String),
}

/// Computed badge set written back for dashboards that read cached results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeRecord {
    pub employee_id: EmployeeId,
    pub evaluated_on: NaiveDate,
    pub achieved: BadgeSet,
}

/// Optional sink for computed badge sets.
pub trait BadgeStore: Send + Sync {
    fn record(&self, record: BadgeRecord) -> Result<(), BadgeStoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BadgeStoreError {
    #[error("badge store unavailable: {0}")]
    Transport(String),
}
