use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for employees as issued by the directory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EmployeeId(pub String);

impl EmployeeId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Directory entry for an employee. Administrators carry no seniority rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub rank: Option<u32>,
    #[serde(default)]
    pub is_admin: bool,
}

impl Employee {
    /// Administrators and unranked accounts never appear on the scoreboard.
    pub fn is_eligible(&self) -> bool {
        !self.is_admin && self.rank.is_some()
    }
}

/// Filter accepted by the employee directory read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmployeeFilter {
    pub exclude_admins: bool,
}

impl EmployeeFilter {
    pub fn scoreboard() -> Self {
        Self {
            exclude_admins: true,
        }
    }
}

/// Task record as seen by the scoring engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedTask {
    pub id: String,
    pub employee_id: EmployeeId,
    pub completed_at: Option<NaiveDateTime>,
    pub override_points: Option<i64>,
    pub type_points: Option<i64>,
}

impl CompletedTask {
    pub fn awarded_points(&self) -> i64 {
        self.override_points.or(self.type_points).unwrap_or(0)
    }

    pub fn completion_month(&self) -> Option<MonthPeriod> {
        self.completed_at
            .map(|completed_at| MonthPeriod::from_date(completed_at.date()))
    }
}

/// Calendar month, the granularity of rankings and targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthPeriod {
    pub year: i32,
    pub month: u32,
}

impl MonthPeriod {
    pub fn new(year: i32, month: u32) -> Result<Self, PeriodError> {
        if !(1..=12).contains(&month) {
            return Err(PeriodError::InvalidMonth(month));
        }
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(PeriodError::InvalidYear(year));
        }
        Ok(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next().first_day().pred_opt().unwrap_or(NaiveDate::MAX)
    }

    pub fn days_in_month(&self) -> u32 {
        self.last_day().day()
    }

    /// Day-of-month that closes the first half of the month.
    pub fn midpoint_day(&self) -> u32 {
        self.days_in_month() / 2
    }

    pub fn previous(&self) -> Self {
        self.first_day()
            .checked_sub_months(Months::new(1))
            .map(Self::from_date)
            .unwrap_or(*self)
    }

    pub fn next(&self) -> Self {
        self.first_day()
            .checked_add_months(Months::new(1))
            .map(Self::from_date)
            .unwrap_or(*self)
    }

    pub fn date_range(&self) -> DateRange {
        DateRange {
            start: self.first_day(),
            end: self.last_day(),
        }
    }
}

impl fmt::Display for MonthPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthPeriod {
    type Err = PeriodError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let (year, month) = trimmed
            .split_once('-')
            .ok_or_else(|| PeriodError::Unparseable(trimmed.to_string()))?;
        let year = year
            .parse::<i32>()
            .map_err(|_| PeriodError::Unparseable(trimmed.to_string()))?;
        let month = month
            .parse::<u32>()
            .map_err(|_| PeriodError::Unparseable(trimmed.to_string()))?;
        Self::new(year, month)
    }
}

/// Error raised when a caller supplies an impossible period.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PeriodError {
    #[error("month must be between 1 and 12, got {0}")]
    InvalidMonth(u32),
    #[error("year {0} is outside the supported calendar")]
    InvalidYear(i32),
    #[error("'{0}' is not a YYYY-MM period")]
    Unparseable(String),
}

/// Inclusive range of calendar dates used for task history reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn for_years(first_year: i32, last_year: i32) -> Self {
        let start = NaiveDate::from_ymd_opt(first_year, 1, 1).unwrap_or(NaiveDate::MIN);
        let end = NaiveDate::from_ymd_opt(last_year, 12, 31).unwrap_or(NaiveDate::MAX);
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyAggregate {
    pub employee_id: EmployeeId,
    pub period: MonthPeriod,
    pub total_points: i64,
    pub task_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearlyAggregate {
    pub employee_id: EmployeeId,
    pub year: i32,
    pub total_points: i64,
    pub task_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTarget {
    pub employee_id: EmployeeId,
    pub period: MonthPeriod,
    pub target_points: i64,
}

/// Rolls completed tasks up into the per-month and per-year totals the data
/// store exposes. Tasks without a completion timestamp are skipped.
pub fn aggregate_tasks(tasks: &[CompletedTask]) -> (Vec<MonthlyAggregate>, Vec<YearlyAggregate>) {
    let mut monthly: BTreeMap<(EmployeeId, MonthPeriod), (i64, u32)> = BTreeMap::new();
    let mut yearly: BTreeMap<(EmployeeId, i32), (i64, u32)> = BTreeMap::new();

    for task in tasks {
        let Some(period) = task.completion_month() else {
            continue;
        };
        let points = task.awarded_points();

        let month_entry = monthly
            .entry((task.employee_id.clone(), period))
            .or_insert((0, 0));
        month_entry.0 = month_entry.0.saturating_add(points);
        month_entry.1 += 1;

        let year_entry = yearly
            .entry((task.employee_id.clone(), period.year))
            .or_insert((0, 0));
        year_entry.0 = year_entry.0.saturating_add(points);
        year_entry.1 += 1;
    }

    let monthly = monthly
        .into_iter()
        .map(|((employee_id, period), (total_points, task_count))| MonthlyAggregate {
            employee_id,
            period,
            total_points,
            task_count,
        })
        .collect();

    let yearly = yearly
        .into_iter()
        .map(|((employee_id, year), (total_points, task_count))| YearlyAggregate {
            employee_id,
            year,
            total_points,
            task_count,
        })
        .collect();

    (monthly, yearly)
}

/// Expands target changes into one row per month. A target holds from the
/// month it is set until the next change for the same employee, up to and
/// including `through`.
pub fn carry_forward_targets(
    changes: &[MonthlyTarget],
    through: MonthPeriod,
) -> Vec<MonthlyTarget> {
    let mut by_employee: BTreeMap<&EmployeeId, BTreeMap<MonthPeriod, i64>> = BTreeMap::new();
    for change in changes {
        by_employee
            .entry(&change.employee_id)
            .or_default()
            .insert(change.period, change.target_points);
    }

    let mut materialized = Vec::new();
    for (employee_id, schedule) in by_employee {
        let mut entries = schedule.into_iter().peekable();
        while let Some((start, target_points)) = entries.next() {
            let stop = entries
                .peek()
                .map(|(next_change, _)| next_change.previous())
                .unwrap_or(through)
                .min(through);

            let mut period = start;
            while period <= stop {
                materialized.push(MonthlyTarget {
                    employee_id: employee_id.clone(),
                    period,
                    target_points,
                });
                let next = period.next();
                if next == period {
                    break;
                }
                period = next;
            }
        }
    }

    materialized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(year: i32, month: u32) -> MonthPeriod {
        MonthPeriod::new(year, month).expect("valid month")
    }

    fn task(
        id: &str,
        employee: &str,
        at: Option<&str>,
        over: Option<i64>,
        base: Option<i64>,
    ) -> CompletedTask {
        CompletedTask {
            id: id.to_string(),
            employee_id: EmployeeId::new(employee),
            completed_at: at.map(|raw| {
                NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M").expect("valid timestamp")
            }),
            override_points: over,
            type_points: base,
        }
    }

    #[test]
    fn awarded_points_prefers_override_then_type_then_zero() {
        assert_eq!(task("t1", "e1", None, Some(7), Some(3)).awarded_points(), 7);
        assert_eq!(task("t2", "e1", None, None, Some(3)).awarded_points(), 3);
        assert_eq!(task("t3", "e1", None, None, None).awarded_points(), 0);
    }

    #[test]
    fn month_period_navigation_wraps_years() {
        assert_eq!(month(2026, 1).previous(), month(2025, 12));
        assert_eq!(month(2025, 12).next(), month(2026, 1));
        assert_eq!(month(2024, 2).days_in_month(), 29);
        assert_eq!(month(2026, 2).midpoint_day(), 14);
        assert_eq!(month(2026, 3).midpoint_day(), 15);
        assert_eq!(month(2026, 4).midpoint_day(), 15);
    }

    #[test]
    fn month_period_parses_and_rejects() {
        assert_eq!("2026-03".parse::<MonthPeriod>(), Ok(month(2026, 3)));
        assert_eq!(
            "2026-13".parse::<MonthPeriod>(),
            Err(PeriodError::InvalidMonth(13))
        );
        assert!(matches!(
            "March".parse::<MonthPeriod>(),
            Err(PeriodError::Unparseable(_))
        ));
        assert_eq!(month(2026, 3).to_string(), "2026-03");
    }

    #[test]
    fn aggregates_skip_unfinished_tasks() {
        let tasks = vec![
            task("t1", "e1", Some("2026-01-03 09:00"), None, Some(5)),
            task("t2", "e1", Some("2026-01-20 09:00"), Some(10), Some(5)),
            task("t3", "e1", None, None, Some(50)),
            task("t4", "e1", Some("2026-02-01 09:00"), None, Some(2)),
        ];

        let (monthly, yearly) = aggregate_tasks(&tasks);
        assert_eq!(monthly.len(), 2);
        assert_eq!(monthly[0].period, month(2026, 1));
        assert_eq!(monthly[0].total_points, 15);
        assert_eq!(monthly[0].task_count, 2);
        assert_eq!(yearly.len(), 1);
        assert_eq!(yearly[0].total_points, 17);
        assert_eq!(yearly[0].task_count, 3);
    }

    #[test]
    fn huge_point_values_saturate_instead_of_overflowing() {
        let tasks = vec![
            task("t1", "e1", Some("2026-01-03 09:00"), Some(i64::MAX), None),
            task("t2", "e1", Some("2026-01-04 09:00"), Some(i64::MAX), None),
            task("t3", "e1", Some("2026-02-04 09:00"), None, Some(1)),
        ];

        let (monthly, yearly) = aggregate_tasks(&tasks);
        assert_eq!(monthly[0].total_points, i64::MAX);
        assert_eq!(monthly[0].task_count, 2);
        assert_eq!(monthly[1].total_points, 1);
        assert_eq!(yearly[0].total_points, i64::MAX);
        assert_eq!(yearly[0].task_count, 3);
    }

    #[test]
    fn targets_carry_forward_until_changed() {
        let employee = EmployeeId::new("e1");
        let changes = vec![
            MonthlyTarget {
                employee_id: employee.clone(),
                period: month(2025, 11),
                target_points: 100,
            },
            MonthlyTarget {
                employee_id: employee.clone(),
                period: month(2026, 2),
                target_points: 140,
            },
        ];

        let rows = carry_forward_targets(&changes, month(2026, 3));
        let schedule: Vec<(String, i64)> = rows
            .iter()
            .map(|row| (row.period.to_string(), row.target_points))
            .collect();
        assert_eq!(
            schedule,
            vec![
                ("2025-11".to_string(), 100),
                ("2025-12".to_string(), 100),
                ("2026-01".to_string(), 100),
                ("2026-02".to_string(), 140),
                ("2026-03".to_string(), 140),
            ]
        );
    }
}
