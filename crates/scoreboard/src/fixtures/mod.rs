//! CSV-backed data source: employee, task-type, task, and target exports
//! loaded into a [`ScoreboardFixture`].

mod parser;

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::info;

use crate::standings::domain::carry_forward_targets;
use crate::standings::{
    CompletedTask, Employee, EmployeeId, MonthPeriod, MonthlyTarget, ScoreboardFixture,
};
use parser::{parse_datetime, read_rows, EmployeeRow, TargetRow, TaskRow, TaskTypeRow};

pub const EMPLOYEES_FILE: &str = "employees.csv";
pub const TASK_TYPES_FILE: &str = "task_types.csv";
pub const TASKS_FILE: &str = "tasks.csv";
pub const TARGETS_FILE: &str = "targets.csv";

#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("failed to read {file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("{file} row '{row}': {reason}")]
    InvalidRow {
        file: &'static str,
        row: String,
        reason: String,
    },
}

pub struct FixtureImporter;

impl FixtureImporter {
    /// Loads the four exports from `dir`. Target rows are changes; each one
    /// holds until the next change, materialized through `through`.
    pub fn from_dir<P: AsRef<Path>>(
        dir: P,
        through: MonthPeriod,
    ) -> Result<ScoreboardFixture, FixtureError> {
        let dir = dir.as_ref();
        let open = |name: &str| {
            let path = dir.join(name);
            File::open(&path).map_err(|source| FixtureError::Io {
                file: path.display().to_string(),
                source,
            })
        };

        let fixture = Self::from_readers(
            open(EMPLOYEES_FILE)?,
            open(TASK_TYPES_FILE)?,
            open(TASKS_FILE)?,
            open(TARGETS_FILE)?,
            through,
        )?;

        info!(
            dir = %dir.display(),
            employees = fixture.employees.len(),
            tasks = fixture.tasks.len(),
            targets = fixture.targets.len(),
            "loaded scoreboard fixture"
        );
        Ok(fixture)
    }

    pub fn from_readers<E, Y, T, G>(
        employees: E,
        task_types: Y,
        tasks: T,
        targets: G,
        through: MonthPeriod,
    ) -> Result<ScoreboardFixture, FixtureError>
    where
        E: Read,
        Y: Read,
        T: Read,
        G: Read,
    {
        let employees = read_rows::<EmployeeRow, _>(employees)?
            .into_iter()
            .map(employee_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        let mut type_points: HashMap<String, Option<i64>> = HashMap::new();
        for row in read_rows::<TaskTypeRow, _>(task_types)? {
            let points = parse_points(row.points.as_deref(), TASK_TYPES_FILE, &row.name)?;
            type_points.insert(row.name.to_ascii_lowercase(), points);
        }

        let tasks = read_rows::<TaskRow, _>(tasks)?
            .into_iter()
            .map(|row| task_from_row(row, &type_points))
            .collect::<Result<Vec<_>, _>>()?;

        let changes = read_rows::<TargetRow, _>(targets)?
            .into_iter()
            .map(target_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ScoreboardFixture {
            employees,
            tasks,
            targets: carry_forward_targets(&changes, through),
        })
    }
}

fn employee_from_row(row: EmployeeRow) -> Result<Employee, FixtureError> {
    let rank = match row.rank.as_deref() {
        Some(raw) => Some(raw.trim().parse::<u32>().map_err(|_| FixtureError::InvalidRow {
            file: EMPLOYEES_FILE,
            row: row.id.clone(),
            reason: format!("rank '{raw}' is not a positive integer"),
        })?),
        None => None,
    };
    let is_admin = row.admin();

    Ok(Employee {
        id: EmployeeId(row.id),
        name: row.name,
        rank,
        is_admin,
    })
}

fn task_from_row(
    row: TaskRow,
    type_points: &HashMap<String, Option<i64>>,
) -> Result<CompletedTask, FixtureError> {
    let completed_at = match row.completed_at.as_deref() {
        Some(raw) => Some(parse_datetime(raw).ok_or_else(|| FixtureError::InvalidRow {
            file: TASKS_FILE,
            row: row.id.clone(),
            reason: format!("completed_at '{raw}' is not a timestamp"),
        })?),
        None => None,
    };
    let override_points = parse_points(row.override_points.as_deref(), TASKS_FILE, &row.id)?;
    let type_points = row
        .task_type
        .as_deref()
        .and_then(|name| type_points.get(&name.to_ascii_lowercase()).copied())
        .flatten();

    Ok(CompletedTask {
        id: row.id,
        employee_id: EmployeeId(row.assignee),
        completed_at,
        override_points,
        type_points,
    })
}

fn target_from_row(row: TargetRow) -> Result<MonthlyTarget, FixtureError> {
    let invalid = |reason: String| FixtureError::InvalidRow {
        file: TARGETS_FILE,
        row: format!("{} {}", row.employee_id, row.month),
        reason,
    };

    let period = row
        .month
        .parse::<MonthPeriod>()
        .map_err(|err| invalid(err.to_string()))?;
    let target_points = row
        .target_points
        .trim()
        .parse::<i64>()
        .map_err(|_| invalid(format!("target '{}' is not a number", row.target_points)))?;

    Ok(MonthlyTarget {
        employee_id: EmployeeId(row.employee_id.clone()),
        period,
        target_points,
    })
}

fn parse_points(
    raw: Option<&str>,
    file: &'static str,
    row: &str,
) -> Result<Option<i64>, FixtureError> {
    raw.map(|value| {
        value
            .trim()
            .parse::<i64>()
            .map_err(|_| FixtureError::InvalidRow {
                file,
                row: row.to_string(),
                reason: format!("points '{value}' is not a number"),
            })
    })
    .transpose()
}
