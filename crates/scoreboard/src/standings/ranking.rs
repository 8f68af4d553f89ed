use std::collections::HashMap;

use serde::Serialize;

use super::domain::{EmployeeId, MonthPeriod, MonthlyAggregate, YearlyAggregate};

/// Row that can be ordered on a leaderboard.
pub trait Ranked {
    fn employee_id(&self) -> &EmployeeId;
    fn total_points(&self) -> i64;
    fn task_count(&self) -> u32;
}

impl Ranked for MonthlyAggregate {
    fn employee_id(&self) -> &EmployeeId {
        &self.employee_id
    }

    fn total_points(&self) -> i64 {
        self.total_points
    }

    fn task_count(&self) -> u32 {
        self.task_count
    }
}

impl Ranked for YearlyAggregate {
    fn employee_id(&self) -> &EmployeeId {
        &self.employee_id
    }

    fn total_points(&self) -> i64 {
        self.total_points
    }

    fn task_count(&self) -> u32 {
        self.task_count
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedEntry {
    pub rank: u32,
    pub employee_id: EmployeeId,
    pub total_points: i64,
    pub task_count: u32,
}

/// Ordered standings for one period. Positions are 1-based and unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ranking {
    entries: Vec<RankedEntry>,
    positions: HashMap<EmployeeId, u32>,
}

impl Ranking {
    /// Points descending; equal totals fall back to employee id ascending so
    /// the order never depends on how the store returned the rows.
    pub fn from_rows<R: Ranked>(mut rows: Vec<&R>) -> Self {
        rows.sort_by(|a, b| {
            b.total_points()
                .cmp(&a.total_points())
                .then_with(|| a.employee_id().cmp(b.employee_id()))
        });

        let mut entries = Vec::with_capacity(rows.len());
        let mut positions = HashMap::with_capacity(rows.len());
        for row in rows {
            if positions.contains_key(row.employee_id()) {
                continue;
            }
            let rank = entries.len() as u32 + 1;
            positions.insert(row.employee_id().clone(), rank);
            entries.push(RankedEntry {
                rank,
                employee_id: row.employee_id().clone(),
                total_points: row.total_points(),
                task_count: row.task_count(),
            });
        }

        Self { entries, positions }
    }

    pub fn rank_of(&self, employee_id: &EmployeeId) -> Option<u32> {
        self.positions.get(employee_id).copied()
    }

    pub fn leader(&self) -> Option<&RankedEntry> {
        self.entries.first()
    }

    pub fn entries(&self) -> &[RankedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn rank_monthly(period: MonthPeriod, aggregates: &[MonthlyAggregate]) -> Ranking {
    Ranking::from_rows(
        aggregates
            .iter()
            .filter(|aggregate| aggregate.period == period)
            .collect(),
    )
}

pub fn rank_yearly(year: i32, aggregates: &[YearlyAggregate]) -> Ranking {
    Ranking::from_rows(
        aggregates
            .iter()
            .filter(|aggregate| aggregate.year == year)
            .collect(),
    )
}
