use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::domain::MonthPeriod;

/// Whether a period has fully elapsed and may feed badge evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodStatus {
    Complete,
    Incomplete,
}

/// Classifies months and years relative to an evaluation date and the
/// earliest year that counts towards badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodClassifier {
    today: NaiveDate,
    cutoff_year: i32,
}

impl PeriodClassifier {
    pub fn new(today: NaiveDate, cutoff_year: i32) -> Self {
        Self { today, cutoff_year }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn cutoff_year(&self) -> i32 {
        self.cutoff_year
    }

    pub fn current_month(&self) -> MonthPeriod {
        MonthPeriod::from_date(self.today)
    }

    pub fn classify_month(&self, period: MonthPeriod) -> PeriodStatus {
        if self.is_complete_month(period) {
            PeriodStatus::Complete
        } else {
            PeriodStatus::Incomplete
        }
    }

    pub fn classify_year(&self, year: i32) -> PeriodStatus {
        if self.is_complete_year(year) {
            PeriodStatus::Complete
        } else {
            PeriodStatus::Incomplete
        }
    }

    /// The current month never counts, even on its last day.
    pub fn is_complete_month(&self, period: MonthPeriod) -> bool {
        let current_year = self.today.year();
        if period.year < self.cutoff_year {
            return false;
        }
        if period.year < current_year {
            return true;
        }
        period.year == current_year && period.month < self.today.month()
    }

    pub fn is_complete_year(&self, year: i32) -> bool {
        year >= self.cutoff_year && year < self.today.year()
    }

    /// Month immediately before the current one, when it is eligible.
    pub fn previous_complete_month(&self) -> Option<MonthPeriod> {
        let previous = self.current_month().previous();
        self.is_complete_month(previous).then_some(previous)
    }

    /// Years covered by a lookback of `lookback` calendar years ending with
    /// the current year, clipped at the cutoff year.
    pub fn lookback_years(&self, lookback: u32) -> Vec<i32> {
        let current_year = self.today.year();
        let span = i32::try_from(lookback.max(1)).unwrap_or(i32::MAX);
        let first = current_year
            .saturating_sub(span - 1)
            .max(self.cutoff_year);
        (first..=current_year).collect()
    }
}
