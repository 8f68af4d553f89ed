use serde::{Deserialize, Serialize};

/// Tunables for badge evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Earliest calendar year whose periods count towards badges.
    pub cutoff_year: i32,
    pub lookback_years: u32,
    pub consecutive_gap_days: i64,
    pub gap_tolerance_days: i64,
}

impl EvaluationConfig {
    pub fn with_cutoff(cutoff_year: i32) -> Self {
        Self {
            cutoff_year,
            ..Self::default()
        }
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            cutoff_year: 2025,
            lookback_years: 5,
            consecutive_gap_days: 30,
            gap_tolerance_days: 5,
        }
    }
}
