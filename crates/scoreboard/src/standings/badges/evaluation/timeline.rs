use chrono::NaiveDateTime;

use crate::standings::domain::{CompletedTask, MonthPeriod};
use super::config::EvaluationConfig;

/// True when `periods` contains `run_length` months whose first days are each
/// one month apart, within the configured day tolerance.
pub(crate) fn has_consecutive_run(
    periods: &[MonthPeriod],
    run_length: usize,
    config: &EvaluationConfig,
) -> bool {
    if run_length == 0 {
        return true;
    }

    let mut ordered = periods.to_vec();
    ordered.sort_by(|a, b| b.cmp(a));
    ordered.dedup();

    if ordered.len() < run_length {
        return false;
    }

    ordered.windows(run_length).any(|window| {
        window
            .windows(2)
            .all(|pair| gap_within_tolerance(pair[1], pair[0], config))
    })
}

fn gap_within_tolerance(
    earlier: MonthPeriod,
    later: MonthPeriod,
    config: &EvaluationConfig,
) -> bool {
    let gap = (later.first_day() - earlier.first_day()).num_days();
    (gap - config.consecutive_gap_days).abs() <= config.gap_tolerance_days
}

/// Completion time of the task that lifts the running total to `target`.
/// Tasks are scanned in ascending completion order; unfinished tasks are
/// ignored.
pub(crate) fn target_crossed_at<'a, I>(tasks: I, target: i64) -> Option<NaiveDateTime>
where
    I: IntoIterator<Item = &'a CompletedTask>,
{
    let mut timeline: Vec<(NaiveDateTime, i64)> = tasks
        .into_iter()
        .filter_map(|task| {
            task.completed_at
                .map(|completed_at| (completed_at, task.awarded_points()))
        })
        .collect();
    timeline.sort_by_key(|(completed_at, _)| *completed_at);

    let mut running: i64 = 0;
    for (completed_at, points) in timeline {
        running = running.saturating_add(points);
        if running >= target {
            return Some(completed_at);
        }
    }

    None
}
