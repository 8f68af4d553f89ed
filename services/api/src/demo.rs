use chrono::{Datelike, NaiveDate};
use scoreboard::standings::{
    CompletedTask, Employee, EmployeeId, MonthPeriod, MonthlyTarget, ScoreboardFixture,
};

/// id, display name, seniority rank, base points per task, monthly target.
const ROSTER: [(&str, &str, u32, i64, i64); 6] = [
    ("emp-001", "Ava Moreno", 1, 32, 120),
    ("emp-002", "Ben Okafor", 2, 28, 110),
    ("emp-003", "Chloe Park", 3, 24, 100),
    ("emp-004", "Dev Patel", 4, 20, 90),
    ("emp-005", "Eli Novak", 5, 16, 150),
    ("emp-006", "Farah Haddad", 6, 12, 40),
];

const TASK_DAYS: [u32; 5] = [2, 6, 11, 17, 24];
const HISTORY_MONTHS: u32 = 13;

/// Deterministic team history covering the thirteen months up to and
/// including the month of `today`. Tasks dated after `today` are left out.
pub(crate) fn demo_fixture(today: NaiveDate) -> ScoreboardFixture {
    let mut fixture = ScoreboardFixture {
        employees: ROSTER
            .iter()
            .map(|(id, name, rank, _, _)| Employee {
                id: EmployeeId::new(*id),
                name: (*name).to_string(),
                rank: Some(*rank),
                is_admin: false,
            })
            .collect(),
        ..ScoreboardFixture::default()
    };
    fixture.employees.push(Employee {
        id: EmployeeId::new("admin"),
        name: "Scoreboard Admin".to_string(),
        rank: None,
        is_admin: true,
    });

    let current = MonthPeriod::from_date(today);
    let mut period = current;
    for _ in 1..HISTORY_MONTHS {
        period = period.previous();
    }

    for month_index in 0..HISTORY_MONTHS {
        for (employee_index, (id, _, _, base, target)) in ROSTER.iter().enumerate() {
            fixture.targets.push(MonthlyTarget {
                employee_id: EmployeeId::new(*id),
                period,
                target_points: *target,
            });

            for (task_index, day) in TASK_DAYS.iter().enumerate() {
                let Some(completed_at) = NaiveDate::from_ymd_opt(period.year, period.month, *day)
                    .filter(|date| *date <= today)
                    .and_then(|date| date.and_hms_opt(9 + task_index as u32, 30, 0))
                else {
                    continue;
                };

                let swing =
                    (employee_index as i64 * 3 + month_index as i64 * 5 + task_index as i64) % 4;
                let bonus_month = month_index % 3 == employee_index as u32 % 3;
                let override_points = (task_index == 4 && bonus_month).then_some(base * 2);

                fixture.tasks.push(CompletedTask {
                    id: format!("{id}-{}-{task_index}", period),
                    employee_id: EmployeeId::new(*id),
                    completed_at: Some(completed_at),
                    override_points,
                    type_points: Some(base + swing * 6),
                });
            }
        }

        if let Some(completed_at) = NaiveDate::from_ymd_opt(period.year, period.month, 1)
            .filter(|date| *date <= today && date.month() % 2 == 0)
            .and_then(|date| date.and_hms_opt(8, 0, 0))
        {
            fixture.tasks.push(CompletedTask {
                id: format!("admin-{period}"),
                employee_id: EmployeeId::new("admin"),
                completed_at: Some(completed_at),
                override_points: Some(1_000),
                type_points: None,
            });
        }

        period = period.next();
    }

    fixture
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, 10).expect("valid date")
    }

    #[test]
    fn fixture_is_deterministic() {
        assert_eq!(demo_fixture(today()), demo_fixture(today()));
    }

    #[test]
    fn history_stops_at_today() {
        let fixture = demo_fixture(today());
        let latest = fixture
            .tasks
            .iter()
            .filter_map(|task| task.completed_at)
            .max()
            .expect("tasks present");
        assert!(latest.date() <= today());

        let earliest = fixture
            .tasks
            .iter()
            .filter_map(|task| task.completed_at)
            .min()
            .expect("tasks present");
        assert_eq!(
            MonthPeriod::from_date(earliest.date()),
            MonthPeriod::new(2025, 4).expect("valid month")
        );
    }

    #[test]
    fn roster_includes_an_ineligible_admin() {
        let fixture = demo_fixture(today());
        let eligible = fixture
            .employees
            .iter()
            .filter(|employee| employee.is_eligible())
            .count();
        assert_eq!(eligible, ROSTER.len());
        assert_eq!(fixture.employees.len(), ROSTER.len() + 1);
    }
}
