use chrono::{Datelike, NaiveDateTime};

use super::context::EvaluationContext;
use super::timeline::{has_consecutive_run, target_crossed_at};
use crate::standings::badges::catalog::{BadgeId, BadgeSet};
use crate::standings::domain::MonthPeriod;

pub(crate) fn evaluate_rules(context: &EvaluationContext<'_>) -> BadgeSet {
    BadgeId::ALL
        .into_iter()
        .filter(|badge| achieved(*badge, context))
        .collect()
}

fn achieved(badge: BadgeId, context: &EvaluationContext<'_>) -> bool {
    match badge {
        BadgeId::TripleCrownChampion => triple_crown_champion(context),
        BadgeId::LightningFinisher => lightning_finisher(context),
        BadgeId::AnnualLegend => annual_legend(context),
        BadgeId::ConsistencyKing => consistency_king(context),
        BadgeId::TheUnstoppable => the_unstoppable(context),
        BadgeId::Dominator => dominator(context),
        BadgeId::BeastMode => beast_mode(context),
        BadgeId::TheRecordBreaker => the_record_breaker(context),
        BadgeId::HallOfFame => full_year_within(context, 5),
        BadgeId::TheImmortal => full_year_within(context, 10),
        BadgeId::DynastyBuilder => dynasty_builder(context),
        BadgeId::TheJuggernaut => the_juggernaut(context),
    }
}

fn triple_crown_champion(context: &EvaluationContext<'_>) -> bool {
    has_consecutive_run(&context.months_ranked_within(1), 3, context.config)
}

fn consistency_king(context: &EvaluationContext<'_>) -> bool {
    has_consecutive_run(&context.months_ranked_within(5), 4, context.config)
}

fn dominator(context: &EvaluationContext<'_>) -> bool {
    context.months_ranked_within(1).len() >= 3
}

fn annual_legend(context: &EvaluationContext<'_>) -> bool {
    !context.years_led().is_empty()
}

fn dynasty_builder(context: &EvaluationContext<'_>) -> bool {
    context.years_led().len() >= 2
}

fn beast_mode(context: &EvaluationContext<'_>) -> bool {
    context
        .targets
        .iter()
        .any(|(period, target)| context.own_total(*period) >= target.saturating_mul(2))
}

fn the_juggernaut(context: &EvaluationContext<'_>) -> bool {
    let met: Vec<MonthPeriod> = context
        .targets
        .iter()
        .filter(|(period, target)| context.own_total(**period) >= **target)
        .map(|(period, _)| *period)
        .collect();
    has_consecutive_run(&met, 3, context.config)
}

fn the_unstoppable(context: &EvaluationContext<'_>) -> bool {
    context.targets.iter().any(|(period, target)| {
        let Some(tasks) = context.tasks_by_month.get(period) else {
            return false;
        };
        target_crossed_at(tasks.iter().copied(), *target)
            .map(|crossed_at| crossed_at.day() <= period.midpoint_day())
            .unwrap_or(false)
    })
}

fn the_record_breaker(context: &EvaluationContext<'_>) -> bool {
    match (context.best_own_month(), context.best_month_overall()) {
        (Some(own), Some(overall)) => own > 0 && own == overall,
        _ => false,
    }
}

/// A complete year with all twelve months on record and every monthly rank
/// at or above `max_rank`.
fn full_year_within(context: &EvaluationContext<'_>, max_rank: u32) -> bool {
    context
        .months_by_complete_year()
        .values()
        .filter(|months| months.len() >= 12)
        .any(|months| {
            months.iter().all(|period| {
                context
                    .monthly_rank(*period)
                    .map(|rank| rank <= max_rank)
                    .unwrap_or(false)
            })
        })
}

/// First to reach their target last month among everyone who reached theirs;
/// ties share the badge.
fn lightning_finisher(context: &EvaluationContext<'_>) -> bool {
    let Some(sprint) = context.sprint else {
        return false;
    };

    let mut own_finish: Option<NaiveDateTime> = None;
    let mut fastest: Option<NaiveDateTime> = None;

    for participant in &sprint.participants {
        let Some(target) = participant.target_points.filter(|target| *target > 0) else {
            continue;
        };
        let in_period = participant.tasks.iter().filter(|task| {
            task.employee_id == participant.employee_id
                && task.completion_month() == Some(sprint.period)
        });
        let Some(finished_at) = target_crossed_at(in_period, target) else {
            continue;
        };

        if &participant.employee_id == context.employee_id {
            own_finish = Some(finished_at);
        }
        fastest = Some(match fastest {
            Some(current) => current.min(finished_at),
            None => finished_at,
        });
    }

    match (own_finish, fastest) {
        (Some(own), Some(fastest)) => own <= fastest,
        _ => false,
    }
}
