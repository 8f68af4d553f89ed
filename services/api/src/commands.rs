use std::path::PathBuf;

use chrono::{Datelike, Local, NaiveDate};
use clap::Args;
use scoreboard::config::AppConfig;
use scoreboard::error::AppError;
use scoreboard::standings::{
    BadgeCatalog, BadgeSet, EmployeeBadgeReport, EmployeeId, Leaderboard, LeaderboardScope,
    MonthPeriod, RecomputeSummary,
};

use crate::infra::{build_service, parse_date, parse_month};

#[derive(Args, Debug, Default)]
pub(crate) struct SourceArgs {
    /// Directory holding employees.csv, task_types.csv, tasks.csv, and targets.csv
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct BadgesArgs {
    /// Employee identifier as issued by the directory
    #[arg(long)]
    pub(crate) employee: String,
    #[command(flatten)]
    pub(crate) source: SourceArgs,
    /// Print the report as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct LeaderboardArgs {
    /// Calendar year for the yearly standings. Defaults to the current year.
    #[arg(long, conflicts_with = "month")]
    pub(crate) year: Option<i32>,
    /// Month (YYYY-MM) for the monthly standings
    #[arg(long, value_parser = parse_month)]
    pub(crate) month: Option<MonthPeriod>,
    #[command(flatten)]
    pub(crate) source: SourceArgs,
    /// Print the leaderboard as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct RecomputeArgs {
    #[command(flatten)]
    pub(crate) source: SourceArgs,
}

/// Settings shared by every offline command: the configured window plus
/// command-line overrides.
struct Session {
    config: AppConfig,
    today: NaiveDate,
    data_dir: Option<PathBuf>,
}

impl Session {
    fn open(source: SourceArgs) -> Result<Self, AppError> {
        let config = AppConfig::load()?;
        let today = source.today.unwrap_or_else(|| Local::now().date_naive());
        let data_dir = source.data_dir.or_else(|| config.scoreboard.data_dir.clone());
        Ok(Self {
            config,
            today,
            data_dir,
        })
    }
}

pub(crate) fn run_badges(args: BadgesArgs) -> Result<(), AppError> {
    let session = Session::open(args.source)?;
    let (service, _) = build_service(
        session.data_dir.as_deref(),
        session.config.scoreboard.evaluation_config(),
        session.today,
    )?;

    let report = service.employee_badges(&EmployeeId::new(args.employee), session.today)?;
    if args.json {
        print_json(&report);
    } else {
        render_badge_report(&report);
    }
    Ok(())
}

pub(crate) fn run_leaderboard(args: LeaderboardArgs) -> Result<(), AppError> {
    let session = Session::open(args.source)?;
    let (service, _) = build_service(
        session.data_dir.as_deref(),
        session.config.scoreboard.evaluation_config(),
        session.today,
    )?;

    let board = match args.month {
        Some(period) => service.monthly_leaderboard(period)?,
        None => service.yearly_leaderboard(args.year.unwrap_or_else(|| session.today.year()))?,
    };
    if args.json {
        print_json(&board);
    } else {
        render_leaderboard(&board);
    }
    Ok(())
}

pub(crate) fn run_recompute(args: RecomputeArgs) -> Result<(), AppError> {
    let session = Session::open(args.source)?;
    let (service, _) = build_service(
        session.data_dir.as_deref(),
        session.config.scoreboard.evaluation_config(),
        session.today,
    )?;

    let summary = service.recompute_all(session.today)?;
    render_recompute_summary(&summary);
    Ok(())
}

pub(crate) fn run_catalog() -> Result<(), AppError> {
    println!("Badge catalog");
    for badge in BadgeCatalog::render(&BadgeSet::new()) {
        println!(
            "{:>2}. {} [{}]\n    {}",
            badge.index + 1,
            badge.name,
            badge.icon,
            badge.description
        );
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("unable to encode output: {err}"),
    }
}

fn render_badge_report(report: &EmployeeBadgeReport) {
    println!(
        "{} ({}) as of {}: {}/{} badges",
        report.employee.name,
        report.employee.id,
        report.evaluated_on,
        report.achieved_count(),
        report.badges.len()
    );
    for badge in &report.badges {
        let marker = if badge.achieved { "x" } else { " " };
        println!("  [{marker}] {:<24} {}", badge.name, badge.description);
    }
}

fn render_leaderboard(board: &Leaderboard) {
    match board.scope {
        LeaderboardScope::Month { period } => println!("Monthly leaderboard {period}"),
        LeaderboardScope::Year { year } => println!("Yearly leaderboard {year}"),
    }
    if board.entries.is_empty() {
        println!("  no completed tasks recorded");
        return;
    }
    for entry in &board.entries {
        println!(
            "  {:>3}. {:<24} {:>7} pts  {:>4} tasks",
            entry.rank, entry.name, entry.total_points, entry.task_count
        );
    }
}

fn render_recompute_summary(summary: &RecomputeSummary) {
    println!(
        "Recomputed badges as of {}: {} evaluated, {} stored, {} store failures",
        summary.evaluated_on, summary.evaluated, summary.stored, summary.store_failures
    );
    for record in &summary.records {
        let names: Vec<&str> = record
            .achieved
            .iter()
            .map(|badge| BadgeCatalog::definition(*badge).name)
            .collect();
        let listing = if names.is_empty() {
            "-".to_string()
        } else {
            names.join(", ")
        };
        println!("  {}: {}", record.employee_id, listing);
    }
}
