use crate::commands::{
    run_badges, run_catalog, run_leaderboard, run_recompute, BadgesArgs, LeaderboardArgs,
    RecomputeArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use scoreboard::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "scoreboard",
    about = "Serve and inspect the employee project scoreboard",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Show the badge showcase for one employee
    Badges(BadgesArgs),
    /// Print the monthly or yearly leaderboard
    Leaderboard(LeaderboardArgs),
    /// Re-evaluate badges for every eligible employee
    Recompute(RecomputeArgs),
    /// List the twelve badges and their criteria
    Catalog,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Badges(args) => run_badges(args),
        Command::Leaderboard(args) => run_leaderboard(args),
        Command::Recompute(args) => run_recompute(args),
        Command::Catalog => run_catalog(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_serve_without_subcommand() {
        let cli = Cli::try_parse_from(["scoreboard"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_leaderboard_month() {
        let cli = Cli::try_parse_from(["scoreboard", "leaderboard", "--month", "2026-03"])
            .expect("parses");
        match cli.command {
            Some(Command::Leaderboard(args)) => {
                let month = args.month.map(|period| period.to_string());
                assert_eq!(month.as_deref(), Some("2026-03"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_today() {
        let err = Cli::try_parse_from([
            "scoreboard",
            "badges",
            "--employee",
            "ana",
            "--today",
            "tomorrow",
        ])
        .expect_err("bad date rejected");
        assert!(err.to_string().contains("tomorrow"));
    }
}
