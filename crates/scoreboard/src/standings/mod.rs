//! Rankings and achievement badges computed from the employing system's
//! task history, aggregates, and targets.

pub mod badges;
pub mod domain;
pub mod memory;
pub mod period;
pub mod ranking;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use badges::{
    BadgeCatalog, BadgeDefinition, BadgeEvaluator, BadgeId, BadgeSet, BadgeView,
    EvaluationConfig, EvaluationSnapshot, SprintParticipant, SprintSnapshot,
};
pub use domain::{
    CompletedTask, DateRange, Employee, EmployeeFilter, EmployeeId, MonthPeriod,
    MonthlyAggregate, MonthlyTarget, PeriodError, YearlyAggregate,
};
pub use memory::{InMemoryBadgeStore, InMemoryScoreboardRepository, ScoreboardFixture};
pub use period::{PeriodClassifier, PeriodStatus};
pub use ranking::{rank_monthly, rank_yearly, RankedEntry, Ranking};
pub use repository::{
    BadgeRecord, BadgeStore, BadgeStoreError, RepositoryError, ScoreboardRepository,
};
pub use router::standings_router;
pub use service::{
    EmployeeBadgeReport, Leaderboard, LeaderboardEntry, LeaderboardScope, RecomputeSummary,
    ScoreboardService, ScoreboardServiceError, TargetProgress,
};
