mod config;
mod context;
mod rules;
mod timeline;

pub use config::EvaluationConfig;
pub use context::{EvaluationSnapshot, SprintParticipant, SprintSnapshot};

use super::catalog::BadgeSet;
use context::EvaluationContext;
use tracing::debug;

/// Stateless evaluator applying the badge rules to a snapshot.
#[derive(Debug, Clone)]
pub struct BadgeEvaluator {
    config: EvaluationConfig,
}

impl BadgeEvaluator {
    pub fn new(config: EvaluationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    pub fn evaluate(&self, snapshot: &EvaluationSnapshot) -> BadgeSet {
        let context = EvaluationContext::build(snapshot, &self.config);
        let achieved = rules::evaluate_rules(&context);

        debug!(
            employee = %snapshot.employee_id,
            today = %snapshot.today,
            ranked_months = context.monthly_rankings.len(),
            ranked_years = context.yearly_rankings.len(),
            achieved = achieved.len(),
            "evaluated badges"
        );

        achieved
    }
}
