mod catalog;
mod evaluation;

pub use catalog::{BadgeCatalog, BadgeDefinition, BadgeId, BadgeSet, BadgeView};
pub use evaluation::{
    BadgeEvaluator, EvaluationConfig, EvaluationSnapshot, SprintParticipant, SprintSnapshot,
};
