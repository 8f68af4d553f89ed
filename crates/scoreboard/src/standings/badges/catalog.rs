use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// The twelve achievements, in catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeId {
    TripleCrownChampion,
    LightningFinisher,
    AnnualLegend,
    ConsistencyKing,
    TheUnstoppable,
    Dominator,
    BeastMode,
    TheRecordBreaker,
    HallOfFame,
    TheImmortal,
    DynastyBuilder,
    TheJuggernaut,
}

impl BadgeId {
    pub const ALL: [BadgeId; 12] = [
        BadgeId::TripleCrownChampion,
        BadgeId::LightningFinisher,
        BadgeId::AnnualLegend,
        BadgeId::ConsistencyKing,
        BadgeId::TheUnstoppable,
        BadgeId::Dominator,
        BadgeId::BeastMode,
        BadgeId::TheRecordBreaker,
        BadgeId::HallOfFame,
        BadgeId::TheImmortal,
        BadgeId::DynastyBuilder,
        BadgeId::TheJuggernaut,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Set of achieved badges, ordered by catalog index.
pub type BadgeSet = BTreeSet<BadgeId>;

/// Static presentation metadata for a badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BadgeDefinition {
    pub icon: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

/// Badge as shown on a profile, achieved or locked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BadgeView {
    pub id: BadgeId,
    pub index: usize,
    pub icon: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub achieved: bool,
}

pub struct BadgeCatalog;

impl BadgeCatalog {
    pub fn definition(id: BadgeId) -> BadgeDefinition {
        match id {
            BadgeId::TripleCrownChampion => BadgeDefinition {
                icon: "crown",
                name: "Triple Crown Champion",
                description: "Finished first on the monthly leaderboard three months in a row.",
            },
            BadgeId::LightningFinisher => BadgeDefinition {
                icon: "bolt",
                name: "Lightning Finisher",
                description: "Reached last month's target before anyone else who reached theirs.",
            },
            BadgeId::AnnualLegend => BadgeDefinition {
                icon: "trophy",
                name: "Annual Legend",
                description: "Finished a full year with the highest total of all employees.",
            },
            BadgeId::ConsistencyKing => BadgeDefinition {
                icon: "chart-line",
                name: "Consistency King",
                description: "Stayed in the monthly top five for four months in a row.",
            },
            BadgeId::TheUnstoppable => BadgeDefinition {
                icon: "rocket",
                name: "The Unstoppable",
                description: "Hit a monthly target by the middle of the month.",
            },
            BadgeId::Dominator => BadgeDefinition {
                icon: "fist",
                name: "Dominator",
                description: "Topped the monthly leaderboard in three different months.",
            },
            BadgeId::BeastMode => BadgeDefinition {
                icon: "flame",
                name: "Beast Mode",
                description: "Scored at least double the monthly target.",
            },
            BadgeId::TheRecordBreaker => BadgeDefinition {
                icon: "medal",
                name: "The Record Breaker",
                description: "Holds the highest single-month total ever recorded.",
            },
            BadgeId::HallOfFame => BadgeDefinition {
                icon: "landmark",
                name: "Hall Of Fame",
                description: "Ranked in the top five in every month of a year.",
            },
            BadgeId::TheImmortal => BadgeDefinition {
                icon: "infinity",
                name: "The Immortal",
                description: "Ranked in the top ten in every month of a year.",
            },
            BadgeId::DynastyBuilder => BadgeDefinition {
                icon: "castle",
                name: "Dynasty Builder",
                description: "Earned Annual Legend in two or more years.",
            },
            BadgeId::TheJuggernaut => BadgeDefinition {
                icon: "shield",
                name: "The Juggernaut",
                description: "Met the monthly target three months in a row.",
            },
        }
    }

    /// All twelve badges, achieved ones first, each group in catalog order.
    pub fn render(achieved: &BadgeSet) -> Vec<BadgeView> {
        let mut views: Vec<BadgeView> = BadgeId::ALL
            .iter()
            .map(|id| {
                let definition = Self::definition(*id);
                BadgeView {
                    id: *id,
                    index: id.index(),
                    icon: definition.icon,
                    name: definition.name,
                    description: definition.description,
                    achieved: achieved.contains(id),
                }
            })
            .collect();

        views.sort_by_key(|view| (!view.achieved, view.index));
        views
    }
}
