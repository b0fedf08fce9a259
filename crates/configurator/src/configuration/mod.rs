//! Iron-set configuration: catalog, selections, rules, and step gating.

mod actions;
mod catalog;
pub mod rules;
mod selection;
mod step;

pub use actions::ConfigAction;
pub use catalog::{
    CLUB_CATALOG, CLUB_DEPENDENCIES, Club, ClubId, ClubType, Hand, Lie, MAX_CLUBS, MIN_CLUBS,
    ShaftLength, club,
};
pub use selection::{ClubSelection, Configuration, GripSelection, ShaftSelection};
pub use step::{Step, can_checkout, max_unlocked_step};

use serde::Serialize;
use thiserror::Error;

/// A selection rule that a candidate configuration broke.
///
/// Each variant is the single, first failing reason; rules never aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleViolation {
    /// No hand preference has been chosen.
    #[error("Select a hand preference")]
    HandRequired,

    /// Fewer clubs than the minimum set size.
    #[error(
        "Select at least {minimum} clubs ({selected} selected); missing required clubs: {}",
        format_ids(.missing_required)
    )]
    TooFewClubs {
        selected: usize,
        minimum: usize,
        missing_required: Vec<ClubId>,
    },

    /// More clubs than the catalog allows in one set.
    #[error("Select at most {maximum} clubs ({selected} selected)")]
    TooManyClubs { selected: usize, maximum: usize },

    /// Required clubs are absent.
    #[error("Required clubs missing: {}", format_ids(.missing))]
    MissingRequiredClubs { missing: Vec<ClubId> },

    /// A club is selected without a club it depends on.
    #[error("Club {club} requires club {requires}")]
    MissingDependency { club: ClubId, requires: ClubId },

    /// Removal of a required club was attempted.
    #[error("Club {0} is required and cannot be removed")]
    ClubLocked(ClubId),

    /// A shaft field is missing.
    #[error("Shaft {0} is required")]
    ShaftFieldMissing(&'static str),

    /// A grip field is missing.
    #[error("Grip {0} is required")]
    GripFieldMissing(&'static str),

    /// A text value was empty or whitespace.
    #[error("{field} cannot be blank")]
    BlankValue { field: &'static str },

    /// Navigation to a step that is not unlocked yet.
    #[error("Step {requested} is locked; furthest available step is {unlocked}")]
    StepLocked { requested: Step, unlocked: Step },
}

impl RuleViolation {
    /// Returns the configuration section this violation belongs to.
    pub fn section(&self) -> Section {
        match self {
            RuleViolation::HandRequired => Section::Hand,
            RuleViolation::TooFewClubs { .. }
            | RuleViolation::TooManyClubs { .. }
            | RuleViolation::MissingRequiredClubs { .. }
            | RuleViolation::MissingDependency { .. }
            | RuleViolation::ClubLocked(_) => Section::Clubs,
            RuleViolation::ShaftFieldMissing(_) => Section::Shaft,
            RuleViolation::GripFieldMissing(_) => Section::Grip,
            RuleViolation::BlankValue { field } if field.starts_with("Grip") => Section::Grip,
            RuleViolation::BlankValue { .. } => Section::Shaft,
            RuleViolation::StepLocked { .. } => Section::Navigation,
        }
    }
}

/// A part of the configuration, used to report what is incomplete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Section {
    Hand,
    Clubs,
    Shaft,
    Grip,
    Navigation,
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Section::Hand => "hand",
            Section::Clubs => "clubs",
            Section::Shaft => "shaft",
            Section::Grip => "grip",
            Section::Navigation => "navigation",
        };
        f.write_str(name)
    }
}

fn format_ids(ids: &[ClubId]) -> String {
    if ids.is_empty() {
        return "none".to_string();
    }
    ids.iter()
        .map(ClubId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
