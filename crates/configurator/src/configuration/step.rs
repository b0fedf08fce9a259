//! Configuration steps and their unlock gates.

use serde::{Deserialize, Serialize};

use super::rules;
use super::selection::Configuration;

/// A step of the guided configuration flow.
///
/// Steps are strictly ordered:
/// ```text
/// Club ──► Shaft ──► Grip ──► Review
/// ```
/// Forward movement is limited to [`max_unlocked_step`]; any unlocked step
/// may be revisited.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum Step {
    #[default]
    Club,
    Shaft,
    Grip,
    Review,
}

impl Step {
    /// All steps in flow order.
    pub const ALL: [Step; 4] = [Step::Club, Step::Shaft, Step::Grip, Step::Review];

    /// Returns the zero-based position of the step.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Returns the step at a zero-based position.
    pub fn from_index(index: usize) -> Option<Step> {
        Self::ALL.get(index).copied()
    }

    /// Returns the following step, if any.
    pub fn next(&self) -> Option<Step> {
        Self::from_index(self.index() + 1)
    }

    /// Returns the preceding step, if any.
    pub fn previous(&self) -> Option<Step> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    /// Returns the step name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Club => "Club",
            Step::Shaft => "Shaft",
            Step::Grip => "Grip",
            Step::Review => "Review",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returns the furthest step the configuration may reach.
///
/// - Club: always
/// - Shaft: hand chosen and club selection valid
/// - Grip: Shaft reachable (the shaft is optional)
/// - Review: Grip reachable, grip complete, and the shaft not half-chosen
pub fn max_unlocked_step(config: &Configuration) -> Step {
    if config.hand.is_none() || rules::validate_club_selection(&config.clubs).is_err() {
        return Step::Club;
    }
    let grip_complete = config
        .grip
        .as_ref()
        .is_some_and(|grip| rules::validate_grip_configuration(grip).is_ok());
    if grip_complete && rules::validate_shaft_selection(&config.shaft).is_ok() {
        Step::Review
    } else {
        Step::Grip
    }
}

/// Returns true when the configuration can be submitted.
///
/// Shares its predicate with [`rules::validate_complete_configuration`], so the
/// checkout button and the submission guard always agree.
pub fn can_checkout(config: &Configuration) -> bool {
    rules::validate_complete_configuration(config).is_ok()
}
