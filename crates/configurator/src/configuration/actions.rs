//! Configuration actions.
//!
//! Every action produces a brand-new [`Configuration`]; the current one is
//! never touched, so a rejected action leaves nothing half-applied.

use serde::{Deserialize, Serialize};

use super::RuleViolation;
use super::catalog::{CLUB_CATALOG, ClubId, Hand, Lie, ShaftLength, club};
use super::rules;
use super::selection::{Configuration, GripSelection};
use super::step::Step;

/// A user intent against a configuration session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ConfigAction {
    SetHand { hand: Hand },
    ToggleClub { club: ClubId },
    SetShaftBrand { brand: Option<String> },
    SetShaftFlex { flex: Option<String> },
    SetShaftLength { length: ShaftLength },
    SetGrip { grip: Option<GripSelection> },
    SetLie { lie: Lie },
    GoToStep { step: Step },
    Reset,
}

impl ConfigAction {
    /// Returns the action name used in logs and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            ConfigAction::SetHand { .. } => "set_hand",
            ConfigAction::ToggleClub { .. } => "toggle_club",
            ConfigAction::SetShaftBrand { .. } => "set_shaft_brand",
            ConfigAction::SetShaftFlex { .. } => "set_shaft_flex",
            ConfigAction::SetShaftLength { .. } => "set_shaft_length",
            ConfigAction::SetGrip { .. } => "set_grip",
            ConfigAction::SetLie { .. } => "set_lie",
            ConfigAction::GoToStep { .. } => "go_to_step",
            ConfigAction::Reset => "reset",
        }
    }
}

impl Configuration {
    /// Computes the configuration that results from `action`.
    ///
    /// Navigation does not change the configuration and returns a copy;
    /// step gating is the store's job.
    pub fn apply(&self, action: &ConfigAction) -> Result<Configuration, RuleViolation> {
        match action {
            ConfigAction::SetHand { hand } => Ok(self.with_hand(*hand)),
            ConfigAction::ToggleClub { club } => self.toggle_club(*club),
            ConfigAction::SetShaftBrand { brand } => self.with_shaft_brand(brand.as_deref()),
            ConfigAction::SetShaftFlex { flex } => self.with_shaft_flex(flex.as_deref()),
            ConfigAction::SetShaftLength { length } => Ok(self.with_shaft_length(*length)),
            ConfigAction::SetGrip { grip } => self.with_grip(grip.clone()),
            ConfigAction::SetLie { lie } => Ok(self.with_lie(*lie)),
            ConfigAction::GoToStep { .. } => Ok(self.clone()),
            ConfigAction::Reset => Ok(Configuration::default()),
        }
    }

    pub fn with_hand(&self, hand: Hand) -> Configuration {
        Configuration {
            hand: Some(hand),
            ..self.clone()
        }
    }

    /// Selects or deselects a club.
    ///
    /// Locked clubs are refused before any change is computed. Selecting pulls
    /// in declared dependencies; deselecting drops clubs that depend on the
    /// removed one.
    pub fn toggle_club(&self, id: ClubId) -> Result<Configuration, RuleViolation> {
        let clubs = if self.clubs.contains(id) {
            if rules::is_club_locked(id) {
                return Err(RuleViolation::ClubLocked(id));
            }
            rules::remove_club_with_dependents(&self.clubs, id)
        } else {
            rules::apply_club_selection_rules(&self.clubs, club(id), &CLUB_CATALOG)
        };

        rules::validate_club_selection(&clubs)?;

        Ok(Configuration {
            clubs,
            ..self.clone()
        })
    }

    pub fn with_shaft_brand(&self, brand: Option<&str>) -> Result<Configuration, RuleViolation> {
        let brand = normalize(brand, "Shaft brand")?;
        let mut next = self.clone();
        next.shaft.brand = brand;
        Ok(next)
    }

    pub fn with_shaft_flex(&self, flex: Option<&str>) -> Result<Configuration, RuleViolation> {
        let flex = normalize(flex, "Shaft flex")?;
        let mut next = self.clone();
        next.shaft.flex = flex;
        Ok(next)
    }

    pub fn with_shaft_length(&self, length: ShaftLength) -> Configuration {
        let mut next = self.clone();
        next.shaft.length = length;
        next
    }

    /// Sets or clears the grip. A grip is accepted only when complete.
    pub fn with_grip(&self, grip: Option<GripSelection>) -> Result<Configuration, RuleViolation> {
        let grip = match grip {
            Some(grip) => {
                rules::validate_grip_configuration(&grip)?;
                Some(GripSelection::new(
                    grip.brand.trim(),
                    grip.model.trim(),
                    grip.size.trim(),
                ))
            }
            None => None,
        };
        Ok(Configuration {
            grip,
            ..self.clone()
        })
    }

    pub fn with_lie(&self, lie: Lie) -> Configuration {
        Configuration {
            lie,
            ..self.clone()
        }
    }
}

/// Trims a text value; `None` clears, blank is rejected.
fn normalize(value: Option<&str>, field: &'static str) -> Result<Option<String>, RuleViolation> {
    match value.map(str::trim) {
        None => Ok(None),
        Some("") => Err(RuleViolation::BlankValue { field }),
        Some(v) => Ok(Some(v.to_string())),
    }
}
