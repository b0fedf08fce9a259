//! Selection rules.
//!
//! Pure predicates and transforms over candidate selections. Validators
//! return the first failing reason; none of them aggregate.

use super::catalog::{CLUB_CATALOG, CLUB_DEPENDENCIES, Club, ClubId, MAX_CLUBS, MIN_CLUBS, ShaftLength};
use super::selection::{ClubSelection, Configuration, GripSelection, ShaftSelection};
use super::RuleViolation;

/// Returns the clubs that `id` depends on.
pub fn dependencies_of(id: ClubId) -> &'static [ClubId] {
    CLUB_DEPENDENCIES
        .iter()
        .find(|(club, _)| *club == id)
        .map(|(_, deps)| *deps)
        .unwrap_or(&[])
}

/// Returns true for clubs that can never be removed from a set.
pub fn is_club_locked(id: ClubId) -> bool {
    CLUB_CATALOG.iter().any(|c| c.id == id && c.is_required)
}

/// Checks count bounds, required clubs, and club dependencies, in that order.
pub fn validate_club_selection(clubs: &ClubSelection) -> Result<(), RuleViolation> {
    let missing_required: Vec<ClubId> = CLUB_CATALOG
        .iter()
        .filter(|c| c.is_required && !clubs.contains(c.id))
        .map(|c| c.id)
        .collect();

    if clubs.len() < MIN_CLUBS {
        return Err(RuleViolation::TooFewClubs {
            selected: clubs.len(),
            minimum: MIN_CLUBS,
            missing_required,
        });
    }

    if clubs.len() > MAX_CLUBS {
        return Err(RuleViolation::TooManyClubs {
            selected: clubs.len(),
            maximum: MAX_CLUBS,
        });
    }

    if !missing_required.is_empty() {
        return Err(RuleViolation::MissingRequiredClubs {
            missing: missing_required,
        });
    }

    for club in clubs.iter() {
        if let Some(requires) = dependencies_of(club)
            .iter()
            .find(|dep| !clubs.contains(**dep))
        {
            return Err(RuleViolation::MissingDependency {
                club,
                requires: *requires,
            });
        }
    }

    Ok(())
}

/// Adds `added` to the selection together with every club it depends on.
///
/// Dependencies are resolved transitively and looked up in `catalog`; a
/// dependency the catalog does not carry is not added, which leaves the
/// result for [`validate_club_selection`] to reject.
pub fn apply_club_selection_rules(
    current: &ClubSelection,
    added: &Club,
    catalog: &[Club],
) -> ClubSelection {
    let mut next = current.with(added.id);
    let mut pending: Vec<ClubId> = dependencies_of(added.id).to_vec();

    while let Some(dep) = pending.pop() {
        if next.contains(dep) {
            continue;
        }
        if let Some(found) = catalog.iter().find(|c| c.id == dep) {
            next = next.with(found.id);
            pending.extend_from_slice(dependencies_of(found.id));
        }
    }

    next
}

/// Removes `removed` and every selected club that depends on it.
pub fn remove_club_with_dependents(current: &ClubSelection, removed: ClubId) -> ClubSelection {
    let mut next = current.without(removed);
    let mut pending = vec![removed];

    while let Some(gone) = pending.pop() {
        let dependents: Vec<ClubId> = next
            .iter()
            .filter(|id| dependencies_of(*id).contains(&gone))
            .collect();
        for dependent in dependents {
            next = next.without(dependent);
            pending.push(dependent);
        }
    }

    next
}

/// Requires brand, flex, and length, reporting the first one missing.
pub fn validate_shaft_configuration(
    brand: Option<&str>,
    flex: Option<&str>,
    length: Option<ShaftLength>,
) -> Result<(), RuleViolation> {
    if is_blank(brand) {
        return Err(RuleViolation::ShaftFieldMissing("brand"));
    }
    if is_blank(flex) {
        return Err(RuleViolation::ShaftFieldMissing("flex"));
    }
    if length.is_none() {
        return Err(RuleViolation::ShaftFieldMissing("length"));
    }
    Ok(())
}

/// Requires grip brand, model, and size, reporting the first one missing.
pub fn validate_grip_configuration(grip: &GripSelection) -> Result<(), RuleViolation> {
    if grip.brand.trim().is_empty() {
        return Err(RuleViolation::GripFieldMissing("brand"));
    }
    if grip.model.trim().is_empty() {
        return Err(RuleViolation::GripFieldMissing("model"));
    }
    if grip.size.trim().is_empty() {
        return Err(RuleViolation::GripFieldMissing("size"));
    }
    Ok(())
}

/// Accepts an untouched shaft (stock shaft) or a complete one.
pub fn validate_shaft_selection(shaft: &ShaftSelection) -> Result<(), RuleViolation> {
    if shaft.is_untouched() {
        return Ok(());
    }
    validate_shaft_configuration(
        shaft.brand.as_deref(),
        shaft.flex.as_deref(),
        Some(shaft.length),
    )
}

/// Validates hand, clubs, shaft, and grip in that order, stopping at the first failure.
pub fn validate_complete_configuration(config: &Configuration) -> Result<(), RuleViolation> {
    if config.hand.is_none() {
        return Err(RuleViolation::HandRequired);
    }
    validate_club_selection(&config.clubs)?;
    validate_shaft_selection(&config.shaft)?;
    match &config.grip {
        Some(grip) => validate_grip_configuration(grip),
        None => Err(RuleViolation::GripFieldMissing("brand")),
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}
