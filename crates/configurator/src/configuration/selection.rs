//! Selection value objects.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::catalog::{CLUB_CATALOG, ClubId, Hand, Lie, ShaftLength};

/// The set of clubs chosen for the iron set.
///
/// Unique and kept in catalog order so the serialized club list is stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClubSelection(BTreeSet<ClubId>);

impl ClubSelection {
    /// Creates a selection from club ids; duplicates collapse.
    pub fn new(ids: impl IntoIterator<Item = ClubId>) -> Self {
        Self(ids.into_iter().collect())
    }

    /// Returns the empty selection.
    pub fn empty() -> Self {
        Self(BTreeSet::new())
    }

    pub fn contains(&self, id: ClubId) -> bool {
        self.0.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = ClubId> + '_ {
        self.0.iter().copied()
    }

    /// Returns a new selection that also contains `id`.
    pub fn with(&self, id: ClubId) -> Self {
        let mut ids = self.0.clone();
        ids.insert(id);
        Self(ids)
    }

    /// Returns a new selection without `id`.
    pub fn without(&self, id: ClubId) -> Self {
        let mut ids = self.0.clone();
        ids.remove(&id);
        Self(ids)
    }

    /// Returns the set size code, e.g. `6-PW`.
    ///
    /// Named after the longest iron in the set; `None` when nothing is selected.
    pub fn set_size(&self) -> Option<String> {
        self.0.first().map(|lowest| match lowest {
            ClubId::PitchingWedge => "PW".to_string(),
            id => format!("{id}-PW"),
        })
    }
}

impl Default for ClubSelection {
    /// The required clubs only.
    fn default() -> Self {
        Self::new(CLUB_CATALOG.iter().filter(|c| c.is_required).map(|c| c.id))
    }
}

/// Shaft choice. Brand and flex start empty; length starts at standard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShaftSelection {
    pub brand: Option<String>,
    pub flex: Option<String>,
    #[serde(default)]
    pub length: ShaftLength,
}

impl ShaftSelection {
    /// Returns true when no shaft has been chosen (stock shaft).
    pub fn is_untouched(&self) -> bool {
        self.brand.is_none() && self.flex.is_none()
    }

    /// Returns true when brand and flex are both present.
    pub fn is_complete(&self) -> bool {
        self.brand.is_some() && self.flex.is_some()
    }

    /// Returns true when some but not all shaft fields are chosen.
    pub fn is_partial(&self) -> bool {
        !self.is_untouched() && !self.is_complete()
    }
}

/// Grip choice; all three fields travel together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GripSelection {
    pub brand: String,
    pub model: String,
    pub size: String,
}

impl GripSelection {
    pub fn new(
        brand: impl Into<String>,
        model: impl Into<String>,
        size: impl Into<String>,
    ) -> Self {
        Self {
            brand: brand.into(),
            model: model.into(),
            size: size.into(),
        }
    }

    /// Customer-facing description, e.g. `Golf Pride Tour Velvet (Standard)`.
    pub fn display(&self) -> String {
        format!("{} {} ({})", self.brand, self.model, self.size)
    }
}

/// The complete selection state of one configuration session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    pub hand: Option<Hand>,
    pub clubs: ClubSelection,
    pub shaft: ShaftSelection,
    pub grip: Option<GripSelection>,
    #[serde(default)]
    pub lie: Lie,
}

impl Configuration {
    /// Returns the set size code derived from the club selection.
    pub fn set_size(&self) -> Option<String> {
        self.clubs.set_size()
    }

    /// Returns the number of selected clubs.
    pub fn club_count(&self) -> usize {
        self.clubs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_selection_is_required_clubs() {
        let clubs = ClubSelection::default();
        assert_eq!(clubs.len(), 5);
        assert!(!clubs.contains(ClubId::Four));
        assert!(!clubs.contains(ClubId::Five));
        assert!(clubs.contains(ClubId::PitchingWedge));
    }

    #[test]
    fn set_size_follows_longest_iron() {
        let clubs = ClubSelection::default();
        assert_eq!(clubs.set_size().as_deref(), Some("6-PW"));
        assert_eq!(clubs.with(ClubId::Five).set_size().as_deref(), Some("5-PW"));
        assert_eq!(
            clubs.with(ClubId::Five).with(ClubId::Four).set_size().as_deref(),
            Some("4-PW")
        );
        assert_eq!(ClubSelection::empty().set_size(), None);
    }

    #[test]
    fn with_and_without_do_not_mutate_original() {
        let clubs = ClubSelection::default();
        let more = clubs.with(ClubId::Five);
        let fewer = more.without(ClubId::Five);
        assert_eq!(clubs.len(), 5);
        assert_eq!(more.len(), 6);
        assert_eq!(fewer, clubs);
    }

    #[test]
    fn duplicates_collapse_and_order_is_catalog_order() {
        let clubs = ClubSelection::new([ClubId::PitchingWedge, ClubId::Six, ClubId::Six]);
        let ids: Vec<_> = clubs.iter().collect();
        assert_eq!(ids, vec![ClubId::Six, ClubId::PitchingWedge]);
    }

    #[test]
    fn shaft_completeness() {
        let mut shaft = ShaftSelection::default();
        assert!(shaft.is_untouched());
        assert!(!shaft.is_partial());

        shaft.brand = Some("KBS".into());
        assert!(shaft.is_partial());

        shaft.flex = Some("Stiff".into());
        assert!(shaft.is_complete());
        assert!(!shaft.is_partial());
    }

    #[test]
    fn grip_display() {
        let grip = GripSelection::new("Golf Pride", "Tour Velvet", "Standard");
        assert_eq!(grip.display(), "Golf Pride Tour Velvet (Standard)");
    }

    #[test]
    fn configuration_serialization() {
        let config = Configuration {
            hand: Some(Hand::Left),
            clubs: ClubSelection::default().with(ClubId::Five),
            ..Configuration::default()
        };
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["hand"], "Left");
        assert_eq!(json["clubs"], serde_json::json!(["5", "6", "7", "8", "9", "PW"]));
        assert_eq!(json["lie"], "Standard");

        let back: Configuration = serde_json::from_value(json).unwrap();
        assert_eq!(back, config);
    }
}
