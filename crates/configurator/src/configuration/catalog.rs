//! Fixed club catalog and the enumerated options of the configurator.

use serde::{Deserialize, Serialize};

/// Fewest clubs a set may contain.
pub const MIN_CLUBS: usize = 5;

/// Most clubs a set may contain.
pub const MAX_CLUBS: usize = 7;

/// Identifier of a club in the catalog.
///
/// Ordered by catalog position, longest iron first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ClubId {
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "9")]
    Nine,
    #[serde(rename = "PW")]
    PitchingWedge,
}

impl ClubId {
    /// Returns the display id (`"4"` … `"PW"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            ClubId::Four => "4",
            ClubId::Five => "5",
            ClubId::Six => "6",
            ClubId::Seven => "7",
            ClubId::Eight => "8",
            ClubId::Nine => "9",
            ClubId::PitchingWedge => "PW",
        }
    }

    /// Parses a display id.
    pub fn parse(value: &str) -> Option<Self> {
        CLUB_CATALOG
            .iter()
            .map(|club| club.id)
            .find(|id| id.as_str() == value)
    }
}

impl std::fmt::Display for ClubId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of club.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClubType {
    Iron,
    Wedge,
}

/// A club in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Club {
    pub id: ClubId,
    pub name: &'static str,
    #[serde(rename = "type")]
    pub club_type: ClubType,
    pub is_required: bool,
    pub is_optional: bool,
}

impl Club {
    const fn required(id: ClubId, name: &'static str, club_type: ClubType) -> Self {
        Self {
            id,
            name,
            club_type,
            is_required: true,
            is_optional: false,
        }
    }

    const fn optional(id: ClubId, name: &'static str) -> Self {
        Self {
            id,
            name,
            club_type: ClubType::Iron,
            is_required: false,
            is_optional: true,
        }
    }
}

/// Every club that can be part of a set, in catalog order.
pub const CLUB_CATALOG: [Club; 7] = [
    Club::optional(ClubId::Four, "4 Iron"),
    Club::optional(ClubId::Five, "5 Iron"),
    Club::required(ClubId::Six, "6 Iron", ClubType::Iron),
    Club::required(ClubId::Seven, "7 Iron", ClubType::Iron),
    Club::required(ClubId::Eight, "8 Iron", ClubType::Iron),
    Club::required(ClubId::Nine, "9 Iron", ClubType::Iron),
    Club::required(ClubId::PitchingWedge, "Pitching Wedge", ClubType::Wedge),
];

/// Declarative club dependencies: selecting the key requires every listed club.
pub const CLUB_DEPENDENCIES: &[(ClubId, &[ClubId])] = &[(ClubId::Four, &[ClubId::Five])];

/// Looks up a club in the catalog.
pub fn club(id: ClubId) -> &'static Club {
    // The catalog lists every ClubId variant exactly once, in declaration order.
    &CLUB_CATALOG[id as usize]
}

/// Which hand the set is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hand {
    Right,
    Left,
}

impl Hand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Hand::Right => "Right",
            Hand::Left => "Left",
        }
    }
}

impl std::fmt::Display for Hand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lie angle adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Lie {
    #[serde(rename = "2° Flat")]
    TwoFlat,
    #[serde(rename = "1° Flat")]
    OneFlat,
    #[default]
    Standard,
    #[serde(rename = "1° Upright")]
    OneUpright,
    #[serde(rename = "2° Upright")]
    TwoUpright,
}

impl Lie {
    pub fn as_str(&self) -> &'static str {
        match self {
            Lie::TwoFlat => "2° Flat",
            Lie::OneFlat => "1° Flat",
            Lie::Standard => "Standard",
            Lie::OneUpright => "1° Upright",
            Lie::TwoUpright => "2° Upright",
        }
    }
}

impl std::fmt::Display for Lie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shaft length relative to standard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ShaftLength {
    #[serde(rename = "-1\"")]
    MinusOne,
    #[serde(rename = "-1/2\"")]
    MinusHalf,
    #[default]
    Standard,
    #[serde(rename = "+1/2\"")]
    PlusHalf,
    #[serde(rename = "+1\"")]
    PlusOne,
}

impl ShaftLength {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShaftLength::MinusOne => "-1\"",
            ShaftLength::MinusHalf => "-1/2\"",
            ShaftLength::Standard => common::STANDARD_LENGTH,
            ShaftLength::PlusHalf => "+1/2\"",
            ShaftLength::PlusOne => "+1\"",
        }
    }
}

impl std::fmt::Display for ShaftLength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
