//! The line-property contract between the configurator and the cart transform.

use serde::{Deserialize, Serialize};

/// Property keys stamped onto every bundled purchase-order line.
pub mod keys {
    pub const BUNDLE_ID: &str = "bundleId";
    pub const PARENT_VARIANT_ID: &str = "parentVariantId";
    pub const HAND: &str = "hand";
    pub const SET_SIZE: &str = "setSize";
    pub const CLUB_LIST: &str = "clubList";
    pub const COMPONENT_TYPE: &str = "componentType";
    pub const SHAFT_BRAND: &str = "shaftBrand";
    pub const SHAFT_FLEX: &str = "shaftFlex";
    pub const SHAFT_LENGTH: &str = "shaftLength";
    pub const GRIP: &str = "grip";
    pub const LIE: &str = "lie";
    pub const CLUB_COUNT: &str = "clubCount";
}

/// Display value of the neutral shaft length.
pub const STANDARD_LENGTH: &str = "Standard";

/// Which part of the bundle a line carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    /// The iron set itself.
    Main,
    /// Replacement shafts, one per club.
    Shaft,
}

impl ComponentType {
    /// Returns the wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::Main => "main",
            ComponentType::Shaft => "shaft",
        }
    }

    /// Parses the wire value; `None` for anything unrecognized.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "main" => Some(ComponentType::Main),
            "shaft" => Some(ComponentType::Shaft),
            _ => None,
        }
    }
}

impl std::fmt::Display for ComponentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
