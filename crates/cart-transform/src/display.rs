//! Title and attributes shown on a merged bundle.

use common::STANDARD_LENGTH;
use serde::{Deserialize, Serialize};

use crate::metadata::{MainComponent, ShaftComponent};

/// A key/value attribute shown on the merged line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub key: String,
    pub value: String,
}

impl Attribute {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// `Custom Iron Set (6-PW)`, or `Custom Iron Set (6-PW) with KBS Stiff Shafts`.
pub fn title(set_size: &str, shaft: Option<&ShaftComponent>) -> String {
    let base = format!("Custom Iron Set ({set_size})");
    match shaft {
        Some(shaft) => format!("{base} with {} Shafts", shaft.label()),
        None => base,
    }
}

/// Attributes in display order. Absent values are left out.
///
/// Grip and lie come from the main component, so a bundle without one shows
/// only its set size and shaft.
pub fn attributes(
    set_size: &str,
    main: Option<&MainComponent>,
    shaft: Option<&ShaftComponent>,
) -> Vec<Attribute> {
    let mut attributes = vec![Attribute::new("Set Option", set_size)];

    if let Some(lie) = main.and_then(|m| m.lie.as_deref()) {
        attributes.push(Attribute::new("Lie Angle", lie));
    }
    if let Some(shaft) = shaft {
        attributes.push(Attribute::new("Shaft", shaft.label()));
        if let Some(length) = shaft.length.as_deref().filter(|l| *l != STANDARD_LENGTH) {
            attributes.push(Attribute::new("Length", length));
        }
    }
    if let Some(grip) = main.and_then(|m| m.grip.as_deref()) {
        attributes.push(Attribute::new("Grip", grip));
    }

    attributes
}
