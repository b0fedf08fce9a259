//! Transform input: the platform's current purchase-order lines.

use std::collections::BTreeMap;

use common::{LineId, Money};
use serde::{Deserialize, Serialize};

/// Currency assumed when a line does not state one.
pub const DEFAULT_CURRENCY: &str = "USD";

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

/// The document the platform hands the transform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformInput {
    #[serde(default)]
    pub lines: Vec<PurchaseOrderLine>,
}

impl TransformInput {
    pub fn new(lines: Vec<PurchaseOrderLine>) -> Self {
        Self { lines }
    }
}

/// One purchase-order line with its string properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderLine {
    pub id: LineId,
    pub quantity: u32,
    /// Unit price in minor units.
    pub unit_price: Money,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default, alias = "metadata")]
    pub properties: BTreeMap<String, String>,
}

impl PurchaseOrderLine {
    /// Creates a line priced in the default currency with no properties.
    pub fn new(id: impl Into<LineId>, quantity: u32, unit_price: Money) -> Self {
        Self {
            id: id.into(),
            quantity,
            unit_price,
            currency: default_currency(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Returns a trimmed property value; blank values count as absent.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .get(key)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_platform_shape() {
        let input: TransformInput = serde_json::from_str(
            r#"{"lines":[{"id":"a","quantity":2,"unitPrice":1500,"currency":"CAD",
                "properties":{"bundleId":"golf-1"}}]}"#,
        )
        .unwrap();

        let line = &input.lines[0];
        assert_eq!(line.id.as_str(), "a");
        assert_eq!(line.quantity, 2);
        assert_eq!(line.unit_price, Money::from_cents(1500));
        assert_eq!(line.currency, "CAD");
        assert_eq!(line.property("bundleId"), Some("golf-1"));
    }

    #[test]
    fn metadata_alias_and_default_currency() {
        let line: PurchaseOrderLine = serde_json::from_str(
            r#"{"id":"b","quantity":1,"unitPrice":100,"metadata":{"hand":"Left"}}"#,
        )
        .unwrap();

        assert_eq!(line.currency, DEFAULT_CURRENCY);
        assert_eq!(line.property("hand"), Some("Left"));
    }

    #[test]
    fn blank_property_is_absent() {
        let line = PurchaseOrderLine::new("c", 1, Money::zero())
            .with_property("bundleId", "   ")
            .with_property("hand", " Right ");

        assert_eq!(line.property("bundleId"), None);
        assert_eq!(line.property("hand"), Some("Right"));
        assert_eq!(line.property("setSize"), None);
    }
}
