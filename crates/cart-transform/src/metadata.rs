//! Typed bundle metadata parsed from line properties.
//!
//! Each grouped line is parsed exactly once. Required fields depend on the
//! component:
//!
//! | component | required |
//! |---|---|
//! | any | `bundleId`, `parentVariantId`, `componentType` |
//! | main | `hand`, `setSize` |
//! | shaft | `shaftBrand` |
//!
//! A line missing any of these fails with every missing field named.
//! Nothing is defaulted. `setSize` is also kept when a non-main line carries
//! it, so a bundle without a main line can still be titled.

use common::{BundleId, ComponentType, VariantId, keys};

use crate::error::TransformError;
use crate::input::PurchaseOrderLine;

/// Metadata of one bundled line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMetadata {
    pub bundle_id: BundleId,
    pub parent_variant_id: VariantId,
    pub set_size: Option<String>,
    pub component: Component,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Component {
    Main(MainComponent),
    Shaft(ShaftComponent),
}

impl Component {
    pub fn component_type(&self) -> ComponentType {
        match self {
            Component::Main(_) => ComponentType::Main,
            Component::Shaft(_) => ComponentType::Shaft,
        }
    }
}

/// The iron set itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainComponent {
    pub hand: String,
    pub set_size: String,
    pub grip: Option<String>,
    pub lie: Option<String>,
}

/// Replacement shafts for the set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaftComponent {
    pub brand: String,
    pub flex: Option<String>,
    pub length: Option<String>,
}

impl ShaftComponent {
    /// Brand followed by flex, unless the brand already spells out the flex.
    pub fn label(&self) -> String {
        match &self.flex {
            Some(flex) if !self.brand.to_lowercase().contains(&flex.to_lowercase()) => {
                format!("{} {}", self.brand, flex)
            }
            _ => self.brand.clone(),
        }
    }
}

impl LineMetadata {
    /// Parses the metadata of `line`, which was grouped under `bundle_id`.
    pub fn parse(line: &PurchaseOrderLine, bundle_id: &BundleId) -> Result<Self, TransformError> {
        let mut missing = Vec::new();
        let mut require = |key: &'static str| {
            let value = line.property(key);
            if value.is_none() {
                missing.push(key);
            }
            value.map(str::to_string)
        };

        let parent_variant_id = require(keys::PARENT_VARIANT_ID);
        let component_type = require(keys::COMPONENT_TYPE);

        let component = match component_type.as_deref().map(|raw| (raw, ComponentType::parse(raw))) {
            None => None,
            Some((_, Some(ComponentType::Main))) => {
                let hand = require(keys::HAND);
                let set_size = require(keys::SET_SIZE);
                hand.zip(set_size).map(|(hand, set_size)| {
                    Component::Main(MainComponent {
                        hand,
                        set_size,
                        grip: line.property(keys::GRIP).map(str::to_string),
                        lie: line.property(keys::LIE).map(str::to_string),
                    })
                })
            }
            Some((_, Some(ComponentType::Shaft))) => require(keys::SHAFT_BRAND).map(|brand| {
                Component::Shaft(ShaftComponent {
                    brand,
                    flex: line.property(keys::SHAFT_FLEX).map(str::to_string),
                    length: line.property(keys::SHAFT_LENGTH).map(str::to_string),
                })
            }),
            Some((raw, None)) => {
                return Err(TransformError::UnknownComponentType {
                    line_id: line.id.clone(),
                    bundle_id: bundle_id.clone(),
                    component_type: raw.to_string(),
                });
            }
        };

        match (parent_variant_id, component) {
            (Some(parent), Some(component)) if missing.is_empty() => Ok(LineMetadata {
                bundle_id: bundle_id.clone(),
                parent_variant_id: VariantId::new(parent),
                set_size: line.property(keys::SET_SIZE).map(str::to_string),
                component,
            }),
            _ => Err(TransformError::MissingBundleMetadata {
                line_id: line.id.clone(),
                bundle_id: bundle_id.clone(),
                fields: missing,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Money;

    fn line() -> PurchaseOrderLine {
        PurchaseOrderLine::new("line-1", 1, Money::from_cents(100))
            .with_property(keys::BUNDLE_ID, "golf-1")
            .with_property(keys::PARENT_VARIANT_ID, "X")
    }

    fn bundle() -> BundleId {
        BundleId::new("golf-1")
    }

    #[test]
    fn parses_main_line() {
        let line = line()
            .with_property(keys::COMPONENT_TYPE, "main")
            .with_property(keys::HAND, "Right")
            .with_property(keys::SET_SIZE, "6-PW")
            .with_property(keys::LIE, "1° Flat");

        let meta = LineMetadata::parse(&line, &bundle()).unwrap();

        assert_eq!(meta.parent_variant_id.as_str(), "X");
        assert_eq!(
            meta.component,
            Component::Main(MainComponent {
                hand: "Right".into(),
                set_size: "6-PW".into(),
                grip: None,
                lie: Some("1° Flat".into()),
            })
        );
    }

    #[test]
    fn shaft_line_needs_only_brand() {
        let line = line()
            .with_property(keys::COMPONENT_TYPE, "shaft")
            .with_property(keys::SHAFT_BRAND, "KBS");

        let meta = LineMetadata::parse(&line, &bundle()).unwrap();

        assert_eq!(meta.component.component_type(), ComponentType::Shaft);
    }

    #[test]
    fn shaft_line_keeps_set_size_when_present() {
        let line = line()
            .with_property(keys::COMPONENT_TYPE, "shaft")
            .with_property(keys::SHAFT_BRAND, "KBS")
            .with_property(keys::SET_SIZE, "5-PW");

        let meta = LineMetadata::parse(&line, &bundle()).unwrap();

        assert_eq!(meta.set_size.as_deref(), Some("5-PW"));
    }

    #[test]
    fn missing_fields_are_all_named() {
        let line = PurchaseOrderLine::new("line-9", 1, Money::zero())
            .with_property(keys::BUNDLE_ID, "golf-1")
            .with_property(keys::COMPONENT_TYPE, "main")
            .with_property(keys::HAND, "Left");

        let err = LineMetadata::parse(&line, &bundle()).unwrap_err();

        match err {
            TransformError::MissingBundleMetadata {
                line_id, fields, ..
            } => {
                assert_eq!(line_id.as_str(), "line-9");
                assert_eq!(fields, vec![keys::PARENT_VARIANT_ID, keys::SET_SIZE]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_component_type_is_reported() {
        let err = LineMetadata::parse(&line(), &bundle()).unwrap_err();
        assert!(matches!(
            err,
            TransformError::MissingBundleMetadata { ref fields, .. } if fields == &vec![keys::COMPONENT_TYPE]
        ));
    }

    #[test]
    fn unknown_component_type_is_fatal() {
        let line = line().with_property(keys::COMPONENT_TYPE, "grip");
        let err = LineMetadata::parse(&line, &bundle()).unwrap_err();
        assert!(matches!(
            err,
            TransformError::UnknownComponentType { ref component_type, .. } if component_type == "grip"
        ));
    }

    #[test]
    fn shaft_label_skips_repeated_flex() {
        let shaft = |brand: &str, flex: Option<&str>| ShaftComponent {
            brand: brand.into(),
            flex: flex.map(str::to_string),
            length: None,
        };

        assert_eq!(shaft("KBS Tour", Some("Stiff")).label(), "KBS Tour Stiff");
        assert_eq!(shaft("Project X 6.0 Stiff", Some("stiff")).label(), "Project X 6.0 Stiff");
        assert_eq!(shaft("KBS", None).label(), "KBS");
    }
}
