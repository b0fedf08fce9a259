//! Bundle identity and purchase-order line building.
//!
//! At checkout a configuration becomes one main line plus, when a shaft is
//! chosen, one shaft line. Every line carries the same bundle id and parent
//! variant so the cart transform can merge them back into one unit.

use std::collections::BTreeMap;

use common::{BundleId, ComponentType, VariantId, keys};
use serde_json::Value;

use crate::checkout::CartItem;
use crate::configuration::{ClubId, Configuration, Hand, Lie, RuleViolation, ShaftLength, rules};
use crate::error::ConfigurationError;

/// Mints a bundle id: `golf-<unix millis>-<random suffix>`.
pub fn generate_bundle_id() -> BundleId {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    BundleId::new(format!("golf-{millis}-{}", &suffix[..8]))
}

/// Metadata stamped onto one bundled line. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleMetadata {
    pub bundle_id: BundleId,
    pub parent_variant_id: VariantId,
    pub hand: Hand,
    pub set_size: String,
    pub component: ComponentMetadata,
}

/// Per-component part of the line metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentMetadata {
    Main {
        club_list: Vec<ClubId>,
        grip: Option<String>,
        lie: Lie,
    },
    Shaft {
        brand: String,
        flex: String,
        length: ShaftLength,
        club_count: usize,
    },
}

impl BundleMetadata {
    pub fn component_type(&self) -> ComponentType {
        match self.component {
            ComponentMetadata::Main { .. } => ComponentType::Main,
            ComponentMetadata::Shaft { .. } => ComponentType::Shaft,
        }
    }

    /// Flattens the metadata into string line properties.
    pub fn to_properties(&self) -> BTreeMap<String, String> {
        let mut props = BTreeMap::new();
        let mut put = |key: &str, value: String| {
            props.insert(key.to_string(), value);
        };

        put(keys::BUNDLE_ID, self.bundle_id.to_string());
        put(keys::PARENT_VARIANT_ID, self.parent_variant_id.to_string());
        put(keys::HAND, self.hand.to_string());
        put(keys::SET_SIZE, self.set_size.clone());
        put(keys::COMPONENT_TYPE, self.component_type().to_string());

        match &self.component {
            ComponentMetadata::Main {
                club_list,
                grip,
                lie,
            } => {
                let ids = club_list
                    .iter()
                    .map(|id| Value::String(id.as_str().to_string()))
                    .collect();
                put(keys::CLUB_LIST, Value::Array(ids).to_string());
                if let Some(grip) = grip {
                    put(keys::GRIP, grip.clone());
                }
                put(keys::LIE, lie.to_string());
            }
            ComponentMetadata::Shaft {
                brand,
                flex,
                length,
                club_count,
            } => {
                put(keys::SHAFT_BRAND, brand.clone());
                put(keys::SHAFT_FLEX, flex.clone());
                put(keys::SHAFT_LENGTH, length.to_string());
                put(keys::CLUB_COUNT, club_count.to_string());
            }
        }

        props
    }
}

/// One line to add to the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleLine {
    pub variant_id: VariantId,
    pub quantity: u32,
    pub metadata: BundleMetadata,
}

impl BundleLine {
    /// Converts to the cart submission shape.
    pub fn to_cart_item(&self) -> CartItem {
        CartItem {
            id: self.variant_id.clone(),
            quantity: self.quantity,
            properties: self.metadata.to_properties(),
        }
    }
}

/// Builds the lines for one checkout attempt.
///
/// The main line always comes first with quantity 1. A shaft line follows when
/// the shaft selection is complete, with one shaft per club. A complete shaft
/// without `shaft_variant` is an error, as is a half-chosen shaft.
pub fn build_lines(
    config: &Configuration,
    bundle_id: &BundleId,
    main_variant: &VariantId,
    shaft_variant: Option<&VariantId>,
) -> Result<Vec<BundleLine>, ConfigurationError> {
    let hand = config
        .hand
        .ok_or_else(|| ConfigurationError::incomplete(RuleViolation::HandRequired))?;
    rules::validate_club_selection(&config.clubs).map_err(ConfigurationError::incomplete)?;
    rules::validate_shaft_selection(&config.shaft).map_err(ConfigurationError::incomplete)?;
    let set_size = config
        .set_size()
        .ok_or_else(|| {
            ConfigurationError::incomplete(RuleViolation::TooFewClubs {
                selected: 0,
                minimum: crate::configuration::MIN_CLUBS,
                missing_required: vec![],
            })
        })?;

    let metadata = |component: ComponentMetadata| BundleMetadata {
        bundle_id: bundle_id.clone(),
        parent_variant_id: main_variant.clone(),
        hand,
        set_size: set_size.clone(),
        component,
    };

    let mut lines = vec![BundleLine {
        variant_id: main_variant.clone(),
        quantity: 1,
        metadata: metadata(ComponentMetadata::Main {
            club_list: config.clubs.iter().collect(),
            grip: config.grip.as_ref().map(|g| g.display()),
            lie: config.lie,
        }),
    }];

    if let (Some(brand), Some(flex)) = (&config.shaft.brand, &config.shaft.flex) {
        let shaft_variant = shaft_variant.ok_or(ConfigurationError::ShaftVariantRequired)?;
        let club_count = config.club_count();
        lines.push(BundleLine {
            variant_id: shaft_variant.clone(),
            quantity: club_count as u32,
            metadata: metadata(ComponentMetadata::Shaft {
                brand: brand.clone(),
                flex: flex.clone(),
                length: config.shaft.length,
                club_count,
            }),
        });
    } else if shaft_variant.is_some() {
        tracing::debug!(%bundle_id, "shaft variant supplied without a shaft selection, ignoring");
    }

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::GripSelection;

    fn config() -> Configuration {
        Configuration {
            hand: Some(Hand::Right),
            grip: Some(GripSelection::new("Golf Pride", "Tour Velvet", "Standard")),
            ..Configuration::default()
        }
    }

    fn with_shaft(mut config: Configuration) -> Configuration {
        config.shaft.brand = Some("KBS".into());
        config.shaft.flex = Some("Stiff".into());
        config
    }

    #[test]
    fn bundle_ids_are_unique_and_prefixed() {
        let a = generate_bundle_id();
        let b = generate_bundle_id();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("golf-"));
        assert_eq!(a.as_str().rsplit('-').next().unwrap().len(), 8);
    }

    #[test]
    fn main_line_only_without_shaft() {
        let bundle_id = BundleId::new("golf-1000");
        let main = VariantId::new("main-1");
        let lines = build_lines(&config(), &bundle_id, &main, None).unwrap();

        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        assert_eq!(line.quantity, 1);
        assert_eq!(line.variant_id, main);

        let props = line.metadata.to_properties();
        assert_eq!(props[keys::BUNDLE_ID], "golf-1000");
        assert_eq!(props[keys::PARENT_VARIANT_ID], "main-1");
        assert_eq!(props[keys::HAND], "Right");
        assert_eq!(props[keys::SET_SIZE], "6-PW");
        assert_eq!(props[keys::COMPONENT_TYPE], "main");
        assert_eq!(props[keys::CLUB_LIST], r#"["6","7","8","9","PW"]"#);
        assert_eq!(props[keys::GRIP], "Golf Pride Tour Velvet (Standard)");
        assert_eq!(props[keys::LIE], "Standard");
        assert!(!props.contains_key(keys::SHAFT_BRAND));
    }

    #[test]
    fn shaft_line_quantity_is_club_count() {
        let config = with_shaft(config()).toggle_club(ClubId::Four).unwrap();
        let bundle_id = BundleId::new("golf-2000");
        let main = VariantId::new("main-4pw");
        let shaft = VariantId::new("shaft-kbs");

        let lines = build_lines(&config, &bundle_id, &main, Some(&shaft)).unwrap();

        assert_eq!(lines.len(), 2);
        let shaft_line = &lines[1];
        assert_eq!(shaft_line.variant_id, shaft);
        assert_eq!(shaft_line.quantity, 7);

        let props = shaft_line.metadata.to_properties();
        assert_eq!(props[keys::COMPONENT_TYPE], "shaft");
        assert_eq!(props[keys::SHAFT_BRAND], "KBS");
        assert_eq!(props[keys::SHAFT_FLEX], "Stiff");
        assert_eq!(props[keys::SHAFT_LENGTH], "Standard");
        assert_eq!(props[keys::CLUB_COUNT], "7");
        assert_eq!(props[keys::SET_SIZE], "4-PW");
        assert!(!props.contains_key(keys::CLUB_LIST));
    }

    #[test]
    fn every_line_shares_bundle_and_parent() {
        let lines = build_lines(
            &with_shaft(config()),
            &BundleId::new("golf-3000"),
            &VariantId::new("main"),
            Some(&VariantId::new("shaft")),
        )
        .unwrap();

        for line in &lines {
            assert_eq!(line.metadata.bundle_id.as_str(), "golf-3000");
            assert_eq!(line.metadata.parent_variant_id.as_str(), "main");
        }
    }

    #[test]
    fn complete_shaft_requires_shaft_variant() {
        let result = build_lines(
            &with_shaft(config()),
            &BundleId::new("golf-4000"),
            &VariantId::new("main"),
            None,
        );
        assert!(matches!(result, Err(ConfigurationError::ShaftVariantRequired)));
    }

    #[test]
    fn missing_hand_is_incomplete() {
        let config = Configuration::default();
        let result = build_lines(
            &config,
            &BundleId::new("golf-5000"),
            &VariantId::new("main"),
            None,
        );
        assert!(matches!(
            result,
            Err(ConfigurationError::Incomplete {
                reason: RuleViolation::HandRequired,
                ..
            })
        ));
    }

    #[test]
    fn cart_item_carries_properties() {
        let lines = build_lines(
            &config(),
            &BundleId::new("golf-6000"),
            &VariantId::new("main"),
            None,
        )
        .unwrap();
        let item = lines[0].to_cart_item();
        assert_eq!(item.id.as_str(), "main");
        assert_eq!(item.quantity, 1);
        assert_eq!(item.properties[keys::BUNDLE_ID], "golf-6000");
    }
}
