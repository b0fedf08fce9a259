//! Transform error types.

use common::{BundleId, LineId, VariantId};
use thiserror::Error;

/// Errors that abort a transform invocation.
///
/// Every variant is fatal: no merge operations are produced when any group
/// fails, so bad metadata never reaches checkout silently.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A bundled line lacks metadata the merge depends on.
    #[error(
        "Line {line_id} in bundle {bundle_id} is missing required metadata: {}",
        fields.join(", ")
    )]
    MissingBundleMetadata {
        line_id: LineId,
        bundle_id: BundleId,
        fields: Vec<&'static str>,
    },

    /// A line names a component type the merge does not know.
    #[error("Line {line_id} in bundle {bundle_id} has unknown component type '{component_type}'")]
    UnknownComponentType {
        line_id: LineId,
        bundle_id: BundleId,
        component_type: String,
    },

    /// Lines of one bundle point at different parent variants.
    #[error("Bundle {bundle_id} has conflicting parent variants: {expected} and {found}")]
    ParentVariantMismatch {
        bundle_id: BundleId,
        expected: VariantId,
        found: VariantId,
    },

    /// Lines of one bundle are priced in different currencies.
    #[error("Bundle {bundle_id} mixes currencies: {expected} and {found}")]
    CurrencyMismatch {
        bundle_id: BundleId,
        expected: String,
        found: String,
    },

    /// The bundle total does not fit in the price type.
    #[error("Bundle {bundle_id} total price overflows")]
    PriceOverflow { bundle_id: BundleId },

    /// The input document could not be decoded, or the output encoded.
    #[error("Invalid transform document: {0}")]
    Json(#[from] serde_json::Error),
}

impl TransformError {
    /// Returns a short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            TransformError::MissingBundleMetadata { .. } => "missing_metadata",
            TransformError::UnknownComponentType { .. } => "unknown_component",
            TransformError::ParentVariantMismatch { .. } => "parent_mismatch",
            TransformError::CurrencyMismatch { .. } => "currency_mismatch",
            TransformError::PriceOverflow { .. } => "price_overflow",
            TransformError::Json(_) => "json",
        }
    }
}
