//! Transform output in the platform's operation envelope.

use common::{LineId, Money, VariantId};
use serde::{Deserialize, Serialize};

use crate::display::Attribute;

/// A line taking part in a merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeLine {
    pub line_id: LineId,
    pub quantity: u32,
}

/// Aggregate price of a merged bundle, in minor units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    pub amount: Money,
    pub currency_code: String,
}

/// Merge of one bundle's lines into its parent variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeOperation {
    pub lines: Vec<MergeLine>,
    pub title: String,
    pub parent_variant_id: VariantId,
    pub price: Price,
    pub attributes: Vec<Attribute>,
}

/// An operation returned to the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CartOperation {
    Merge(MergeOperation),
}

/// `{operations: [{merge: {...}}]}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformOutput {
    pub operations: Vec<CartOperation>,
}

impl TransformOutput {
    pub fn from_merges(merges: Vec<MergeOperation>) -> Self {
        Self {
            operations: merges.into_iter().map(CartOperation::Merge).collect(),
        }
    }

    /// Iterates over the merge operations.
    pub fn merges(&self) -> impl Iterator<Item = &MergeOperation> {
        self.operations.iter().map(|op| match op {
            CartOperation::Merge(merge) => merge,
        })
    }
}
