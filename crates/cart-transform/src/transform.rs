//! Bundle consolidation.
//!
//! Lines sharing a bundle id are merged into their parent variant with a
//! summed price and a synthesized title. The transform is pure: the same
//! lines in the same order always give the same operations.

use std::collections::HashMap;
use std::time::Instant;

use common::{BundleId, Money, keys};

use crate::display;
use crate::error::TransformError;
use crate::input::{PurchaseOrderLine, TransformInput};
use crate::metadata::{Component, LineMetadata};
use crate::output::{MergeLine, MergeOperation, Price, TransformOutput};

/// Lines of one bundle, in input order.
#[derive(Debug)]
struct BundleGroup<'a> {
    bundle_id: BundleId,
    lines: Vec<&'a PurchaseOrderLine>,
}

/// Groups lines by bundle id in first-seen order.
///
/// Lines without a bundle id are not part of any bundle and are dropped.
fn group_by_bundle(lines: &[PurchaseOrderLine]) -> Vec<BundleGroup<'_>> {
    let mut groups: Vec<BundleGroup<'_>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for line in lines {
        let Some(bundle_id) = line.property(keys::BUNDLE_ID) else {
            continue;
        };
        let slot = *index.entry(bundle_id).or_insert_with(|| {
            groups.push(BundleGroup {
                bundle_id: BundleId::new(bundle_id),
                lines: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].lines.push(line);
    }

    groups
}

/// Builds one merge operation per bundle.
///
/// Fails on the first bad group; no partial result is returned.
pub fn consolidate(lines: &[PurchaseOrderLine]) -> Result<Vec<MergeOperation>, TransformError> {
    group_by_bundle(lines)
        .iter()
        .filter_map(|group| merge_group(group).transpose())
        .collect()
}

/// Merges one group. Every line is folded into the merge; the first main and
/// first shaft component describe the bundle.
fn merge_group(group: &BundleGroup<'_>) -> Result<Option<MergeOperation>, TransformError> {
    let bundle_id = &group.bundle_id;
    let entries = group
        .lines
        .iter()
        .map(|line| LineMetadata::parse(line, bundle_id).map(|meta| (*line, meta)))
        .collect::<Result<Vec<_>, _>>()?;

    let Some(((first_line, first_meta), _)) = entries.split_first() else {
        return Ok(None);
    };
    let parent_variant_id = &first_meta.parent_variant_id;
    let currency = &first_line.currency;

    let main = entries.iter().find_map(|(_, meta)| match &meta.component {
        Component::Main(component) => Some(component),
        Component::Shaft(_) => None,
    });
    let shaft = entries.iter().find_map(|(_, meta)| match &meta.component {
        Component::Shaft(component) => Some(component),
        Component::Main(_) => None,
    });
    let set_size = match main {
        Some(main) => main.set_size.as_str(),
        None => entries
            .iter()
            .find_map(|(_, meta)| meta.set_size.as_deref())
            .ok_or_else(|| TransformError::MissingBundleMetadata {
                line_id: first_line.id.clone(),
                bundle_id: bundle_id.clone(),
                fields: vec![keys::SET_SIZE],
            })?,
    };

    let mut total = Money::zero();
    for (line, meta) in &entries {
        if &meta.parent_variant_id != parent_variant_id {
            return Err(TransformError::ParentVariantMismatch {
                bundle_id: bundle_id.clone(),
                expected: parent_variant_id.clone(),
                found: meta.parent_variant_id.clone(),
            });
        }
        if &line.currency != currency {
            return Err(TransformError::CurrencyMismatch {
                bundle_id: bundle_id.clone(),
                expected: currency.clone(),
                found: line.currency.clone(),
            });
        }
        total = line
            .unit_price
            .checked_multiply(line.quantity)
            .and_then(|subtotal| total.checked_add(subtotal))
            .ok_or_else(|| TransformError::PriceOverflow {
                bundle_id: bundle_id.clone(),
            })?;
    }

    Ok(Some(MergeOperation {
        lines: entries
            .iter()
            .map(|(line, _)| MergeLine {
                line_id: line.id.clone(),
                quantity: line.quantity,
            })
            .collect(),
        title: display::title(set_size, shaft),
        parent_variant_id: parent_variant_id.clone(),
        price: Price {
            amount: total,
            currency_code: currency.clone(),
        },
        attributes: display::attributes(set_size, main, shaft),
    }))
}

/// Runs the transform over a platform input document.
#[tracing::instrument(skip(input), fields(lines = input.lines.len()))]
pub fn run(input: &TransformInput) -> Result<TransformOutput, TransformError> {
    let started = Instant::now();
    metrics::counter!("cart_transform_runs_total").increment(1);

    let result = consolidate(&input.lines);
    metrics::histogram!("cart_transform_duration_seconds").record(started.elapsed().as_secs_f64());

    match result {
        Ok(merges) => {
            metrics::counter!("cart_transform_merges_total").increment(merges.len() as u64);
            tracing::info!(merges = merges.len(), "cart transform complete");
            Ok(TransformOutput::from_merges(merges))
        }
        Err(e) => {
            metrics::counter!("cart_transform_failures_total", "kind" => e.kind()).increment(1);
            tracing::error!(error = %e, "cart transform failed");
            Err(e)
        }
    }
}

/// Decodes an input document, runs the transform, and encodes the output.
pub fn run_json(input: &str) -> Result<String, TransformError> {
    let input: TransformInput = serde_json::from_str(input)?;
    let output = run(&input)?;
    Ok(serde_json::to_string(&output)?)
}
