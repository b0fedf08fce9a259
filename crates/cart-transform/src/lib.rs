//! Bundle consolidation for the cart.
//!
//! Given the platform's purchase-order lines, merges every group of lines
//! sharing a bundle id into one line on its parent variant, with an aggregate
//! price, a title, and display attributes. Any group with bad metadata fails
//! the whole run.

pub mod display;
pub mod error;
pub mod input;
pub mod metadata;
pub mod output;
pub mod transform;

pub use display::Attribute;
pub use error::TransformError;
pub use input::{DEFAULT_CURRENCY, PurchaseOrderLine, TransformInput};
pub use metadata::{Component, LineMetadata, MainComponent, ShaftComponent};
pub use output::{CartOperation, MergeLine, MergeOperation, Price, TransformOutput};
pub use transform::{consolidate, run, run_json};
