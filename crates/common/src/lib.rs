//! Shared types for the iron-set configurator and the cart transform.
//!
//! The configurator stamps bundle metadata onto outgoing purchase-order lines
//! and the cart transform reads it back. Both sides take the property keys,
//! component types, and identifier newtypes from this crate.

pub mod bundle;
pub mod money;
pub mod types;

pub use bundle::{ComponentType, STANDARD_LENGTH, keys};
pub use money::Money;
pub use types::{BundleId, LineId, SessionId, VariantId};
