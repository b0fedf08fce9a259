//! Iron-set configurator.
//!
//! This crate provides:
//! - The club catalog and the selection rules that gate every mutation
//! - A step-gated configuration state machine behind an explicit store
//! - Debounced persistence of the current selection
//! - Bundle identity and purchase-order line building for checkout
//! - Checkout submission against a cart boundary

pub mod bundle;
pub mod checkout;
pub mod configuration;
pub mod error;
pub mod persistence;
pub mod store;

pub use bundle::{BundleLine, BundleMetadata, ComponentMetadata, build_lines, generate_bundle_id};
pub use checkout::{
    CartAddRequest, CartAddResponse, CartClient, CartItem, CartLine, CheckoutError,
    CheckoutService, CheckoutTarget, InMemoryCartClient, SUBMISSION_CANCELLED, SubmissionReceipt,
};
pub use configuration::{
    CLUB_CATALOG, Club, ClubId, ClubSelection, ClubType, ConfigAction, Configuration,
    GripSelection, Hand, Lie, RuleViolation, Section, ShaftLength, ShaftSelection, Step, rules,
};
pub use error::ConfigurationError;
pub use persistence::{
    DebouncedPersister, InMemorySelectionRepository, PersistenceError, SelectionRepository,
};
pub use store::{ConfigurationStore, Derivation, Derived, StoreSnapshot};
