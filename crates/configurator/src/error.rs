//! Configurator error types.

use thiserror::Error;

use crate::checkout::CheckoutError;
use crate::configuration::{RuleViolation, Section};

/// Errors surfaced by configuration sessions and checkout.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// A selection rule rejected the action; the configuration is unchanged.
    #[error("{0}")]
    Rule(#[from] RuleViolation),

    /// Checkout was attempted before the configuration was complete.
    #[error("Configuration incomplete ({section}): {reason}")]
    Incomplete {
        section: Section,
        reason: RuleViolation,
    },

    /// A complete shaft was chosen but no shaft product variant was supplied.
    #[error("A shaft variant is required when a shaft is selected")]
    ShaftVariantRequired,

    /// A previous submission has not finished yet.
    #[error("A checkout submission is already in progress")]
    SubmissionInFlight,

    /// The cart rejected or failed the submission.
    #[error("Checkout failed: {0}")]
    Checkout(#[from] CheckoutError),
}

impl ConfigurationError {
    /// Wraps a rule violation as an incomplete-configuration error.
    pub fn incomplete(reason: RuleViolation) -> Self {
        ConfigurationError::Incomplete {
            section: reason.section(),
            reason,
        }
    }
}
