//! Checkout submission against the commerce platform's cart.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use cart_transform::PurchaseOrderLine;
use common::{BundleId, LineId, Money, VariantId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::bundle::{BundleLine, build_lines, generate_bundle_id};
use crate::configuration::Configuration;
use crate::error::ConfigurationError;
use crate::store::ConfigurationStore;

/// Errors returned by the cart boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// The cart refused the request.
    #[error("Cart rejected the request: {0}")]
    Rejected(String),

    /// The cart could not be reached.
    #[error("Cart unavailable: {0}")]
    Unavailable(String),
}

/// One item of a cart add request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Variant to add.
    pub id: VariantId,
    pub quantity: u32,
    /// Flattened bundle metadata.
    pub properties: BTreeMap<String, String>,
}

/// Request body sent to the cart: `{items: [{id, quantity, properties}]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartAddRequest {
    pub items: Vec<CartItem>,
}

/// Cart response: the line ids created, in request order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartAddResponse {
    pub line_ids: Vec<LineId>,
}

/// The commerce platform's cart endpoint.
#[async_trait]
pub trait CartClient: Send + Sync {
    /// Adds lines to the cart.
    async fn add_lines(&self, request: &CartAddRequest) -> Result<CartAddResponse, CheckoutError>;
}

/// A line held by [`InMemoryCartClient`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: LineId,
    pub variant_id: VariantId,
    pub quantity: u32,
    pub unit_price: Money,
    pub currency: String,
    pub properties: BTreeMap<String, String>,
}

#[derive(Debug, Default)]
struct InMemoryCartState {
    lines: Vec<CartLine>,
    prices: HashMap<VariantId, Money>,
    next_id: u32,
    fail_with: Option<String>,
}

/// In-memory cart for hosts and tests.
///
/// Prices come from a per-variant table; unlisted variants cost zero.
#[derive(Debug, Clone)]
pub struct InMemoryCartClient {
    state: Arc<RwLock<InMemoryCartState>>,
    currency: String,
}

impl InMemoryCartClient {
    /// Creates an empty cart priced in `currency`.
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            state: Arc::default(),
            currency: currency.into(),
        }
    }

    /// Sets the unit price of a variant.
    pub fn set_price(&self, variant: impl Into<VariantId>, price: Money) {
        self.write().prices.insert(variant.into(), price);
    }

    /// Makes every following add fail with `reason` (or succeed again with `None`).
    pub fn set_fail_with(&self, reason: Option<String>) {
        self.write().fail_with = reason;
    }

    /// Returns the lines currently in the cart, in insertion order.
    pub fn lines(&self) -> Vec<CartLine> {
        self.read().lines.clone()
    }

    /// Exports the cart as transform input lines.
    pub fn purchase_order_lines(&self) -> Vec<PurchaseOrderLine> {
        self.read()
            .lines
            .iter()
            .map(|line| PurchaseOrderLine {
                id: line.id.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price,
                currency: line.currency.clone(),
                properties: line.properties.clone(),
            })
            .collect()
    }

    pub fn line_count(&self) -> usize {
        self.read().lines.len()
    }

    /// Empties the cart.
    pub fn clear(&self) {
        self.write().lines.clear();
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, InMemoryCartState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, InMemoryCartState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemoryCartClient {
    fn default() -> Self {
        Self::new("USD")
    }
}

#[async_trait]
impl CartClient for InMemoryCartClient {
    async fn add_lines(&self, request: &CartAddRequest) -> Result<CartAddResponse, CheckoutError> {
        let mut state = self.write();

        if let Some(reason) = &state.fail_with {
            return Err(CheckoutError::Unavailable(reason.clone()));
        }
        if request.items.is_empty() {
            return Err(CheckoutError::Rejected("no items to add".to_string()));
        }
        if let Some(item) = request.items.iter().find(|item| item.quantity == 0) {
            return Err(CheckoutError::Rejected(format!(
                "quantity for {} must be greater than 0",
                item.id
            )));
        }

        let mut line_ids = Vec::with_capacity(request.items.len());
        for item in &request.items {
            state.next_id += 1;
            let id = LineId::new(format!("cart-line-{:04}", state.next_id));
            let unit_price = state.prices.get(&item.id).copied().unwrap_or_default();
            state.lines.push(CartLine {
                id: id.clone(),
                variant_id: item.id.clone(),
                quantity: item.quantity,
                unit_price,
                currency: self.currency.clone(),
                properties: item.properties.clone(),
            });
            line_ids.push(id);
        }

        Ok(CartAddResponse { line_ids })
    }
}

/// Which catalog variants the bundle should be added as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutTarget {
    /// Iron set variant; also the parent every line merges into.
    pub main_variant_id: VariantId,
    /// Shaft variant, required when a shaft is selected.
    #[serde(default)]
    pub shaft_variant_id: Option<VariantId>,
}

/// Outcome of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub bundle_id: BundleId,
    pub line_ids: Vec<LineId>,
    pub items: Vec<CartItem>,
}

/// Submits configurations to the cart, one attempt at a time per session.
pub struct CheckoutService<C: CartClient> {
    cart: C,
}

impl<C: CartClient> CheckoutService<C> {
    pub fn new(cart: C) -> Self {
        Self { cart }
    }

    /// Returns the cart client.
    pub fn cart(&self) -> &C {
        &self.cart
    }

    /// Submits the store's configuration as a new bundle.
    ///
    /// The store is marked as submitting while the cart call is awaited, and
    /// its lock is released meanwhile so a second attempt sees the flag and
    /// fails with [`ConfigurationError::SubmissionInFlight`]. Failures clear
    /// the flag and are recorded in the store; nothing is retried. Dropping
    /// the returned future before it completes also clears the flag.
    #[tracing::instrument(skip(self, store), fields(main_variant = %target.main_variant_id))]
    pub async fn submit(
        &self,
        store: &Arc<Mutex<ConfigurationStore>>,
        target: &CheckoutTarget,
    ) -> Result<SubmissionReceipt, ConfigurationError> {
        let configuration = store.lock().await.begin_submission()?;
        let pending = PendingSubmission::new(store);
        let started = std::time::Instant::now();

        let outcome = self.send(&configuration, target).await;

        let mut guard = store.lock().await;
        pending.complete();
        match &outcome {
            Ok(receipt) => {
                guard.finish_submission(None);
                metrics::counter!("checkout_submissions_total", "outcome" => "success")
                    .increment(1);
                tracing::info!(bundle_id = %receipt.bundle_id, lines = receipt.line_ids.len(), "bundle submitted");
            }
            Err(e) => {
                guard.finish_submission(Some(e.to_string()));
                metrics::counter!("checkout_submissions_total", "outcome" => "failure")
                    .increment(1);
                tracing::warn!(error = %e, "bundle submission failed");
            }
        }
        metrics::histogram!("checkout_submission_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        outcome
    }

    async fn send(
        &self,
        configuration: &Configuration,
        target: &CheckoutTarget,
    ) -> Result<SubmissionReceipt, ConfigurationError> {
        let bundle_id = generate_bundle_id();
        let lines = build_lines(
            configuration,
            &bundle_id,
            &target.main_variant_id,
            target.shaft_variant_id.as_ref(),
        )?;

        let request = CartAddRequest {
            items: lines.iter().map(BundleLine::to_cart_item).collect(),
        };
        let response = self.cart.add_lines(&request).await?;

        Ok(SubmissionReceipt {
            bundle_id,
            line_ids: response.line_ids,
            items: request.items,
        })
    }
}

/// Error recorded when a submission is dropped before the cart answers.
pub const SUBMISSION_CANCELLED: &str = "Checkout was cancelled before the cart responded";

/// Clears the submitting flag if a submission is abandoned mid-flight.
struct PendingSubmission {
    store: Option<Arc<Mutex<ConfigurationStore>>>,
}

impl PendingSubmission {
    fn new(store: &Arc<Mutex<ConfigurationStore>>) -> Self {
        Self {
            store: Some(Arc::clone(store)),
        }
    }

    /// The caller finishes the submission itself.
    fn complete(mut self) {
        self.store = None;
    }
}

impl Drop for PendingSubmission {
    fn drop(&mut self) {
        let Some(store) = self.store.take() else {
            return;
        };

        metrics::counter!("checkout_submissions_total", "outcome" => "cancelled").increment(1);

        if let Ok(mut guard) = store.try_lock() {
            guard.finish_submission(Some(SUBMISSION_CANCELLED.to_string()));
            tracing::warn!(session_id = %guard.session_id(), "bundle submission cancelled");
            return;
        }

        // The lock is busy; clear the flag once it frees up.
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    let mut guard = store.lock().await;
                    guard.finish_submission(Some(SUBMISSION_CANCELLED.to_string()));
                    tracing::warn!(session_id = %guard.session_id(), "bundle submission cancelled");
                });
            }
            Err(_) => {
                tracing::error!("submission cancelled outside a runtime, submitting flag left set");
            }
        }
    }
}
