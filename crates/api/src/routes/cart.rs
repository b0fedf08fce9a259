//! Cart inspection and consolidation endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use cart_transform::{PurchaseOrderLine, TransformInput, TransformOutput};
use configurator::CartLine;
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

/// Body of a transform request. Without `lines`, the current cart is used.
#[derive(Debug, Default, Deserialize)]
pub struct TransformRequest {
    #[serde(default)]
    pub lines: Option<Vec<PurchaseOrderLine>>,
}

/// GET /cart
pub async fn lines(State(state): State<Arc<AppState>>) -> Json<Vec<CartLine>> {
    Json(state.cart().lines())
}

/// POST /cart/transform
#[tracing::instrument(skip(state, request))]
pub async fn transform(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TransformRequest>,
) -> Result<Json<TransformOutput>, ApiError> {
    let lines = match request.lines {
        Some(lines) => lines,
        None => state.cart().purchase_order_lines(),
    };
    let output = cart_transform::run(&TransformInput::new(lines))?;
    Ok(Json(output))
}
