//! Configuration session endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::SessionId;
use configurator::{CheckoutTarget, ConfigAction, StoreSnapshot, SubmissionReceipt};

use crate::error::ApiError;
use crate::state::{AppState, SessionHandle};

/// POST /configurations: starts a session with the default selection.
#[tracing::instrument(skip(state))]
pub async fn create(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<StoreSnapshot>) {
    let (_, handle) = state.create_session().await;
    let snapshot = handle.lock().await.snapshot();
    (StatusCode::CREATED, Json((*snapshot).clone()))
}

/// GET /configurations/{id}
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<StoreSnapshot>, ApiError> {
    let handle = find_session(&state, &id).await?;
    let snapshot = handle.lock().await.snapshot();
    Ok(Json((*snapshot).clone()))
}

/// POST /configurations/{id}/actions: applies one action and returns the new state.
#[tracing::instrument(skip(state, action), fields(action = action.name()))]
pub async fn dispatch(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(action): Json<ConfigAction>,
) -> Result<Json<StoreSnapshot>, ApiError> {
    let handle = find_session(&state, &id).await?;
    let mut store = handle.lock().await;
    store.dispatch(action)?;
    Ok(Json((*store.snapshot()).clone()))
}

/// POST /configurations/{id}/checkout: submits the bundle to the cart.
#[tracing::instrument(skip(state, target))]
pub async fn checkout(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(target): Json<CheckoutTarget>,
) -> Result<(StatusCode, Json<SubmissionReceipt>), ApiError> {
    let handle = find_session(&state, &id).await?;
    let receipt = state.checkout().submit(&handle, &target).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// DELETE /configurations/{id}: ends the live session.
#[tracing::instrument(skip(state))]
pub async fn close(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let session_id = parse_session_id(&id)?;
    if state.close_session(session_id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Configuration {id} not found")))
    }
}

fn parse_session_id(id: &str) -> Result<SessionId, ApiError> {
    SessionId::parse(id).map_err(|e| ApiError::BadRequest(format!("Invalid session id: {e}")))
}

async fn find_session(state: &AppState, id: &str) -> Result<SessionHandle, ApiError> {
    let session_id = parse_session_id(id)?;
    state
        .session(session_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Configuration {id} not found")))
}
