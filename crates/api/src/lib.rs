//! HTTP API for iron-set configuration.
//!
//! Exposes configuration sessions, checkout into an in-memory cart, and the
//! cart transform over HTTP, with structured logging (tracing) and Prometheus
//! metrics.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use cart_transform::DEFAULT_CURRENCY;
use configurator::{InMemoryCartClient, InMemorySelectionRepository};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use state::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::system::metrics))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::system::health))
        .route("/configurations", post(routes::configurations::create))
        .route(
            "/configurations/{id}",
            get(routes::configurations::get).delete(routes::configurations::close),
        )
        .route(
            "/configurations/{id}/actions",
            post(routes::configurations::dispatch),
        )
        .route(
            "/configurations/{id}/checkout",
            post(routes::configurations::checkout),
        )
        .route("/cart", get(routes::cart::lines))
        .route("/cart/transform", post(routes::cart::transform))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates application state backed by in-memory selection storage and cart.
pub fn create_default_state(config: &Config) -> Arc<AppState> {
    let repository = Arc::new(InMemorySelectionRepository::new());
    let cart = InMemoryCartClient::new(DEFAULT_CURRENCY);
    Arc::new(AppState::new(
        repository,
        cart,
        config.persist_debounce(),
        config.session_idle_timeout(),
    ))
}
