//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cart_transform::TransformError;
use configurator::ConfigurationError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Configuration session or checkout error.
    Configuration(ConfigurationError),
    /// Cart transform error.
    Transform(TransformError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Configuration(err) => configuration_error_to_response(err),
            ApiError::Transform(err) => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn configuration_error_to_response(err: ConfigurationError) -> (StatusCode, String) {
    let status = match &err {
        ConfigurationError::Rule(_) | ConfigurationError::Incomplete { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ConfigurationError::ShaftVariantRequired => StatusCode::BAD_REQUEST,
        ConfigurationError::SubmissionInFlight => StatusCode::CONFLICT,
        ConfigurationError::Checkout(e) => {
            tracing::warn!(error = %e, "cart call failed");
            StatusCode::BAD_GATEWAY
        }
    };
    (status, err.to_string())
}

impl From<ConfigurationError> for ApiError {
    fn from(err: ConfigurationError) -> Self {
        ApiError::Configuration(err)
    }
}

impl From<TransformError> for ApiError {
    fn from(err: TransformError) -> Self {
        ApiError::Transform(err)
    }
}
