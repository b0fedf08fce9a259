//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};

use api::config::Config;
use api::state::AppState;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> axum::Router {
    let (app, _) = setup_with_state();
    app
}

fn setup_with_state() -> (axum::Router, Arc<AppState>) {
    let state = api::create_default_state(&Config::default());
    let app = api::create_app(state.clone(), get_metrics_handle());
    (app, state)
}

async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

async fn create_session(app: &axum::Router) -> String {
    let (status, json) = send(app, "POST", "/configurations", None).await;
    assert_eq!(status, StatusCode::CREATED);
    json["sessionId"].as_str().unwrap().to_string()
}

async fn act(app: &axum::Router, id: &str, action: Value) -> (StatusCode, Value) {
    send(app, "POST", &format!("/configurations/{id}/actions"), Some(action)).await
}

async fn make_ready(app: &axum::Router, id: &str) {
    for action in [
        json!({"type": "setHand", "hand": "Right"}),
        json!({"type": "setGrip", "grip": {"brand": "Golf Pride", "model": "Tour Velvet", "size": "Standard"}}),
    ] {
        let (status, _) = act(app, id, action).await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[tokio::test]
async fn test_health_check() {
    let app = setup();

    let (status, json) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup();
    let _ = create_session(&app).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("text/plain"));
}

#[tokio::test]
async fn test_create_configuration() {
    let app = setup();

    let (status, json) = send(&app, "POST", "/configurations", None).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["currentStep"], "club");
    assert_eq!(json["configuration"]["clubs"], json!(["6", "7", "8", "9", "PW"]));
    assert_eq!(json["derived"]["maxUnlockedStep"], "club");
    assert_eq!(json["derived"]["canCheckout"], false);
    assert_eq!(json["derived"]["setSize"], "6-PW");
    assert_eq!(json["submitting"], false);
}

#[tokio::test]
async fn test_get_configuration() {
    let app = setup();
    let id = create_session(&app).await;

    let (status, json) = send(&app, "GET", &format!("/configurations/{id}"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["sessionId"], id.as_str());
}

#[tokio::test]
async fn test_get_unknown_configuration_is_404() {
    let app = setup();

    let (status, json) = send(
        &app,
        "GET",
        "/configurations/00000000-0000-4000-8000-000000000000",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn test_invalid_session_id_is_400() {
    let app = setup();

    let (status, _) = send(&app, "GET", "/configurations/not-a-uuid", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_configuration_ends_session() {
    let (app, state) = setup_with_state();
    let id = create_session(&app).await;
    assert_eq!(state.session_count().await, 1);

    let (status, _) = send(&app, "DELETE", &format!("/configurations/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(state.session_count().await, 0);

    let (status, _) = send(&app, "GET", &format!("/configurations/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "DELETE", &format!("/configurations/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_action_updates_snapshot() {
    let app = setup();
    let id = create_session(&app).await;

    let (status, json) = act(&app, &id, json!({"type": "toggleClub", "club": "4"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["configuration"]["clubs"], json!(["4", "5", "6", "7", "8", "9", "PW"]));
    assert_eq!(json["derived"]["setSize"], "4-PW");
    assert_eq!(json["revision"], 1);
}

#[tokio::test]
async fn test_rule_violation_is_422_and_recorded() {
    let app = setup();
    let id = create_session(&app).await;

    let (status, json) = act(&app, &id, json!({"type": "toggleClub", "club": "7"})).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error"], "Club 7 is required and cannot be removed");

    let (_, snapshot) = send(&app, "GET", &format!("/configurations/{id}"), None).await;
    assert_eq!(snapshot["error"], "Club 7 is required and cannot be removed");
    assert_eq!(snapshot["revision"], 0);
}

#[tokio::test]
async fn test_locked_step_is_422() {
    let app = setup();
    let id = create_session(&app).await;

    let (status, _) = act(&app, &id, json!({"type": "goToStep", "step": "review"})).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_incomplete_checkout_is_422() {
    let app = setup();
    let id = create_session(&app).await;

    let (status, json) = send(
        &app,
        "POST",
        &format!("/configurations/{id}/checkout"),
        Some(json!({"mainVariantId": "iron-set"})),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json["error"].as_str().unwrap().contains("hand"));
}

#[tokio::test]
async fn test_cart_failure_is_502() {
    let (app, state) = setup_with_state();
    let id = create_session(&app).await;
    make_ready(&app, &id).await;
    state.cart().set_fail_with(Some("maintenance".to_string()));

    let (status, _) = send(
        &app,
        "POST",
        &format!("/configurations/{id}/checkout"),
        Some(json!({"mainVariantId": "iron-set"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let (_, snapshot) = send(&app, "GET", &format!("/configurations/{id}"), None).await;
    assert_eq!(snapshot["submitting"], false);
}

#[tokio::test]
async fn test_checkout_then_transform_cart() {
    let (app, state) = setup_with_state();
    state
        .cart()
        .set_price("iron-set", common::Money::from_cents(88500));
    state
        .cart()
        .set_price("kbs-shaft", common::Money::from_cents(15400));

    let id = create_session(&app).await;
    make_ready(&app, &id).await;
    for action in [
        json!({"type": "setShaftBrand", "brand": "KBS"}),
        json!({"type": "setShaftFlex", "flex": "Regular"}),
    ] {
        let (status, _) = act(&app, &id, action).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, receipt) = send(
        &app,
        "POST",
        &format!("/configurations/{id}/checkout"),
        Some(json!({"mainVariantId": "iron-set", "shaftVariantId": "kbs-shaft"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(receipt["bundleId"].as_str().unwrap().starts_with("golf-"));

    let (status, cart) = send(&app, "GET", "/cart", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart.as_array().unwrap().len(), 2);
    assert_eq!(cart[1]["quantity"], 5);

    let (status, output) = send(&app, "POST", "/cart/transform", Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    let operations = output["operations"].as_array().unwrap();
    assert_eq!(operations.len(), 1);
    let merge = &operations[0]["merge"];
    assert_eq!(merge["parentVariantId"], "iron-set");
    assert_eq!(merge["price"]["amount"], 165_500);
    assert_eq!(merge["title"], "Custom Iron Set (6-PW) with KBS Regular Shafts");
}

#[tokio::test]
async fn test_transform_with_explicit_lines() {
    let app = setup();

    let (status, json) = send(
        &app,
        "POST",
        "/cart/transform",
        Some(json!({
            "lines": [{
                "id": "a",
                "quantity": 1,
                "unitPrice": 100,
                "properties": {"bundleId": "golf-1", "componentType": "main", "hand": "Left", "setSize": "5-PW"}
            }]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json["error"].as_str().unwrap().contains("parentVariantId"));
}

#[tokio::test]
async fn test_transform_of_empty_line_set() {
    let app = setup();

    let (status, json) = send(&app, "POST", "/cart/transform", Some(json!({"lines": []}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["operations"], json!([]));
}
