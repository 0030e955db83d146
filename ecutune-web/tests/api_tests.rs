//! Integration tests for the public ecutune-web endpoints
//!
//! Tests cover:
//! - Health and build info
//! - Per-level vehicle lookups, including gating errors
//! - Selector view and choice endpoint (reset-on-change)
//! - Lead submission and validation
//! - Request body size limit

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use ecutune_common::db::init_memory_database;
use ecutune_common::vehicles::{import_catalog, Vehicle};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::util::ServiceExt; // for `oneshot` method
use ecutune_web::{build_router, AppState, MAX_BODY_BYTES};

/// Test helper: in-memory database with a small catalog
async fn setup_test_db() -> SqlitePool {
    let pool = init_memory_database()
        .await
        .expect("Should open in-memory database");

    let vehicles = [
        ("Diesel", "Audi", "A4", "2.0 TDI 150"),
        ("Diesel", "Audi", "A4", "2.0 TDI 190"),
        ("Diesel", "Audi", "A3", "1.6 TDI 110"),
        ("Diesel", "BMW", "320d", "2.0d 190"),
        ("Petrol", "Audi", "A3", "1.4 TFSI 150"),
        ("Petrol", "Volkswagen", "Golf", "1.4 TSI 125"),
    ]
    .iter()
    .map(|(f, b, m, v)| Vehicle::new(f, b, m, v).unwrap())
    .collect::<Vec<_>>();

    import_catalog(&pool, &vehicles)
        .await
        .expect("Should seed catalog");
    pool
}

/// Test helper: app without admin token
async fn setup_app() -> axum::Router {
    build_router(AppState::new(setup_test_db().await, None))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

fn lead_body() -> Value {
    json!({
        "name": "Ana Soler",
        "email": "ana@example.com",
        "phone": "+34 611 222 333",
        "message": "Interested in stage 1",
        "vehicle": {
            "fuel": "Diesel",
            "brand": "Audi",
            "model": "A4",
            "version": "2.0 TDI 190"
        },
        "consent": true
    })
}

// =============================================================================
// Health / build info
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app().await;

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "ecutune-web");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_buildinfo_endpoint() {
    let app = setup_app().await;

    let response = app.oneshot(get("/api/buildinfo")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert!(body["git_hash"].is_string());
    assert!(body["build_profile"].is_string());
}

// =============================================================================
// Vehicle lookups
// =============================================================================

#[tokio::test]
async fn test_fuels() {
    let app = setup_app().await;

    let response = app.oneshot(get("/api/vehicles/fuels")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["level"], "fuel");
    assert_eq!(body["options"], json!(["Diesel", "Petrol"]));
}

#[tokio::test]
async fn test_brands_filtered_by_fuel() {
    let app = setup_app().await;

    let response = app
        .oneshot(get("/api/vehicles/brands?fuel=Petrol"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["options"], json!(["Audi", "Volkswagen"]));
}

#[tokio::test]
async fn test_versions_need_every_ancestor() {
    let app = setup_app().await;

    let response = app
        .clone()
        .oneshot(get("/api/vehicles/versions?fuel=Diesel&model=A4"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("brand is required"));

    let response = app
        .oneshot(get("/api/vehicles/versions?fuel=Diesel&brand=Audi&model=A4"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["options"], json!(["2.0 TDI 150", "2.0 TDI 190"]));
}

#[tokio::test]
async fn test_brands_with_empty_fuel_is_rejected() {
    let app = setup_app().await;

    let response = app.oneshot(get("/api/vehicles/brands?fuel=")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Selector
// =============================================================================

#[tokio::test]
async fn test_selector_view_from_query() {
    let app = setup_app().await;

    let response = app
        .oneshot(get("/api/selector?fuel=Diesel&brand=Audi"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["selection"]["fuel"], "Diesel");
    assert_eq!(body["selection"]["brand"], "Audi");
    assert_eq!(body["selection"]["loaded"], true);
    assert_eq!(body["models"], json!(["A3", "A4"]));
    assert_eq!(body["versions"], json!([]));
    assert_eq!(body["next_level"], "model");
    assert_eq!(body["complete"], false);
}

#[tokio::test]
async fn test_selector_drops_levels_after_gap() {
    let app = setup_app().await;

    let response = app
        .oneshot(get("/api/selector?fuel=Diesel&model=A4"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["selection"]["model"], Value::Null);
    assert_eq!(body["brands"], json!(["Audi", "BMW"]));
    assert_eq!(body["models"], json!([]));
}

#[tokio::test]
async fn test_choice_resets_descendants() {
    let app = setup_app().await;

    let request = json!({
        "selection": {
            "fuel": "Diesel",
            "brand": "Audi",
            "model": "A4",
            "version": "2.0 TDI 150"
        },
        "level": "brand",
        "value": "BMW"
    });

    let response = app
        .oneshot(post_json("/api/selector/choice", &request))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["selection"]["brand"], "BMW");
    assert_eq!(body["selection"]["model"], Value::Null);
    assert_eq!(body["selection"]["version"], Value::Null);
    assert_eq!(body["models"], json!(["320d"]));
}

#[tokio::test]
async fn test_choice_unknown_option() {
    let app = setup_app().await;

    let request = json!({
        "selection": { "fuel": "Diesel" },
        "level": "brand",
        "value": "Volkswagen"
    });

    let response = app
        .oneshot(post_json("/api/selector/choice", &request))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("unknown brand"));
}

#[tokio::test]
async fn test_choice_before_ancestor() {
    let app = setup_app().await;

    let request = json!({ "level": "version", "value": "2.0 TDI 150" });

    let response = app
        .oneshot(post_json("/api/selector/choice", &request))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Leads
// =============================================================================

#[tokio::test]
async fn test_submit_lead() {
    let app = setup_app().await;

    let response = app
        .oneshot(post_json("/api/leads", &lead_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = extract_json(response.into_body()).await;
    assert!(uuid::Uuid::parse_str(body["guid"].as_str().unwrap()).is_ok());
    assert_eq!(body["status"], "new");
}

#[tokio::test]
async fn test_submit_lead_invalid_email() {
    let app = setup_app().await;

    let mut lead = lead_body();
    lead["email"] = json!("not-an-email");

    let response = app.oneshot(post_json("/api/leads", &lead)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert!(body["error"]["message"].as_str().unwrap().contains("email"));
}

#[tokio::test]
async fn test_submit_lead_unknown_vehicle() {
    let app = setup_app().await;

    let mut lead = lead_body();
    lead["vehicle"]["fuel"] = json!("Petrol");

    let response = app.oneshot(post_json("/api/leads", &lead)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_submit_lead_without_consent() {
    let app = setup_app().await;

    let mut lead = lead_body();
    lead["consent"] = json!(false);

    let response = app.oneshot(post_json("/api/leads", &lead)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let app = setup_app().await;

    let mut lead = lead_body();
    lead["message"] = json!("x".repeat(MAX_BODY_BYTES + 1024));

    let response = app.oneshot(post_json("/api/leads", &lead)).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "PAYLOAD_TOO_LARGE");
}

// =============================================================================
// Malformed input gets the JSON error body
// =============================================================================

#[tokio::test]
async fn test_choice_with_unknown_level() {
    let app = setup_app().await;

    let response = app
        .oneshot(post_json("/api/selector/choice", &json!({ "level": "engine" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert!(body["error"]["message"].as_str().unwrap().contains("engine"));
}

#[tokio::test]
async fn test_lead_missing_email_field() {
    let app = setup_app().await;

    let mut lead = lead_body();
    lead.as_object_mut().unwrap().remove("email");

    let response = app.oneshot(post_json("/api/leads", &lead)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert!(body["error"]["message"].as_str().unwrap().contains("email"));
}

#[tokio::test]
async fn test_lead_body_not_json() {
    let app = setup_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/leads")
        .header("Content-Type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_selector_with_invalid_loaded_flag() {
    let app = setup_app().await;

    let response = app
        .oneshot(get("/api/selector?fuel=Diesel&loaded=maybe"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}
