//! Health, stats, docs, and landing page integration tests.
//!
//! Run with: `cargo test -p voxrelay-api --test system_test`

mod helpers;

use helpers::setup_test_app;

#[tokio::test]
async fn test_health_reports_alive() {
    let app = setup_test_app().await;

    let response = app.server.get("/health").await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], serde_json::json!("alive"));
    assert!(body["uptime_secs"].as_f64().is_some());
}

#[tokio::test]
async fn test_stats_returns_resource_snapshot() {
    let app = setup_test_app().await;

    let response = app.server.get("/api/v0/stats").await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert!(body["cpu_percent"].as_f64().is_some());
    assert!(body["memory_percent"].as_f64().is_some());
    assert!(body["memory_used_mb"].as_f64().is_some());
    assert!(body["disk_percent"].as_f64().is_some());
    assert_eq!(body["processing_count"], serde_json::json!(0));
}

#[tokio::test]
async fn test_openapi_spec_is_served() {
    let app = setup_test_app().await;

    let response = app.server.get("/api/openapi.json").await;

    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["info"]["title"], serde_json::json!("Voxrelay API"));
    assert!(body["paths"]["/api/v0/transcriptions"].is_object());
    assert!(body["paths"]["/api/v0/stats"].is_object());
}

#[tokio::test]
async fn test_landing_page_serves_upload_form() {
    let app = setup_test_app().await;

    let response = app.server.get("/").await;

    assert_eq!(response.status_code(), 200);
    let html = response.text();
    assert!(html.contains("multipart/form-data"));
    assert!(html.contains("/api/v0/transcriptions"));
}
