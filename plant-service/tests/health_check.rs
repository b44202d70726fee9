mod common;

use common::TestApp;
use plant_service::services::init_metrics;
use reqwest::Client;
use std::sync::Once;

// Initialize metrics once for all tests
static INIT_METRICS: Once = Once::new();

fn ensure_metrics_initialized() {
    INIT_METRICS.call_once(|| {
        init_metrics();
    });
}

#[tokio::test]
async fn health_check_works() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let response = client
        .get(&format!("{}/health", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "plant-service");

    app.cleanup().await;
}

#[tokio::test]
async fn readiness_check_works() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let response = client
        .get(&format!("{}/ready", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());

    app.cleanup().await;
}

#[tokio::test]
async fn root_returns_greeting() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let response = client
        .get(&format!("{}/", app.api_address))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["message"], "Plant Disease Advisory API");

    app.cleanup().await;
}

#[tokio::test]
async fn metrics_endpoint_returns_prometheus_format() {
    ensure_metrics_initialized();
    let app = TestApp::spawn().await;
    let client = Client::new();

    let response = client
        .get(&format!("{}/metrics", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());

    let content_type = response
        .headers()
        .get("content-type")
        .expect("Missing content-type header")
        .to_str()
        .expect("Invalid content-type");

    assert!(content_type.starts_with("text/plain"));

    let body = response.text().await.expect("Failed to get response body");
    // The body might be empty if no metrics were recorded yet, which is valid
    assert!(
        body.is_empty() || body.contains('#') || body.contains('_'),
        "Unexpected metrics format: {}",
        body
    );

    app.cleanup().await;
}
