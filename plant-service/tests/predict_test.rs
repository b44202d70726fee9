mod common;

use chrono::{DateTime, Duration, Utc};
use common::TestApp;
use plant_service::models::DiseasePrediction;
use reqwest::Client;
use serde_json::json;

// "hello" -- any decodable payload works for the mock provider
const TEST_IMAGE: &str = "aGVsbG8=";

const DIAGNOSIS_REPLY: &str = r#"{
    "disease_name": "Bacterial Leaf Blight",
    "confidence": 92,
    "description": "Water-soaked lesions along leaf margins",
    "treatments": ["Apply copper-based bactericide", "Drain the field", "Remove infected leaves"],
    "prevention_tips": ["Use certified seed", "Avoid excess nitrogen", "Rotate crops"]
}"#;

#[tokio::test]
async fn prediction_response_contains_required_fields() {
    let reply = format!("```json\n{}\n```", DIAGNOSIS_REPLY);
    let app = TestApp::spawn_with_replies(vec![reply]).await;
    let client = Client::new();

    let response = client
        .post(&format!("{}/predict", app.api_address))
        .json(&json!({ "image_base64": TEST_IMAGE }))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["disease_name"], "Bacterial Leaf Blight");
    assert_eq!(body["confidence"], 92.0);
    assert_eq!(body["description"], "Water-soaked lesions along leaf margins");
    assert_eq!(body["treatments"].as_array().unwrap().len(), 3);
    assert_eq!(body["prevention_tips"].as_array().unwrap().len(), 3);
    assert!(body["id"].as_str().is_some());
    assert!(body["timestamp"].as_str().is_some());
    // The image payload is never echoed back
    assert!(body.get("image_base64").is_none());

    app.cleanup().await;
}

#[tokio::test]
async fn stored_prediction_has_no_image() {
    let app = TestApp::spawn_with_replies(vec![DIAGNOSIS_REPLY.to_string()]).await;
    let client = Client::new();

    let response = client
        .post(&format!("{}/predict", app.api_address))
        .json(&json!({ "image_base64": TEST_IMAGE }))
        .send()
        .await
        .expect("Failed to execute request");
    assert!(response.status().is_success());

    // Inspect the raw document: the image payload must not be persisted
    let raw: mongodb::Collection<mongodb::bson::Document> = app
        .db
        .client()
        .database(&app.db_name)
        .collection("predictions");
    let stored = raw
        .find_one(None, None)
        .await
        .expect("Failed to read predictions")
        .expect("No prediction stored");
    assert!(stored.get("image_base64").is_none());
    assert_eq!(
        stored.get_str("disease_name").unwrap(),
        "Bacterial Leaf Blight"
    );

    app.cleanup().await;
}

#[tokio::test]
async fn malformed_model_reply_returns_server_error() {
    let app =
        TestApp::spawn_with_replies(vec!["I am sorry, I cannot identify this leaf.".to_string()])
            .await;
    let client = Client::new();

    let response = client
        .post(&format!("{}/predict", app.api_address))
        .json(&json!({ "image_base64": TEST_IMAGE }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 500);

    // Nothing gets persisted for a failed diagnosis
    let stored = app
        .db
        .recent_predictions(10)
        .await
        .expect("Failed to read predictions");
    assert!(stored.is_empty());

    app.cleanup().await;
}

#[tokio::test]
async fn invalid_base64_is_rejected() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let response = client
        .post(&format!("{}/predict", app.api_address))
        .json(&json!({ "image_base64": "not valid base64!!!" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 400);

    app.cleanup().await;
}

#[tokio::test]
async fn empty_image_is_rejected() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    let response = client
        .post(&format!("{}/predict", app.api_address))
        .json(&json!({ "image_base64": "" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 422);

    app.cleanup().await;
}

#[tokio::test]
async fn prediction_history_is_capped_and_newest_first() {
    let app = TestApp::spawn().await;
    let client = Client::new();

    // Seed 55 predictions with strictly increasing age
    let now = Utc::now();
    for i in 0..55 {
        let mut prediction = DiseasePrediction::new(
            format!("Disease {}", i),
            50.0,
            "seeded".to_string(),
            vec![],
            vec![],
        );
        prediction.timestamp = now - Duration::seconds(i);
        app.db
            .insert_prediction(&prediction)
            .await
            .expect("Failed to seed prediction");
    }

    let response = client
        .get(&format!("{}/predictions", app.api_address))
        .send()
        .await
        .expect("Failed to execute request");
    assert!(response.status().is_success());

    let body: Vec<serde_json::Value> = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body.len(), 50);

    // Newest first
    assert_eq!(body[0]["disease_name"], "Disease 0");
    let timestamps: Vec<DateTime<Utc>> = body
        .iter()
        .map(|p| {
            DateTime::parse_from_rfc3339(p["timestamp"].as_str().unwrap())
                .unwrap()
                .with_timezone(&Utc)
        })
        .collect();
    assert!(timestamps.windows(2).all(|w| w[0] >= w[1]));

    // The 5 oldest seeds fell off the end
    assert!(!body
        .iter()
        .any(|p| p["disease_name"] == "Disease 54" || p["disease_name"] == "Disease 50"));

    app.cleanup().await;
}
