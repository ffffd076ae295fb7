//! Smoke tests against a running server

use reqwest::Client;
use serde_json::Value;

const BASE_URL: &str = "http://localhost:8080/api/v1";

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_readiness() {
    let client = Client::new();

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_respond_requires_identity() {
    let client = Client::new();

    let response = client
        .post(format!(
            "{}/rearrangements/5f0c7c3e-8d36-4c38-9a57-2f7e0c1a9b11/respond",
            BASE_URL
        ))
        .json(&serde_json::json!({ "decision": "accept" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}
