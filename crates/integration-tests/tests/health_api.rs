//! Health endpoints and cross-cutting response headers.

use serde_json::json;

use snorty_integration_tests::{MockBackend, StorefrontApp};

#[tokio::test]
async fn test_liveness_and_readiness() {
    let backend = MockBackend::spawn().await;
    let app = StorefrontApp::spawn(&backend.url).await;

    let live = reqwest::get(format!("{}/health", app.url))
        .await
        .expect("health request");
    assert_eq!(live.status(), 200);

    // The mock answers the trivial categories probe with its default 200.
    let ready = reqwest::get(format!("{}/health/ready", app.url))
        .await
        .expect("ready request");
    assert_eq!(ready.status(), 200);
}

#[tokio::test]
async fn test_readiness_fails_when_backend_is_down() {
    let backend = MockBackend::spawn().await;
    backend.push_response(500, None, json!({ "message": "down" }));
    let app = StorefrontApp::spawn(&backend.url).await;

    let ready = reqwest::get(format!("{}/health/ready", app.url))
        .await
        .expect("ready request");
    assert_eq!(ready.status(), 503);
}

#[tokio::test]
async fn test_every_response_carries_a_request_id() {
    let backend = MockBackend::spawn().await;
    let app = StorefrontApp::spawn(&backend.url).await;

    let response = reqwest::get(format!("{}/health", app.url))
        .await
        .expect("health request");
    let id = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .expect("request id header");
    assert!(!id.is_empty());
}

#[tokio::test]
async fn test_upstream_request_id_is_echoed_but_not_blindly() {
    let backend = MockBackend::spawn().await;
    let app = StorefrontApp::spawn(&backend.url).await;
    let client = reqwest::Client::new();

    // A well-formed proxy id survives the hop.
    let response = client
        .get(format!("{}/health", app.url))
        .header("x-request-id", "edge-7f3a2b")
        .send()
        .await
        .expect("health request");
    assert_eq!(
        response.headers().get("x-request-id").and_then(|v| v.to_str().ok()),
        Some("edge-7f3a2b")
    );

    // An id that could smuggle bytes into logs is replaced with a fresh one.
    let response = client
        .get(format!("{}/health", app.url))
        .header("x-request-id", "abc;echo pwned")
        .send()
        .await
        .expect("health request");
    let id = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .expect("request id header");
    assert_ne!(id, "abc;echo pwned");
}
