//! End-to-end tests for return filing and the saved location.

use serde_json::{Value, json};

use snorty_integration_tests::{MockBackend, StorefrontApp};

#[tokio::test]
async fn test_return_uploads_evidence_then_files_the_row() {
    let backend = MockBackend::spawn().await;
    // First the storage upload, then the return insert.
    backend.push_response(200, None, json!({ "Key": "return-evidence/x" }));
    backend.push_response(
        201,
        None,
        json!([{
            "id": "r1",
            "order_id": "o77",
            "product_id": "p1",
            "reason": "Tear along the seam",
            "evidence_urls": ["unused-by-assert"]
        }]),
    );
    let app = StorefrontApp::spawn(&backend.url).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/returns", app.url))
        .json(&json!({
            "order_id": "o77",
            "product_id": "p1",
            "reason": "Tear along the seam",
            "evidence": [{
                "filename": "seam tear.jpg",
                "content_type": "image/jpeg",
                "data": "aGVsbG8="
            }]
        }))
        .send()
        .await
        .expect("return request");
    assert_eq!(response.status(), 201);

    let captured = backend.captured();
    let upload = captured
        .iter()
        .find(|request| request.path.starts_with("/storage/v1/object/return-evidence/"))
        .expect("evidence uploaded");
    assert_eq!(upload.method, "POST");
    assert!(
        upload.path.contains("seam%20tear.jpg"),
        "filename is url-encoded: {}",
        upload.path
    );
    let insert = backend
        .last_request_to("/rest/v1/returns")
        .expect("return row inserted");
    assert_eq!(insert.method, "POST");
}

#[tokio::test]
async fn test_invalid_base64_evidence_is_rejected() {
    let backend = MockBackend::spawn().await;
    let app = StorefrontApp::spawn(&backend.url).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/returns", app.url))
        .json(&json!({
            "order_id": "o77",
            "product_id": "p1",
            "reason": "Broken zip",
            "evidence": [{
                "filename": "zip.jpg",
                "content_type": "image/jpeg",
                "data": "not base64!!!"
            }]
        }))
        .send()
        .await
        .expect("return request");

    assert_eq!(response.status(), 400);
    assert_eq!(backend.hits(), 0, "nothing is uploaded for a bad payload");
}

#[tokio::test]
async fn test_failed_return_insert_is_not_retried() {
    let backend = MockBackend::spawn().await;
    backend.push_response(500, None, json!({ "message": "down" }));
    let app = StorefrontApp::spawn(&backend.url).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/returns", app.url))
        .json(&json!({
            "order_id": "o77",
            "product_id": "p1",
            "reason": "Broken zip",
            "evidence": []
        }))
        .send()
        .await
        .expect("return request");

    assert_eq!(response.status(), 502);
    assert_eq!(backend.hits(), 1, "mutations surface their error once");
}

#[tokio::test]
async fn test_location_round_trip_with_explicit_label() {
    let backend = MockBackend::spawn().await;
    let app = StorefrontApp::spawn(&backend.url).await;
    let client = reqwest::Client::new();

    let empty: Value = client
        .get(format!("{}/api/location", app.url))
        .send()
        .await
        .expect("location request")
        .json()
        .await
        .expect("location body");
    assert!(empty.is_null());

    let saved: Value = client
        .put(format!("{}/api/location", app.url))
        .json(&json!({ "latitude": 52.52, "longitude": 13.405, "label": "Berlin" }))
        .send()
        .await
        .expect("save request")
        .json()
        .await
        .expect("saved body");
    assert_eq!(saved["label"], "Berlin");

    let reloaded: Value = client
        .get(format!("{}/api/location", app.url))
        .send()
        .await
        .expect("location request")
        .json()
        .await
        .expect("location body");
    assert_eq!(reloaded["label"], "Berlin");
    assert_eq!(backend.hits(), 0, "an explicit label skips the geocoder");
}

#[tokio::test]
async fn test_out_of_range_coordinates_are_rejected() {
    let backend = MockBackend::spawn().await;
    let app = StorefrontApp::spawn(&backend.url).await;

    let response = reqwest::Client::new()
        .put(format!("{}/api/location", app.url))
        .json(&json!({ "latitude": 123.0, "longitude": 13.405 }))
        .send()
        .await
        .expect("save request");

    assert_eq!(response.status(), 400);
}
