//! End-to-end tests for the cart and the simulated checkout.

use serde_json::{Value, json};

use snorty_integration_tests::{MockBackend, StorefrontApp};

fn available_row(id: &str, price: &str) -> Value {
    json!([{
        "id": id,
        "title": "Corduroy jacket",
        "description": "Barely worn",
        "price": price,
        "condition": "like_new",
        "product_images": [
            { "image_url": format!("https://img.test/{id}.jpg"), "display_order": 0 }
        ],
        "category": { "id": "c2", "name": "Jackets", "slug": "jackets" },
        "seller": { "id": "s7", "username": "theo", "full_name": "Theo M" },
        "is_available": true,
        "is_featured": false,
        "created_at": "2026-02-01T08:30:00Z"
    }])
}

#[tokio::test]
async fn test_add_update_remove_round_trip() {
    let backend = MockBackend::spawn().await;
    let app = StorefrontApp::spawn(&backend.url).await;
    let client = reqwest::Client::new();

    backend.push_response(200, None, available_row("p1", "25.00"));
    let cart: Value = client
        .post(format!("{}/api/cart/items", app.url))
        .json(&json!({ "product_id": "p1", "quantity": 2 }))
        .send()
        .await
        .expect("add request")
        .json()
        .await
        .expect("cart body");
    assert_eq!(cart["item_count"], 2);
    assert_eq!(cart["subtotal"], "50.00");

    // Adding the same product again merges into the existing line.
    backend.push_response(200, None, available_row("p1", "25.00"));
    let cart: Value = client
        .post(format!("{}/api/cart/items", app.url))
        .json(&json!({ "product_id": "p1" }))
        .send()
        .await
        .expect("second add")
        .json()
        .await
        .expect("cart body");
    assert_eq!(cart["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(cart["item_count"], 3);

    let cart: Value = client
        .put(format!("{}/api/cart/items/p1", app.url))
        .json(&json!({ "quantity": 1 }))
        .send()
        .await
        .expect("update request")
        .json()
        .await
        .expect("cart body");
    assert_eq!(cart["item_count"], 1);
    assert_eq!(cart["subtotal"], "25.00");

    // Zero quantity removes the line.
    let cart: Value = client
        .put(format!("{}/api/cart/items/p1", app.url))
        .json(&json!({ "quantity": 0 }))
        .send()
        .await
        .expect("zeroing request")
        .json()
        .await
        .expect("cart body");
    assert_eq!(cart["items"].as_array().map(Vec::len), Some(0));
    assert_eq!(cart["subtotal"], "0");
}

#[tokio::test]
async fn test_sold_items_cannot_be_added() {
    let backend = MockBackend::spawn().await;
    let app = StorefrontApp::spawn(&backend.url).await;

    backend.push_response(
        200,
        None,
        json!([{ "id": "p2", "title": "Sold lamp", "price": "9.99", "is_available": false }]),
    );
    let response = reqwest::Client::new()
        .post(format!("{}/api/cart/items", app.url))
        .json(&json!({ "product_id": "p2" }))
        .send()
        .await
        .expect("add request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_checkout_requires_a_non_empty_cart() {
    let backend = MockBackend::spawn().await;
    let app = StorefrontApp::spawn(&backend.url).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/checkout", app.url))
        .send()
        .await
        .expect("checkout request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_checkout_settles_and_empties_the_cart() {
    let backend = MockBackend::spawn().await;
    let app = StorefrontApp::spawn(&backend.url).await;
    let client = reqwest::Client::new();

    backend.push_response(200, None, available_row("p1", "25.00"));
    client
        .post(format!("{}/api/cart/items", app.url))
        .json(&json!({ "product_id": "p1", "quantity": 2 }))
        .send()
        .await
        .expect("add request");

    let confirmation: Value = client
        .post(format!("{}/api/checkout", app.url))
        .send()
        .await
        .expect("checkout request")
        .json()
        .await
        .expect("confirmation body");
    assert_eq!(confirmation["status"], "paid");
    assert_eq!(confirmation["total"], "50.00");
    assert!(!confirmation["order_id"].as_str().unwrap_or_default().is_empty());

    let cart: Value = client
        .get(format!("{}/api/cart", app.url))
        .send()
        .await
        .expect("cart request")
        .json()
        .await
        .expect("cart body");
    assert_eq!(cart["items"].as_array().map(Vec::len), Some(0));
}
