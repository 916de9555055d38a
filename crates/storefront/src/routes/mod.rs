//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (pings the backend)
//!
//! # Products
//! GET  /api/products           - Filtered, sorted, paginated listing
//! GET  /api/products/{id}      - Product detail
//! GET  /api/categories         - Category list
//!
//! # Cart
//! GET    /api/cart             - Cart contents with totals
//! POST   /api/cart/items       - Add a product to the cart
//! PUT    /api/cart/items/{id}  - Change a line quantity (<= 0 removes)
//! DELETE /api/cart/items/{id}  - Remove a line
//! DELETE /api/cart             - Empty the cart
//!
//! # Checkout
//! POST /api/checkout           - Simulated payment, then order confirmation
//!
//! # Auth
//! POST /api/auth/register      - Create an account
//! POST /api/auth/login         - Exchange credentials for a session
//! POST /api/auth/logout        - Revoke the bearer session
//! GET  /api/auth/me            - Current user for the bearer session
//!
//! # Returns
//! POST /api/returns            - File a return request with photo evidence
//!
//! # Location
//! GET  /api/location           - Saved location, if any
//! PUT  /api/location           - Save coordinates, reverse-geocoding a label
//! ```

pub mod auth;
pub mod cart;
pub mod categories;
pub mod checkout;
pub mod health;
pub mod location;
pub mod products;
pub mod returns;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add))
        .route("/items/{id}", put(cart::update).delete(cart::remove))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the `/api` router with every API route group mounted.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/products", product_routes())
        .route("/categories", get(categories::index))
        .nest("/cart", cart_routes())
        .route("/checkout", post(checkout::create_order))
        .nest("/auth", auth_routes())
        .route("/returns", post(returns::create))
        .route("/location", get(location::show).put(location::save))
}

/// Create the health-check router.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::live))
        .route("/health/ready", get(health::ready))
}
