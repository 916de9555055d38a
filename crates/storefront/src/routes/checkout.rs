//! Checkout handler.
//!
//! There is no payment provider behind this marketplace; checkout holds the
//! request for a fixed processing delay, then confirms the order and empties
//! the cart. The cart is persisted synchronously before the confirmation is
//! returned, so a crash after checkout cannot resurrect purchased items.

use std::time::Duration;

use axum::{Json, extract::State};
use serde::Serialize;
use uuid::Uuid;

use snorty_core::Price;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Simulated payment-processing time.
const PAYMENT_PROCESSING_DELAY: Duration = Duration::from_millis(1500);

/// Confirmation returned once the simulated payment settles.
#[derive(Debug, Serialize)]
pub struct OrderConfirmation {
    pub order_id: String,
    pub total: Price,
    pub status: &'static str,
}

/// `POST /api/checkout` - settle the cart into an order.
pub async fn create_order(State(state): State<AppState>) -> Result<Json<OrderConfirmation>> {
    let cart = state.cart();
    if cart.items().is_empty() {
        return Err(AppError::BadRequest("Your cart is empty".to_owned()));
    }
    let total = cart.subtotal();

    tokio::time::sleep(PAYMENT_PROCESSING_DELAY).await;

    cart.clear();
    cart.save()
        .map_err(|error| AppError::Internal(format!("persisting emptied cart: {error}")))?;

    Ok(Json(OrderConfirmation {
        order_id: Uuid::new_v4().to_string(),
        total,
        status: "paid",
    }))
}
