//! Cart handlers.
//!
//! Every mutation responds with the full cart view so the client never has
//! to merge partial updates. Additions fetch the product from the backend
//! first; the cart stores a denormalized line-item snapshot.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use snorty_core::{Price, ProductId};

use crate::error::{AppError, Result};
use crate::services::CartItem;
use crate::state::AppState;

/// The whole cart plus its derived totals.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub item_count: u32,
    pub subtotal: Price,
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    /// Lines to add; defaults to one.
    #[serde(default)]
    pub quantity: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    /// New absolute quantity; zero or negative removes the line.
    pub quantity: i64,
}

fn view(state: &AppState) -> CartView {
    let cart = state.cart();
    CartView {
        items: cart.items(),
        item_count: cart.item_count(),
        subtotal: cart.subtotal(),
    }
}

/// `GET /api/cart` - current cart contents.
pub async fn show(State(state): State<AppState>) -> Json<CartView> {
    Json(view(&state))
}

/// `POST /api/cart/items` - add a product to the cart.
///
/// Unavailable products are rejected; adding an id already in the cart
/// increments that line instead of duplicating it.
pub async fn add(
    State(state): State<AppState>,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<CartView>> {
    let product = state.backend().get_product(&request.product_id).await?;
    if !product.is_available {
        return Err(AppError::BadRequest(
            "This item has already been sold".to_owned(),
        ));
    }

    let mut item = CartItem::from_product(&product);
    item.quantity = request.quantity.unwrap_or(1).max(1);
    state.cart().add(item);

    Ok(Json(view(&state)))
}

/// `PUT /api/cart/items/{id}` - set a line's quantity.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(request): Json<UpdateItemRequest>,
) -> Json<CartView> {
    state.cart().update_quantity(&id, request.quantity);
    Json(view(&state))
}

/// `DELETE /api/cart/items/{id}` - drop a line.
pub async fn remove(State(state): State<AppState>, Path(id): Path<ProductId>) -> Json<CartView> {
    state.cart().remove(&id);
    Json(view(&state))
}

/// `DELETE /api/cart` - empty the cart.
pub async fn clear(State(state): State<AppState>) -> Json<CartView> {
    state.cart().clear();
    Json(view(&state))
}
