//! Category listing handler.

use axum::{Json, extract::State};

use crate::backend::Category;
use crate::error::Result;
use crate::state::AppState;

/// `GET /api/categories` - all categories, name-sorted, cached upstream.
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let categories = state.backend().list_categories().await?;
    Ok(Json(categories))
}
