//! Saved-location handlers.
//!
//! Coordinates come from the client (browser geolocation or a map pick);
//! the label is reverse-geocoded best-effort when the client does not
//! provide one.

use axum::{Json, extract::State};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::services::SavedLocation;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SaveLocationRequest {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub label: Option<String>,
}

/// `GET /api/location` - the saved location, if any.
pub async fn show(State(state): State<AppState>) -> Json<Option<SavedLocation>> {
    Json(state.location().get())
}

/// `PUT /api/location` - save coordinates, labelling them if needed.
pub async fn save(
    State(state): State<AppState>,
    Json(request): Json<SaveLocationRequest>,
) -> Result<Json<SavedLocation>> {
    if !(-90.0..=90.0).contains(&request.latitude)
        || !(-180.0..=180.0).contains(&request.longitude)
    {
        return Err(AppError::BadRequest(
            "latitude/longitude out of range".to_owned(),
        ));
    }

    let label = match request.label.map(|label| label.trim().to_owned()) {
        Some(label) if !label.is_empty() => label,
        _ => {
            state
                .geocoder()
                .reverse(request.latitude, request.longitude)
                .await
        }
    };

    let location = SavedLocation {
        label,
        latitude: request.latitude,
        longitude: request.longitude,
    };
    state
        .location()
        .set(location.clone())
        .map_err(|error| AppError::Internal(format!("persisting location: {error}")))?;

    Ok(Json(location))
}
