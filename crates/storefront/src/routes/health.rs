//! Liveness and readiness handlers.

use axum::{extract::State, http::StatusCode};

use crate::state::AppState;

/// `GET /health` - process is up.
pub async fn live() -> &'static str {
    "OK"
}

/// `GET /health/ready` - process is up and the backend answers.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, &'static str) {
    if state.backend().ping().await {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "backend unreachable")
    }
}
