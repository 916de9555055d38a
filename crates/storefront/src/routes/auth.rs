//! Authentication handlers.
//!
//! Thin translation layer over the hosted auth service: request bodies in,
//! sessions out, with the bearer token pulled from the `Authorization`
//! header for the session-scoped endpoints.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
};
use serde::Deserialize;

use snorty_core::Email;

use crate::error::{AppError, Result};
use crate::services::auth::{AuthError, AuthSession, AuthUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `POST /api/auth/register` - create an account and return its session.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthSession>)> {
    let email = Email::parse(&request.email).map_err(AuthError::from)?;
    let display_name = request.display_name.as_deref().unwrap_or_default();

    let session = state
        .auth()
        .sign_up(&email, &request.password, display_name)
        .await?;

    Ok((StatusCode::CREATED, Json(session)))
}

/// `POST /api/auth/login` - exchange credentials for a session.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthSession>> {
    let email = Email::parse(&request.email).map_err(AuthError::from)?;
    let session = state.auth().sign_in(&email, &request.password).await?;
    Ok(Json(session))
}

/// `POST /api/auth/logout` - revoke the bearer session.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<StatusCode> {
    let token = bearer_token(&headers)?;
    state.auth().sign_out(token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/auth/me` - the user behind the bearer session.
pub async fn me(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<AuthUser>> {
    let token = bearer_token(&headers)?;
    let user = state.auth().current_user(token).await?;
    Ok(Json(user))
}

/// Extract the bearer token from the `Authorization` header.
fn bearer_token(headers: &HeaderMap) -> Result<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers).expect("token"), "abc.def");
    }

    #[test]
    fn test_missing_or_malformed_header_is_unauthorized() {
        assert!(bearer_token(&HeaderMap::new()).is_err());

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert!(bearer_token(&headers).is_err());

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(bearer_token(&headers).is_err());
    }
}
