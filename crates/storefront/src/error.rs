//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers return `Result<T, AppError>`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::backend::BackendError;
use crate::services::auth::AuthError;

/// Application-level error type for the storefront API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Hosted backend operation failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Backend(err) => match err {
                BackendError::NotFound(_) => StatusCode::NOT_FOUND,
                BackendError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials | AuthError::EmailNotConfirmed => {
                    StatusCode::UNAUTHORIZED
                }
                AuthError::AlreadyRegistered => StatusCode::CONFLICT,
                AuthError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
                AuthError::WeakPassword(_) | AuthError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to clients; internals stay in the logs.
    fn client_message(&self) -> String {
        match self {
            Self::Backend(err) => match err {
                BackendError::NotFound(_) => "Not found".to_owned(),
                BackendError::RateLimited(_) => "Too many requests, slow down".to_owned(),
                _ => "Upstream service error".to_owned(),
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid email or password".to_owned(),
                AuthError::EmailNotConfirmed => {
                    "Please confirm your email before signing in".to_owned()
                }
                AuthError::AlreadyRegistered => {
                    "An account with this email already exists".to_owned()
                }
                AuthError::RateLimited => "Too many attempts, try again later".to_owned(),
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::InvalidEmail(_) => "Invalid email address".to_owned(),
                _ => "Authentication error".to_owned(),
            },
            Self::Internal(_) => "Internal server error".to_owned(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.status_code().is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status_code();
        let body = Json(json!({ "error": self.client_message() }));
        (status, body).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_status_codes() {
        let err = AppError::Backend(BackendError::NotFound("product p1".to_owned()));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err = AppError::Backend(BackendError::RateLimited(30));
        assert_eq!(err.status_code(), StatusCode::TOO_MANY_REQUESTS);

        let err = AppError::Backend(BackendError::Api {
            status: 500,
            message: "boom".to_owned(),
        });
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_auth_status_codes() {
        assert_eq!(
            AppError::Auth(AuthError::InvalidCredentials).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Auth(AuthError::AlreadyRegistered).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Auth(AuthError::RateLimited).status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AppError::Auth(AuthError::WeakPassword(
                "Password must be at least 8 characters".to_owned()
            ))
            .status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_client_messages_hide_internals() {
        let err = AppError::Backend(BackendError::Api {
            status: 503,
            message: "pg: connection refused at 10.0.0.3".to_owned(),
        });
        assert_eq!(err.client_message(), "Upstream service error");

        let err = AppError::Internal("poisoned lock".to_owned());
        assert_eq!(err.client_message(), "Internal server error");
    }

    #[test]
    fn test_client_errors_pass_message_through() {
        let err = AppError::BadRequest("page_size must be between 1 and 48".to_owned());
        assert_eq!(
            err.client_message(),
            "Bad request: page_size must be between 1 and 48"
        );
    }
}
