//! Authentication error types.
//!
//! The hosted auth service reports failures as loosely structured message
//! strings. [`map_auth_failure`] is the single place those strings are
//! pattern-matched into typed errors, so user-facing messages stay specific
//! (wrong password vs. unconfirmed email vs. rate limit) without the rest of
//! the code ever seeing raw backend text.

use thiserror::Error;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format (caught before any network call).
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] snorty_core::EmailError),

    /// Invalid credentials (wrong password or unknown user).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Account exists but the email was never confirmed.
    #[error("email not confirmed")]
    EmailNotConfirmed,

    /// An account with this email already exists.
    #[error("user already registered")]
    AlreadyRegistered,

    /// The auth service rate-limited the request.
    #[error("rate limited")]
    RateLimited,

    /// Password rejected before submission.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// HTTP transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Any other failure reported by the auth service.
    #[error("auth service error: {status} - {message}")]
    Service { status: u16, message: String },
}

/// Map an auth-service failure (status + message text) to a typed error.
///
/// Matching is case-insensitive substring search, because the service's
/// error strings are prose, not codes.
#[must_use]
pub fn map_auth_failure(status: u16, message: &str) -> AuthError {
    let lower = message.to_lowercase();

    if lower.contains("invalid login credentials") {
        return AuthError::InvalidCredentials;
    }
    if lower.contains("email not confirmed") {
        return AuthError::EmailNotConfirmed;
    }
    if lower.contains("already registered") || lower.contains("already exists") {
        return AuthError::AlreadyRegistered;
    }
    if status == 429 || lower.contains("rate limit") || lower.contains("too many requests") {
        return AuthError::RateLimited;
    }
    if lower.contains("password") && lower.contains("at least") {
        return AuthError::WeakPassword(message.to_owned());
    }

    AuthError::Service {
        status,
        message: message.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_credentials_mapping() {
        assert!(matches!(
            map_auth_failure(400, "Invalid login credentials"),
            AuthError::InvalidCredentials
        ));
    }

    #[test]
    fn test_unconfirmed_email_mapping() {
        assert!(matches!(
            map_auth_failure(400, "Email not confirmed"),
            AuthError::EmailNotConfirmed
        ));
    }

    #[test]
    fn test_already_registered_mapping() {
        assert!(matches!(
            map_auth_failure(422, "User already registered"),
            AuthError::AlreadyRegistered
        ));
    }

    #[test]
    fn test_rate_limit_mapping() {
        assert!(matches!(
            map_auth_failure(429, "whatever"),
            AuthError::RateLimited
        ));
        assert!(matches!(
            map_auth_failure(400, "Email rate limit exceeded"),
            AuthError::RateLimited
        ));
    }

    #[test]
    fn test_weak_password_mapping() {
        assert!(matches!(
            map_auth_failure(422, "Password should be at least 6 characters"),
            AuthError::WeakPassword(_)
        ));
    }

    #[test]
    fn test_unrecognized_falls_through() {
        assert!(matches!(
            map_auth_failure(500, "database on fire"),
            AuthError::Service { status: 500, .. }
        ));
    }
}
