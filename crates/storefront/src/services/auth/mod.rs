//! Session-based authentication, delegated to the hosted auth service.
//!
//! The storefront never stores credentials: sign-up, sign-in and session
//! validation all go straight to the backend's auth endpoints, and the
//! browser client holds the issued tokens. This service only shapes
//! requests, validates inputs before any network call, and maps the
//! service's prose error strings to typed [`AuthError`]s.
//!
//! Auth calls are never auto-retried; a failed sign-in surfaces once and
//! the user decides whether to resubmit.

mod error;

pub use error::{map_auth_failure, AuthError};

use serde::{Deserialize, Serialize};
use serde_json::json;
use snorty_core::{Email, UserId};
use tracing::instrument;

use crate::config::BackendConfig;

/// Minimum password length enforced before submission.
const MIN_PASSWORD_LENGTH: usize = 8;

/// An authenticated user, as reported by the auth service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    pub email: String,
    /// Display name carried in sign-up metadata.
    #[serde(default)]
    pub display_name: Option<String>,
}

/// An issued session: tokens plus the user they belong to.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
    pub user: AuthUser,
}

/// Client for the hosted auth endpoints.
#[derive(Clone)]
pub struct AuthService {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl AuthService {
    /// Create a new auth client for the configured backend.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: format!("{}/auth/v1", config.url.trim_end_matches('/')),
            anon_key: config.api_key().to_owned(),
        }
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// `WeakPassword` before any network call for hopeless passwords;
    /// otherwise the mapped auth-service error.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_up(
        &self,
        email: &Email,
        password: &str,
        display_name: &str,
    ) -> Result<AuthSession, AuthError> {
        validate_password(password)?;

        let body = json!({
            "email": email.as_str(),
            "password": password,
            "data": { "display_name": display_name },
        });

        self.session_request("signup", &body).await
    }

    /// Exchange credentials for a session.
    ///
    /// # Errors
    ///
    /// `InvalidCredentials`, `EmailNotConfirmed`, `RateLimited`, or the
    /// fallthrough service error.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_in(&self, email: &Email, password: &str) -> Result<AuthSession, AuthError> {
        let body = json!({
            "email": email.as_str(),
            "password": password,
        });

        self.session_request("token?grant_type=password", &body).await
    }

    /// Revoke the session behind an access token.
    ///
    /// # Errors
    ///
    /// The mapped auth-service error; an already-dead token is not an error.
    #[instrument(skip(self, access_token))]
    pub async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let response = self
            .client
            .post(format!("{}/logout", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        // 401 here means the token was already invalid; treat as signed out.
        if status.is_success() || status == reqwest::StatusCode::UNAUTHORIZED {
            return Ok(());
        }

        let message = response.text().await.unwrap_or_default();
        Err(map_auth_failure(status.as_u16(), &extract_message(&message)))
    }

    /// The user a bearer token belongs to.
    ///
    /// # Errors
    ///
    /// `InvalidCredentials` for dead tokens; mapped errors otherwise.
    #[instrument(skip(self, access_token))]
    pub async fn current_user(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        let response = self
            .client
            .get(format!("{}/user", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AuthError::InvalidCredentials);
        }
        let body = response.text().await?;
        if !status.is_success() {
            return Err(map_auth_failure(status.as_u16(), &extract_message(&body)));
        }

        let raw: RawUser = serde_json::from_str(&body)?;
        Ok(raw.into_user())
    }

    /// POST a body to an auth endpoint and parse the issued session.
    async fn session_request(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<AuthSession, AuthError> {
        let response = self
            .client
            .post(format!("{}/{path}", self.base_url))
            .header("apikey", &self.anon_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(map_auth_failure(status.as_u16(), &extract_message(&text)));
        }

        let raw: RawSession = serde_json::from_str(&text)?;
        Ok(AuthSession {
            access_token: raw.access_token,
            refresh_token: raw.refresh_token,
            expires_in: raw.expires_in,
            user: raw.user.into_user(),
        })
    }
}

/// Reject passwords that the auth service would refuse anyway.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Pull the human-readable message out of an auth error body.
///
/// The service uses several shapes (`error_description`, `msg`, `message`);
/// unparseable bodies pass through verbatim.
fn extract_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["error_description", "msg", "message", "error"]
                .iter()
                .find_map(|key| v.get(key).and_then(|m| m.as_str()).map(str::to_owned))
        })
        .unwrap_or_else(|| body.to_owned())
}

// Wire shapes from the auth service.

#[derive(Debug, Deserialize)]
struct RawSession {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
    user: RawUser,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: Option<serde_json::Value>,
}

impl RawUser {
    fn into_user(self) -> AuthUser {
        let display_name = self
            .user_metadata
            .as_ref()
            .and_then(|m| m.get("display_name"))
            .and_then(|v| v.as_str())
            .map(str::to_owned);
        AuthUser {
            id: UserId::new(self.id),
            email: self.email.unwrap_or_default(),
            display_name,
        }
    }
}
