//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SNORTY_BASE_URL` - Public URL for the storefront API
//! - `SNORTY_BACKEND_URL` - Base URL of the hosted persistence service
//! - `SNORTY_BACKEND_API_KEY` - API key for the persistence/auth/storage APIs
//!
//! ## Optional
//! - `SNORTY_HOST` - Bind address (default: 127.0.0.1)
//! - `SNORTY_PORT` - Listen port (default: 3000)
//! - `SNORTY_ALLOWED_ORIGIN` - CORS origin of the shop client
//! - `SNORTY_DATA_DIR` - Directory for durable client-local state (default: ./data)
//! - `SNORTY_GEOCODER_URL` - Reverse-geocoding endpoint base
//! - `SNORTY_GEOCODER_USER_AGENT` - User agent sent to the geocoder
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";
const DEFAULT_GEOCODER_USER_AGENT: &str = "snorty-storefront/0.1 (+https://snorty.market)";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront API
    pub base_url: String,
    /// Origin of the shop client, for CORS (absent = same origin)
    pub allowed_origin: Option<String>,
    /// Directory holding durable client-local state (cart, saved location)
    pub data_dir: PathBuf,
    /// Hosted backend configuration
    pub backend: BackendConfig,
    /// Reverse-geocoding configuration
    pub geocoder: GeocoderConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

/// Hosted persistence/auth/storage service configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct BackendConfig {
    /// Service base URL (REST, auth and storage endpoints hang off it)
    pub url: String,
    /// API key sent with every request
    pub api_key: SecretString,
}

impl BackendConfig {
    /// The API key as a string slice.
    #[must_use]
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("url", &self.url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Reverse-geocoding provider configuration.
#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    /// Provider base URL
    pub base_url: String,
    /// User agent the provider requires for identification
    pub user_agent: String,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GEOCODER_URL.to_owned(),
            user_agent: DEFAULT_GEOCODER_USER_AGENT.to_owned(),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("SNORTY_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SNORTY_HOST".to_owned(), e.to_string()))?;
        let port = get_env_or_default("SNORTY_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SNORTY_PORT".to_owned(), e.to_string()))?;
        let base_url = get_required_env("SNORTY_BASE_URL")?;
        let allowed_origin = get_optional_env("SNORTY_ALLOWED_ORIGIN");
        let data_dir = PathBuf::from(get_env_or_default("SNORTY_DATA_DIR", "./data"));

        let backend = BackendConfig::from_env()?;
        let geocoder = GeocoderConfig::from_env();
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            host,
            port,
            base_url,
            allowed_origin,
            data_dir,
            backend,
            geocoder,
            sentry_dsn,
            sentry_environment,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl BackendConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let url = get_required_env("SNORTY_BACKEND_URL")?;
        // Catch obviously broken URLs at startup rather than on first query.
        url::Url::parse(&url).map_err(|e| {
            ConfigError::InvalidEnvVar("SNORTY_BACKEND_URL".to_owned(), e.to_string())
        })?;

        Ok(Self {
            url,
            api_key: SecretString::from(get_required_env("SNORTY_BACKEND_API_KEY")?),
        })
    }
}

impl GeocoderConfig {
    fn from_env() -> Self {
        Self {
            base_url: get_env_or_default("SNORTY_GEOCODER_URL", DEFAULT_GEOCODER_URL),
            user_agent: get_env_or_default(
                "SNORTY_GEOCODER_USER_AGENT",
                DEFAULT_GEOCODER_USER_AGENT,
            ),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_owned()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> StorefrontConfig {
        StorefrontConfig {
            host: "127.0.0.1".parse().expect("ip"),
            port: 3000,
            base_url: "http://localhost:3000".to_owned(),
            allowed_origin: Some("http://localhost:5173".to_owned()),
            data_dir: PathBuf::from("./data"),
            backend: BackendConfig {
                url: "https://abc.backend.example".to_owned(),
                api_key: SecretString::from("sk-very-secret-value"),
            },
            geocoder: GeocoderConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    #[test]
    fn test_socket_addr() {
        let config = sample_config();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_backend_config_debug_redacts_api_key() {
        let config = sample_config();
        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("abc.backend.example"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("sk-very-secret-value"));
    }

    #[test]
    fn test_geocoder_defaults() {
        let geocoder = GeocoderConfig::default();
        assert!(geocoder.base_url.starts_with("https://"));
        assert!(!geocoder.user_agent.is_empty());
    }
}
