//! Application state shared across handlers.

use std::io;
use std::sync::Arc;

use crate::backend::{BackendClient, BackendError};
use crate::config::StorefrontConfig;
use crate::services::{AuthService, CartStore, Geocoder, LocationStore};

/// Error wiring up the application state at startup.
#[derive(Debug, thiserror::Error)]
pub enum StateInitError {
    #[error("backend client: {0}")]
    Backend(#[from] BackendError),
    #[error("data directory: {0}")]
    Io(#[from] io::Error),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the backend client and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    backend: BackendClient,
    auth: AuthService,
    cart: CartStore,
    location: LocationStore,
    geocoder: Geocoder,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Opens the durable cart and location stores under the configured data
    /// directory and builds the HTTP clients.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend client cannot be constructed or the
    /// data directory is unusable.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateInitError> {
        let backend = BackendClient::new(&config.backend)?;
        let auth = AuthService::new(&config.backend);
        let cart = CartStore::open(&config.data_dir)?;
        let location = LocationStore::open(&config.data_dir)?;
        let geocoder = Geocoder::new(&config.geocoder);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                auth,
                cart,
                location,
                geocoder,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the hosted backend client.
    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }

    /// Get a reference to the authentication service.
    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    /// Get a reference to the durable cart store.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// Get a reference to the saved-location store.
    #[must_use]
    pub fn location(&self) -> &LocationStore {
        &self.inner.location
    }

    /// Get a reference to the reverse geocoder.
    #[must_use]
    pub fn geocoder(&self) -> &Geocoder {
        &self.inner.geocoder
    }
}
