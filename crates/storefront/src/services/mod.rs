//! Service clients and client-local state owners.
//!
//! Everything here is constructed once at startup and injected by reference
//! through [`crate::state::AppState`], so tests can substitute fakes without
//! ambient lookup.

pub mod auth;
pub mod cart;
pub mod geocode;
pub mod location;

pub use auth::{AuthError, AuthService};
pub use cart::{CartItem, CartStore};
pub use geocode::Geocoder;
pub use location::{LocationStore, SavedLocation};
