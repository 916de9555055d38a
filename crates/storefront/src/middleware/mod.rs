//! HTTP middleware for the storefront API.

pub mod request_id;

pub use request_id::request_id_middleware;
