//! Snorty Core - Shared types library.
//!
//! This crate provides the domain types shared across Snorty components:
//! - `storefront` - API service behind the single-page shop client
//! - `integration-tests` - Black-box tests against a mock backend
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. The hosted
//! persistence service assigns every identifier, so IDs are opaque strings
//! rather than locally generated integers.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, and the item
//!   condition enum

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
