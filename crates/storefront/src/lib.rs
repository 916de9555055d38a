//! Snorty storefront library.
//!
//! This crate provides the storefront API as a library, allowing it to be
//! tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod config;
pub mod debounce;
pub mod error;
pub mod middleware;
pub mod pagination;
pub mod routes;
pub mod services;
pub mod state;
