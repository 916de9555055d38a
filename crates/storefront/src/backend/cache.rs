//! Cache types for persistence-service responses.

use super::types::{Category, ProductPage};

/// Cache key for backend reads.
///
/// Product pages are keyed by the *full* filter-parameter tuple (see
/// `ProductQuery::cache_key`), so a cached result can never be served for any
/// other filter combination - this is what makes slow responses for
/// abandoned filter states harmless.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Products(String),
    Categories,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(ProductPage),
    Categories(Vec<Category>),
}
