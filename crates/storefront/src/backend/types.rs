//! Normalized read-models served to the shop client.
//!
//! Everything in this module is the *output* of the normalization boundary in
//! [`super::normalize`]: strictly typed, every field always present. Raw
//! backend rows are `serde_json::Value` and never escape the backend module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use snorty_core::{CategoryId, Condition, Price, ProductId, ProfileId};

/// URL served when a listing has no images at all.
pub const PLACEHOLDER_IMAGE: &str = "/images/placeholder.svg";

/// Title substituted for listings whose raw record lacks one.
pub const FALLBACK_TITLE: &str = "Untitled item";

/// A product listing, normalized for display.
///
/// Invariant: every field is present and well-typed regardless of how
/// malformed the raw source record was. `images` is never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub description: String,
    pub price: Price,
    pub condition: Condition,
    /// Ordered image URLs, first is primary. Never empty.
    pub images: Vec<String>,
    pub category: CategoryRef,
    pub seller: SellerRef,
    pub is_available: bool,
    pub is_featured: bool,
    /// Creation time; defaults to "now" for display when the row lacks one.
    /// Display fallback only - never written back to the backend.
    pub created_at: DateTime<Utc>,
}

/// Reference to the category a product belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
}

impl CategoryRef {
    /// Sentinel used when the category join is absent or malformed.
    #[must_use]
    pub fn uncategorized() -> Self {
        Self {
            id: CategoryId::new("uncategorized"),
            name: "Uncategorized".to_owned(),
            slug: "uncategorized".to_owned(),
        }
    }
}

/// Reference to the profile selling a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerRef {
    pub id: ProfileId,
    pub full_name: String,
    pub username: String,
}

impl SellerRef {
    /// Sentinel used when the seller join is absent or malformed.
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            id: ProfileId::new("unknown"),
            full_name: "Unknown Seller".to_owned(),
            username: "unknown".to_owned(),
        }
    }
}

/// A category row, shared globally and read-only from the client side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One page of filtered products plus the size of the full filtered set.
///
/// `total_count` reflects the whole filtered result set, not the page, so the
/// pagination calculator can derive total pages from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total_count: u64,
}

/// A submitted return request, echoed back after insertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnReceipt {
    pub id: snorty_core::ReturnId,
    pub order_id: String,
    pub product_id: ProductId,
    pub reason: String,
    pub evidence_urls: Vec<String>,
}
