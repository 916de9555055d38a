//! Client for the hosted persistence/storage service.
//!
//! # Architecture
//!
//! The marketplace has no database of its own: products, categories,
//! profiles and returns all live in a hosted relational backend exposing a
//! REST query dialect (filter/sort/offset selects over collections, with
//! row-level access control enforced server-side). This module owns the
//! entire conversation with it:
//!
//! - [`query`] composes filter state into one declarative request
//! - [`normalize`] is the total boundary from raw rows to typed models
//! - reads retry up to [`READ_ATTEMPTS`] times on transient failures;
//!   mutations (return submissions, uploads) surface their error once
//! - responses are cached in-memory via `moka`, keyed by the full query
//!   tuple (categories for 10 minutes, product pages briefly)

pub mod cache;
pub mod normalize;
pub mod query;
pub mod types;

pub use query::{
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PriceRange, ProductQuery, SortOrder, category_filter,
    choice_filter,
};
pub use types::{Category, Product, ProductPage, ReturnReceipt};

use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::Expiry;
use moka::future::Cache;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_RANGE, RANGE};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::BackendConfig;
use cache::{CacheKey, CacheValue};
use normalize::{normalize_category, normalize_product};
use query::product_by_id_params;
use snorty_core::{ProductId, ReturnId};

/// Attempts for read queries (first try + retries) on transient failures.
pub const READ_ATTEMPTS: u32 = 3;

/// Base delay between read retries; grows linearly per attempt.
const RETRY_BASE_DELAY: Duration = Duration::from_millis(200);

/// Categories change rarely and are cached for 10 minutes.
const CATEGORY_TTL: Duration = Duration::from_secs(600);

/// Product pages are cached briefly, keyed by the full filter tuple.
const PRODUCT_PAGE_TTL: Duration = Duration::from_secs(60);

/// Errors that can occur when talking to the persistence service.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("backend error: {status} - {message}")]
    Api { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Single-row lookup matched nothing.
    #[error("not found: {0}")]
    NotFound(String),

    /// Rate limited; retry after the given number of seconds.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// A counted select came back without a usable total.
    #[error("response missing total count")]
    MissingCount,

    /// Client-side configuration problem (bad key material, bad URL).
    #[error("invalid backend configuration: {0}")]
    Config(String),
}

impl BackendError {
    /// Whether a retry has any chance of succeeding.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) | Self::RateLimited(_) => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Per-entry expiry: categories live long, product pages briefly.
struct ReadExpiry;

impl Expiry<CacheKey, CacheValue> for ReadExpiry {
    fn expire_after_create(
        &self,
        _key: &CacheKey,
        value: &CacheValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        match value {
            CacheValue::Products(_) => Some(PRODUCT_PAGE_TTL),
            CacheValue::Categories(_) => Some(CATEGORY_TTL),
        }
    }
}

/// A return request row to insert.
#[derive(Debug, Clone, Serialize)]
pub struct NewReturn {
    pub order_id: String,
    pub product_id: ProductId,
    pub reason: String,
    pub evidence_urls: Vec<String>,
}

/// Client for the hosted persistence service.
///
/// Cheaply cloneable; all clones share the HTTP connection pool and cache.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<CacheKey, CacheValue>,
}

impl BackendClient {
    /// Create a new client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key cannot be used as a header value.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(config.api_key())
            .map_err(|e| BackendError::Config(format!("invalid API key: {e}")))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key()))
            .map_err(|e| BackendError::Config(format!("invalid API key: {e}")))?;
        headers.insert("apikey", key);
        headers.insert("Authorization", bearer);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .expire_after(ReadExpiry)
            .build();

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                base_url: config.url.trim_end_matches('/').to_owned(),
                cache,
            }),
        })
    }

    /// One page of filtered, sorted products plus the full filtered count.
    ///
    /// Served from cache when the exact parameter tuple was fetched recently;
    /// otherwise fetched with bounded retries.
    ///
    /// # Errors
    ///
    /// Returns the final [`BackendError`] once retries are exhausted. The
    /// caller (route layer) decides how to surface it.
    #[instrument(skip(self), fields(page = query.page, page_size = query.page_size))]
    pub async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, BackendError> {
        let key = CacheKey::Products(query.cache_key());
        if let Some(CacheValue::Products(page)) = self.inner.cache.get(&key).await {
            debug!("product page served from cache");
            return Ok(page);
        }

        let page = self
            .with_read_retries(|| self.fetch_products(query))
            .await?;
        self.inner
            .cache
            .insert(key, CacheValue::Products(page.clone()))
            .await;
        Ok(page)
    }

    /// Single product by id.
    ///
    /// # Errors
    ///
    /// `BackendError::NotFound` when no row matches; transport/API errors
    /// after retries otherwise.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, BackendError> {
        let rows: Vec<Value> = self
            .with_read_retries(|| async {
                let response = self
                    .inner
                    .client
                    .get(self.collection_url("products"))
                    .query(&product_by_id_params(id))
                    .send()
                    .await?;
                Self::json_rows(response).await
            })
            .await?;

        rows.first()
            .map(normalize_product)
            .ok_or_else(|| BackendError::NotFound(format!("product {id}")))
    }

    /// All categories, cached for 10 minutes.
    ///
    /// # Errors
    ///
    /// Surfaces the final read error once retries are exhausted.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, BackendError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            return Ok(categories);
        }

        let categories = self
            .with_read_retries(|| async {
                let response = self
                    .inner
                    .client
                    .get(self.collection_url("categories"))
                    .query(&[
                        ("select", "id,name,slug,description"),
                        ("order", "name.asc"),
                    ])
                    .send()
                    .await?;
                let rows = Self::json_rows(response).await?;
                Ok(rows.iter().filter_map(normalize_category).collect::<Vec<_>>())
            })
            .await?;

        self.inner
            .cache
            .insert(CacheKey::Categories, CacheValue::Categories(categories.clone()))
            .await;
        Ok(categories)
    }

    /// Insert a return request row. Mutations are never auto-retried.
    ///
    /// # Errors
    ///
    /// Any transport or API failure, surfaced once.
    #[instrument(skip(self, row), fields(order_id = %row.order_id))]
    pub async fn create_return(&self, row: &NewReturn) -> Result<ReturnReceipt, BackendError> {
        let response = self
            .inner
            .client
            .post(self.collection_url("returns"))
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await?;

        let rows = Self::json_rows(response).await?;
        let inserted = rows.first().ok_or(BackendError::MissingCount)?;
        let id = inserted
            .get("id")
            .and_then(Value::as_str)
            .map(ReturnId::new)
            .ok_or_else(|| BackendError::Api {
                status: 200,
                message: "insert response missing id".to_owned(),
            })?;

        Ok(ReturnReceipt {
            id,
            order_id: row.order_id.clone(),
            product_id: row.product_id.clone(),
            reason: row.reason.clone(),
            evidence_urls: row.evidence_urls.clone(),
        })
    }

    /// Upload an object to the storage service, returning its public URL.
    ///
    /// # Errors
    ///
    /// Any transport or API failure, surfaced once (no retry).
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload_object(
        &self,
        bucket: &str,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, BackendError> {
        let url = format!("{}/storage/v1/object/{bucket}/{path}", self.inner.base_url);
        let response = self
            .inner
            .client
            .post(&url)
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(format!(
            "{}/storage/v1/object/public/{bucket}/{path}",
            self.inner.base_url
        ))
    }

    /// Readiness probe: one trivially small read against the backend.
    pub async fn ping(&self) -> bool {
        let result = self
            .inner
            .client
            .get(self.collection_url("categories"))
            .query(&[("select", "id"), ("limit", "1")])
            .send()
            .await;
        matches!(result, Ok(response) if response.status().is_success())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/rest/v1/{collection}", self.inner.base_url)
    }

    /// Fetch one product page: counted select with an offset/limit window.
    async fn fetch_products(&self, query: &ProductQuery) -> Result<ProductPage, BackendError> {
        let response = self
            .inner
            .client
            .get(self.collection_url("products"))
            .query(&query.params())
            .header(RANGE, query.range_header())
            .header("Range-Unit", "items")
            .header("Prefer", "count=exact")
            .send()
            .await?;

        let status = response.status();

        // A window entirely past the end of the filtered set is a valid
        // empty page, and the total still arrives in Content-Range.
        if status == StatusCode::RANGE_NOT_SATISFIABLE {
            let total_count = parse_content_range_total(
                response
                    .headers()
                    .get(CONTENT_RANGE)
                    .and_then(|v| v.to_str().ok()),
            )?;
            return Ok(ProductPage {
                products: Vec::new(),
                total_count,
            });
        }

        let total_count = parse_content_range_total(
            response
                .headers()
                .get(CONTENT_RANGE)
                .and_then(|v| v.to_str().ok()),
        );

        let rows = Self::json_rows(response).await?;
        let products = rows.iter().map(normalize_product).collect();

        Ok(ProductPage {
            products,
            total_count: total_count?,
        })
    }

    /// Shared response handling: status checks, rate-limit mapping, JSON rows.
    async fn json_rows(response: reqwest::Response) -> Result<Vec<Value>, BackendError> {
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(BackendError::RateLimited(retry_after));
        }

        let body = response.text().await?;

        if !status.is_success() {
            warn!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "backend returned non-success status"
            );
            return Err(BackendError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let rows: Vec<Value> = serde_json::from_str(&body)?;
        Ok(rows)
    }

    /// Run a read with bounded retries on transient failures.
    ///
    /// Rate-limit responses honor the advertised delay; everything else backs
    /// off linearly. Mutating operations must not go through here.
    async fn with_read_retries<T, F, Fut>(&self, op: F) -> Result<T, BackendError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, BackendError>>,
    {
        let mut attempt: u32 = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < READ_ATTEMPTS && err.is_transient() => {
                    let delay = match &err {
                        BackendError::RateLimited(seconds) => Duration::from_secs(*seconds),
                        _ => RETRY_BASE_DELAY * attempt,
                    };
                    warn!(
                        attempt,
                        error = %err,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "transient backend failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Parse the total count out of a `Content-Range` header (`0-11/345`,
/// `*/0` for an empty set). `*` totals mean the count was not computed.
fn parse_content_range_total(header: Option<&str>) -> Result<u64, BackendError> {
    let raw = header.ok_or(BackendError::MissingCount)?;
    let total = raw
        .rsplit('/')
        .next()
        .ok_or(BackendError::MissingCount)?;
    total.parse::<u64>().map_err(|_| BackendError::MissingCount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_content_range_total() {
        assert_eq!(parse_content_range_total(Some("0-11/345")).ok(), Some(345));
        assert_eq!(parse_content_range_total(Some("*/0")).ok(), Some(0));
        assert!(parse_content_range_total(Some("0-11/*")).is_err());
        assert!(parse_content_range_total(None).is_err());
    }

    #[test]
    fn test_transient_classification() {
        assert!(BackendError::RateLimited(2).is_transient());
        assert!(
            BackendError::Api {
                status: 503,
                message: String::new()
            }
            .is_transient()
        );
        assert!(
            !BackendError::Api {
                status: 400,
                message: String::new()
            }
            .is_transient()
        );
        assert!(!BackendError::NotFound("x".to_owned()).is_transient());
        assert!(!BackendError::MissingCount.is_transient());
    }
}
