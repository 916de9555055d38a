//! Product query composition.
//!
//! Translates a filter-state snapshot into a single declarative request
//! against the `products` collection: conjunctive predicates, one sort key,
//! and an offset/limit window. The HTTP boundary maps the UI's sentinel
//! strings (`"all"`, `"any"`, `""`) to `None` exactly once, in
//! [`category_filter`] / [`choice_filter`] - everything below that deals only
//! in `Option`s.

use rust_decimal::Decimal;
use snorty_core::{CategoryId, Condition, ProductId};

/// Columns and embedded joins requested for every product select.
///
/// The category and seller joins ride along in the same request; the image
/// join carries its declared ordering so the normalizer can sort it.
pub const PRODUCT_SELECT: &str = "*,category:categories(id,name,slug),\
seller:profiles(id,full_name,username),\
product_images(image_url,display_order)";

/// Default page size for the shop listing.
pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// Upper bound on client-requested page sizes.
pub const MAX_PAGE_SIZE: u32 = 48;

/// Sort orders the shop UI can request.
///
/// Every order carries `id` ascending as a secondary key so that rows with
/// equal primary keys paginate stably across pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Creation time descending (the default).
    #[default]
    Newest,
    /// Creation time ascending.
    Oldest,
    /// Price ascending.
    PriceLow,
    /// Price descending.
    PriceHigh,
}

impl SortOrder {
    /// Parse the UI's sort token; anything unrecognized falls back to newest.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "price-low" => Self::PriceLow,
            "price-high" => Self::PriceHigh,
            "oldest" => Self::Oldest,
            _ => Self::Newest,
        }
    }

    /// The `order` parameter value for the persistence service.
    #[must_use]
    pub const fn order_param(self) -> &'static str {
        match self {
            Self::Newest => "created_at.desc,id.asc",
            Self::Oldest => "created_at.asc,id.asc",
            Self::PriceLow => "price.asc,id.asc",
            Self::PriceHigh => "price.desc,id.asc",
        }
    }

    /// The UI token for this order (used in cache keys).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::PriceLow => "price-low",
            Self::PriceHigh => "price-high",
        }
    }
}

/// Inclusive price bounds: `price >= min AND price <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
}

/// A complete filter-state snapshot for one product listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    /// 1-based page number.
    pub page: u32,
    /// Window size, always > 0.
    pub page_size: u32,
    pub category: Option<CategoryId>,
    pub search: Option<String>,
    pub sort: SortOrder,
    pub price_range: Option<PriceRange>,
    pub condition: Option<Condition>,
    pub brand: Option<String>,
}

impl ProductQuery {
    /// A query with no filters for the given window.
    #[must_use]
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
            category: None,
            search: None,
            sort: SortOrder::default(),
            price_range: None,
            condition: None,
            brand: None,
        }
    }

    /// Zero-based offset of the first row in the window.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.page_size as u64
    }

    /// Inclusive zero-based offset of the last row in the window.
    #[must_use]
    pub const fn end_offset(&self) -> u64 {
        self.offset() + self.page_size as u64 - 1
    }

    /// `Range` header value selecting the window, e.g. `0-11`.
    #[must_use]
    pub fn range_header(&self) -> String {
        format!("{}-{}", self.offset(), self.end_offset())
    }

    /// Query-string parameters for the persistence service.
    ///
    /// Filters are conjunctive; absent filters contribute nothing, so a query
    /// whose category was the `"all"` sentinel is byte-identical to one that
    /// never had a category.
    #[must_use]
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_owned(), PRODUCT_SELECT.to_owned())];

        if let Some(category) = &self.category {
            params.push(("category_id".to_owned(), format!("eq.{category}")));
        }

        if let Some(term) = self.search.as_deref() {
            let term = sanitize_term(term);
            if !term.is_empty() {
                params.push((
                    "or".to_owned(),
                    format!("(title.ilike.*{term}*,description.ilike.*{term}*)"),
                ));
            }
        }

        if let Some(range) = &self.price_range {
            params.push(("price".to_owned(), format!("gte.{}", range.min)));
            params.push(("price".to_owned(), format!("lte.{}", range.max)));
        }

        if let Some(condition) = self.condition {
            params.push(("condition".to_owned(), format!("eq.{condition}")));
        }

        if let Some(brand) = &self.brand {
            params.push(("brand".to_owned(), format!("eq.{brand}")));
        }

        params.push(("order".to_owned(), self.sort.order_param().to_owned()));

        params
    }

    /// Stable key identifying the full parameter tuple.
    ///
    /// Cached pages are keyed by this, which is what makes stale responses
    /// harmless: a result is only ever served for the exact tuple that
    /// produced it.
    #[must_use]
    pub fn cache_key(&self) -> String {
        format!(
            "page={}|size={}|cat={}|q={}|sort={}|price={}|cond={}|brand={}",
            self.page,
            self.page_size,
            self.category.as_ref().map_or("", CategoryId::as_str),
            self.search.as_deref().unwrap_or(""),
            self.sort.as_str(),
            self.price_range
                .as_ref()
                .map_or_else(String::new, |r| format!("{}..{}", r.min, r.max)),
            self.condition.map_or("", Condition::as_str),
            self.brand.as_deref().unwrap_or(""),
        )
    }
}

/// Parameters for a single-row product select by id.
#[must_use]
pub fn product_by_id_params(id: &ProductId) -> Vec<(String, String)> {
    vec![
        ("select".to_owned(), PRODUCT_SELECT.to_owned()),
        ("id".to_owned(), format!("eq.{id}")),
        ("limit".to_owned(), "1".to_owned()),
    ]
}

/// Map the UI's category sentinel to true absence.
///
/// The shop UI never sends "no filter" as a missing parameter; it sends the
/// sentinel string `"all"` (or an empty string from a cleared select box).
#[must_use]
pub fn category_filter(raw: &str) -> Option<CategoryId> {
    match raw.trim() {
        "" | "all" => None,
        id => Some(CategoryId::new(id)),
    }
}

/// Map the UI's `"any"` sentinel (condition, brand selects) to absence.
#[must_use]
pub fn choice_filter(raw: &str) -> Option<&str> {
    match raw.trim() {
        "" | "any" => None,
        value => Some(value),
    }
}

/// Strip characters that carry syntax in the persistence service's filter
/// grammar (list separators, pattern wildcards, quotes) from a search term.
fn sanitize_term(term: &str) -> String {
    term.trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '(' | ')' | '"' | '\\' | '*' | '%'))
        .collect()
}
