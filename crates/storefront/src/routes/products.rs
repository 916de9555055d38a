//! Product listing and detail handlers.
//!
//! The listing handler is where raw query-string state becomes a
//! `ProductQuery`: sentinel values collapse to "no filter", windows are
//! clamped, and the response carries the navigation metadata derived from
//! the counted result.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use snorty_core::{Condition, ProductId};

use crate::backend::{
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PriceRange, Product, ProductQuery, SortOrder,
    category_filter, choice_filter,
};
use crate::error::{AppError, Result};
use crate::pagination::{PageInfo, PageLink, page_links};
use crate::state::AppState;

/// Raw listing parameters, exactly as the client sent them.
#[derive(Debug, Default, Deserialize)]
pub struct ProductListParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub condition: Option<String>,
    pub brand: Option<String>,
}

/// A page of products plus everything needed to render navigation.
#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub products: Vec<Product>,
    pub page_info: PageInfo,
    pub page_links: Vec<PageLink>,
}

impl ProductListParams {
    /// Translate raw parameters into a composed query.
    ///
    /// Sentinels (`""`, `"all"`, `"any"`) become absent filters; the window
    /// is clamped to `1..=MAX_PAGE_SIZE`; a half-open price range is
    /// rejected rather than guessed at.
    fn into_query(self) -> Result<ProductQuery> {
        let page_size = self
            .page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE);
        let mut query = ProductQuery::new(self.page.unwrap_or(1), page_size);

        if let Some(raw) = &self.category {
            query.category = category_filter(raw);
        }
        if let Some(raw) = &self.search {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                query.search = Some(trimmed.to_owned());
            }
        }
        if let Some(raw) = &self.sort {
            query.sort = SortOrder::parse(raw);
        }
        if let Some(raw) = &self.condition
            && let Some(value) = choice_filter(raw)
        {
            query.condition = Some(Condition::parse(value).ok_or_else(|| {
                AppError::BadRequest(format!("unknown condition: {value}"))
            })?);
        }
        if let Some(raw) = &self.brand {
            query.brand = choice_filter(raw).map(str::to_owned);
        }

        query.price_range = match (self.min_price, self.max_price) {
            (Some(min), Some(max)) => {
                if min > max {
                    return Err(AppError::BadRequest(
                        "min_price must not exceed max_price".to_owned(),
                    ));
                }
                Some(PriceRange { min, max })
            }
            (None, None) => None,
            _ => {
                return Err(AppError::BadRequest(
                    "min_price and max_price must be provided together".to_owned(),
                ));
            }
        };

        Ok(query)
    }
}

/// `GET /api/products` - filtered, sorted, paginated listing.
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<ProductListParams>,
) -> Result<Json<ProductListResponse>> {
    let query = params.into_query()?;
    let page = state.backend().list_products(&query).await?;

    let page_info = PageInfo::compute(page.total_count, query.page_size, query.page);
    let links = page_links(page_info.current_page, page_info.total_pages);

    Ok(Json(ProductListResponse {
        products: page.products,
        page_info,
        page_links: links,
    }))
}

/// `GET /api/products/{id}` - single product detail.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let product = state.backend().get_product(&id).await?;
    Ok(Json(product))
}
