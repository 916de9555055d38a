//! The normalization boundary between raw backend rows and typed models.
//!
//! Rows come back from the hosted persistence service as loose JSON: legacy
//! listings miss columns, joins come back null when the referenced row is
//! gone, and manually edited rows carry junk values. [`normalize_product`] is
//! the single, total, non-throwing function that turns whatever came back
//! into a [`Product`] the rest of the system may trust.
//!
//! Each record is normalized independently; one bad record degrades to a
//! fallback product rather than failing the page. Each *field* degrades
//! independently too. Degradations are logged (WARN for coercions worth a
//! human look, DEBUG for routine absences) and never propagated.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use snorty_core::{CategoryId, Condition, Price, ProductId, ProfileId};
use tracing::{debug, warn};

use super::types::{CategoryRef, Category, Product, SellerRef, FALLBACK_TITLE, PLACEHOLDER_IMAGE};

/// Normalize one raw product row. Pure and total: no I/O, never fails.
#[must_use]
pub fn normalize_product(raw: &Value) -> Product {
    let Some(record) = raw.as_object() else {
        warn!(kind = value_kind(raw), "product record is not an object; substituting fallback");
        return fallback_product(extract_id(raw));
    };

    let id = match extract_id(raw) {
        Some(id) => id,
        None => {
            warn!("product record missing id; synthesizing one");
            ProductId::synthesized()
        }
    };

    Product {
        title: non_empty_string(record, "title")
            .unwrap_or_else(|| FALLBACK_TITLE.to_owned()),
        description: non_empty_string(record, "description").unwrap_or_default(),
        price: coerce_price(record.get("price"), &id),
        condition: coerce_condition(record.get("condition"), &id),
        images: resolve_images(record),
        category: normalize_category_ref(record.get("category")),
        seller: normalize_seller_ref(record.get("seller")),
        is_available: bool_field(record, "is_available"),
        is_featured: bool_field(record, "is_featured"),
        created_at: coerce_created_at(record.get("created_at"), &id),
        id,
    }
}

/// Normalize one raw category row; `None` when the row is unusable.
///
/// Categories are a flat reference collection, so unlike products there is
/// nothing sensible to degrade to - a row without id and name is dropped.
#[must_use]
pub fn normalize_category(raw: &Value) -> Option<Category> {
    let record = raw.as_object()?;
    let id = id_string(record.get("id"))?;
    let name = non_empty_string(record, "name")?;
    let slug = non_empty_string(record, "slug").unwrap_or_else(|| slugify(&name));
    Some(Category {
        id: CategoryId::new(id),
        name,
        slug,
        description: non_empty_string(record, "description"),
    })
}

/// Minimal well-formed product standing in for an unusable record.
fn fallback_product(id: Option<ProductId>) -> Product {
    Product {
        id: id.unwrap_or_else(ProductId::synthesized),
        title: "Listing unavailable".to_owned(),
        description: String::new(),
        price: Price::ZERO,
        condition: Condition::default(),
        images: vec![PLACEHOLDER_IMAGE.to_owned()],
        category: CategoryRef::uncategorized(),
        seller: SellerRef::unknown(),
        is_available: false,
        is_featured: false,
        created_at: Utc::now(),
    }
}

/// Pull an id out of a raw value, tolerating numeric ids from legacy rows.
fn extract_id(raw: &Value) -> Option<ProductId> {
    let record = raw.as_object()?;
    id_string(record.get("id")).map(ProductId::new)
}

fn id_string(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn non_empty_string(record: &Map<String, Value>, key: &str) -> Option<String> {
    match record.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn bool_field(record: &Map<String, Value>, key: &str) -> bool {
    record.get(key).and_then(Value::as_bool).unwrap_or(false)
}

/// Coerce a raw price to a non-negative amount; anything unusable becomes 0.
fn coerce_price(value: Option<&Value>, id: &ProductId) -> Price {
    let parsed = match value {
        Some(Value::Number(n)) => n.to_string().parse::<Decimal>().ok(),
        Some(Value::String(s)) => s.trim().parse::<Decimal>().ok(),
        _ => None,
    };

    match parsed {
        Some(amount) if amount.is_sign_negative() => {
            warn!(product_id = %id, %amount, "negative price coerced to zero");
            Price::ZERO
        }
        Some(amount) => Price::new(amount),
        None => {
            if value.is_some_and(|v| !v.is_null()) {
                warn!(product_id = %id, raw = ?value, "unparseable price coerced to zero");
            } else {
                debug!(product_id = %id, "missing price defaulted to zero");
            }
            Price::ZERO
        }
    }
}

/// Allow-list check on the condition column; anything else coerces to Good.
fn coerce_condition(value: Option<&Value>, id: &ProductId) -> Condition {
    match value {
        Some(Value::String(s)) => Condition::parse(s).unwrap_or_else(|| {
            warn!(product_id = %id, raw = %s, "unrecognized condition coerced to good");
            Condition::Good
        }),
        Some(v) if !v.is_null() => {
            warn!(product_id = %id, raw = ?v, "non-string condition coerced to good");
            Condition::Good
        }
        _ => Condition::Good,
    }
}

/// Image resolution order: joined image rows (by declared order) -> single
/// main-image column -> one-element placeholder.
fn resolve_images(record: &Map<String, Value>) -> Vec<String> {
    if let Some(Value::Array(rows)) = record.get("product_images") {
        let mut joined: Vec<(i64, String)> = rows
            .iter()
            .filter_map(|row| {
                let row = row.as_object()?;
                let url = match row.get("image_url").or_else(|| row.get("url")) {
                    Some(Value::String(s)) if !s.is_empty() => s.clone(),
                    _ => return None,
                };
                let order = row
                    .get("display_order")
                    .and_then(Value::as_i64)
                    .unwrap_or(i64::MAX);
                Some((order, url))
            })
            .collect();
        if !joined.is_empty() {
            joined.sort_by(|a, b| a.0.cmp(&b.0));
            return joined.into_iter().map(|(_, url)| url).collect();
        }
    }

    if let Some(url) = non_empty_string(record, "image_url") {
        return vec![url];
    }

    vec![PLACEHOLDER_IMAGE.to_owned()]
}

/// Category join degrades to the Uncategorized sentinel, independently of the
/// rest of the record.
fn normalize_category_ref(value: Option<&Value>) -> CategoryRef {
    let Some(Value::Object(join)) = value else {
        return CategoryRef::uncategorized();
    };
    let (Some(id), Some(name)) = (id_string(join.get("id")), join_string(join, "name")) else {
        debug!("category join malformed; using uncategorized sentinel");
        return CategoryRef::uncategorized();
    };
    let slug = join_string(join, "slug").unwrap_or_else(|| slugify(&name));
    CategoryRef {
        id: CategoryId::new(id),
        name,
        slug,
    }
}

/// Seller join degrades to the Unknown Seller sentinel under the same rules.
fn normalize_seller_ref(value: Option<&Value>) -> SellerRef {
    let Some(Value::Object(join)) = value else {
        return SellerRef::unknown();
    };
    let Some(id) = id_string(join.get("id")) else {
        debug!("seller join malformed; using unknown-seller sentinel");
        return SellerRef::unknown();
    };
    let username = join_string(join, "username").unwrap_or_else(|| "unknown".to_owned());
    let full_name = join_string(join, "full_name").unwrap_or_else(|| username.clone());
    SellerRef {
        id: ProfileId::new(id),
        full_name,
        username,
    }
}

fn join_string(join: &Map<String, Value>, key: &str) -> Option<String> {
    match join.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Creation time defaults to now when absent or unparseable. Display only -
/// the fallback is never persisted back.
fn coerce_created_at(value: Option<&Value>, id: &ProductId) -> DateTime<Utc> {
    match value {
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(s).map_or_else(
            |_| {
                warn!(product_id = %id, raw = %s, "unparseable created_at defaulted to now");
                Utc::now()
            },
            |dt| dt.with_timezone(&Utc),
        ),
        _ => Utc::now(),
    }
}

fn slugify(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect()
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn complete_record() -> Value {
        json!({
            "id": "prod-1",
            "title": "Wool jacket",
            "description": "Barely worn",
            "price": 42.5,
            "condition": "like_new",
            "is_available": true,
            "is_featured": false,
            "created_at": "2026-03-01T12:00:00Z",
            "image_url": "https://img.example/main.jpg",
            "product_images": [
                {"image_url": "https://img.example/b.jpg", "display_order": 2},
                {"image_url": "https://img.example/a.jpg", "display_order": 1}
            ],
            "category": {"id": "cat-1", "name": "Outerwear", "slug": "outerwear"},
            "seller": {"id": "prof-1", "full_name": "Sam Seller", "username": "sam"}
        })
    }

    #[test]
    fn test_complete_record_normalizes_faithfully() {
        let product = normalize_product(&complete_record());
        assert_eq!(product.id.as_str(), "prod-1");
        assert_eq!(product.title, "Wool jacket");
        assert_eq!(product.price, Price::new("42.5".parse().expect("decimal")));
        assert_eq!(product.condition, Condition::LikeNew);
        assert!(product.is_available);
        assert_eq!(product.category.slug, "outerwear");
        assert_eq!(product.seller.username, "sam");
        assert_eq!(
            product.created_at,
            DateTime::parse_from_rfc3339("2026-03-01T12:00:00Z").expect("timestamp")
        );
    }

    #[test]
    fn test_joined_images_sorted_by_declared_order() {
        let product = normalize_product(&complete_record());
        assert_eq!(
            product.images,
            vec!["https://img.example/a.jpg", "https://img.example/b.jpg"]
        );
    }

    #[test]
    fn test_image_fallback_chain() {
        // No joined rows: the single main-image column wins.
        let record = json!({"id": "p", "product_images": [], "image_url": "https://img.example/solo.jpg"});
        assert_eq!(
            normalize_product(&record).images,
            vec!["https://img.example/solo.jpg"]
        );

        // Nothing at all: one-element placeholder.
        let record = json!({"id": "p"});
        assert_eq!(normalize_product(&record).images, vec![PLACEHOLDER_IMAGE]);
    }

    #[test]
    fn test_invalid_condition_coerces_to_good() {
        let mut record = complete_record();
        record["condition"] = json!("mint");
        assert_eq!(normalize_product(&record).condition, Condition::Good);

        record["condition"] = json!(7);
        assert_eq!(normalize_product(&record).condition, Condition::Good);

        record["condition"] = Value::Null;
        assert_eq!(normalize_product(&record).condition, Condition::Good);
    }

    #[test]
    fn test_price_coercions() {
        let price_of = |v: Value| {
            let mut record = complete_record();
            record["price"] = v;
            normalize_product(&record).price
        };

        assert_eq!(price_of(Value::Null), Price::ZERO);
        assert_eq!(price_of(json!("not a number")), Price::ZERO);
        assert_eq!(price_of(json!(-3)), Price::ZERO);
        assert_eq!(price_of(json!("12.50")), Price::new("12.50".parse().expect("decimal")));
    }

    #[test]
    fn test_category_and_seller_degrade_independently() {
        let mut record = complete_record();
        record["category"] = Value::Null;
        let product = normalize_product(&record);
        assert_eq!(product.category, CategoryRef::uncategorized());
        // Seller untouched by the broken category join.
        assert_eq!(product.seller.username, "sam");

        let mut record = complete_record();
        record["seller"] = json!({"full_name": "No Id"});
        let product = normalize_product(&record);
        assert_eq!(product.seller, SellerRef::unknown());
        assert_eq!(product.category.name, "Outerwear");
    }

    #[test]
    fn test_missing_title_uses_fallback_label() {
        let record = json!({"id": "p", "title": "   "});
        assert_eq!(normalize_product(&record).title, FALLBACK_TITLE);
    }

    #[test]
    fn test_numeric_id_is_tolerated() {
        let record = json!({"id": 1234, "title": "Lamp"});
        assert_eq!(normalize_product(&record).id.as_str(), "1234");
    }

    #[test]
    fn test_missing_id_synthesizes_one() {
        let product = normalize_product(&json!({"title": "Orphan"}));
        assert!(!product.id.is_empty());
        assert_eq!(product.title, "Orphan");
    }

    #[test]
    fn test_non_object_record_degrades_to_fallback() {
        for raw in [json!("garbage"), json!(42), json!(["a"]), Value::Null] {
            let product = normalize_product(&raw);
            assert_eq!(product.title, "Listing unavailable");
            assert_eq!(product.images, vec![PLACEHOLDER_IMAGE]);
            assert_eq!(product.price, Price::ZERO);
            assert!(!product.is_available);
        }
    }

    #[test]
    fn test_invariant_holds_for_adversarial_records() {
        // The §3 invariant, fuzz-lite: every field present and well-typed.
        let nasty = [
            json!({}),
            json!({"id": "", "price": {"nested": true}, "images": "nope"}),
            json!({"id": "x", "condition": [], "category": [], "seller": 3,
                   "product_images": [{"display_order": "first"}], "created_at": "yesterday"}),
        ];
        for raw in nasty {
            let product = normalize_product(&raw);
            assert!(!product.images.is_empty());
            assert!(Condition::ALL.contains(&product.condition));
            assert!(!product.id.is_empty());
            assert!(!product.title.is_empty());
        }
    }

    #[test]
    fn test_normalize_category_rows() {
        let row = json!({"id": "cat-1", "name": "Books", "slug": "books", "description": null});
        let category = normalize_category(&row).expect("valid category");
        assert_eq!(category.slug, "books");
        assert_eq!(category.description, None);

        // Slug derived when missing.
        let row = json!({"id": "cat-2", "name": "Home & Garden"});
        assert_eq!(normalize_category(&row).expect("valid").slug, "home---garden");

        // Unusable rows are dropped, not defaulted.
        assert!(normalize_category(&json!({"name": "No id"})).is_none());
        assert!(normalize_category(&json!("junk")).is_none());
    }
}
