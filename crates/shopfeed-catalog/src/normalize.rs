//! Coercion from raw catalog payloads to [`shopfeed_core::Product`].
//!
//! Nothing here rejects a product for a missing or oddly typed field: missing
//! arrays become empty, missing strings become empty, unparseable prices
//! become `0.0`. Only a body that is not JSON at all is an error.

use serde_json::Value;
use shopfeed_core::{Product, SizeStock, Variant};

use crate::error::CatalogError;
use crate::types::{RawProduct, RawSize, RawVariant};

/// Parses a catalog response body into normalized products.
///
/// Accepts `{"products": [...]}` or a bare array. A `products` field that is
/// not an array yields an empty list; individual entries that cannot be read
/// as a product object are skipped with a warning.
///
/// # Errors
///
/// Returns [`CatalogError::Deserialize`] if `body` is not valid JSON.
pub fn parse_catalog(body: &str) -> Result<Vec<Product>, CatalogError> {
    let root: Value = serde_json::from_str(body).map_err(|e| CatalogError::Deserialize {
        context: "catalog response body".to_string(),
        source: e,
    })?;

    let entries = match root {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("products") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                tracing::warn!(
                    kind = json_kind(&other),
                    "catalog `products` field is not an array; treating as empty"
                );
                Vec::new()
            }
            None => Vec::new(),
        },
        other => {
            tracing::warn!(
                kind = json_kind(&other),
                "catalog body is neither an object nor an array; treating as empty"
            );
            Vec::new()
        }
    };

    let products = entries
        .into_iter()
        .enumerate()
        .filter_map(|(idx, entry)| match serde_json::from_value::<RawProduct>(entry) {
            Ok(raw) => Some(normalize_product(raw)),
            Err(e) => {
                tracing::warn!(index = idx, error = %e, "skipping unreadable catalog entry");
                None
            }
        })
        .collect();

    Ok(products)
}

/// Normalizes a raw [`RawProduct`] into a [`Product`].
#[must_use]
pub fn normalize_product(raw: RawProduct) -> Product {
    let selling_price = coerce_f64(&raw.selling_price).unwrap_or(0.0);
    // A missing list price means "not discounted".
    let list_price = coerce_f64(&raw.list_price).unwrap_or(selling_price);

    Product {
        id: coerce_string(&raw.id),
        name: raw.name.trim().to_string(),
        category: raw.category.trim().to_string(),
        sub_category: raw.sub_category.trim().to_string(),
        selling_price,
        list_price,
        trending: coerce_bool(&raw.trending),
        created_at: coerce_timestamp_ms(&raw.created_at),
        variants: raw.variants.into_iter().map(normalize_variant).collect(),
    }
}

fn normalize_variant(raw: RawVariant) -> Variant {
    let color = raw
        .color
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    let images = raw.images.iter().filter_map(image_url).collect();

    Variant {
        color,
        images,
        sizes: raw.sizes.into_iter().map(normalize_size).collect(),
    }
}

fn normalize_size(raw: RawSize) -> SizeStock {
    #[allow(clippy::cast_possible_truncation)]
    let stock = match &raw.stock {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse::<i64>().unwrap_or(0),
        _ => 0,
    };

    SizeStock {
        size: raw.size.trim().to_string(),
        stock: u32::try_from(stock.max(0)).unwrap_or(u32::MAX),
    }
}

/// Extracts a non-blank image URL from a string or `{src|url}` object.
fn image_url(value: &Value) -> Option<String> {
    let raw = match value {
        Value::String(s) => s.as_str(),
        Value::Object(map) => map
            .get("src")
            .or_else(|| map.get("url"))
            .and_then(Value::as_str)?,
        _ => return None,
    };
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn coerce_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|f| f.is_finite())
}

fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64().is_some_and(|i| i != 0),
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"),
        _ => false,
    }
}

/// Reads epoch milliseconds from a number or an RFC 3339 string.
fn coerce_timestamp_ms(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed.parse::<i64>().ok().or_else(|| {
                chrono::DateTime::parse_from_rfc3339(trimmed)
                    .ok()
                    .map(|dt| dt.timestamp_millis())
            })
        }
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
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
#[path = "normalize_test.rs"]
mod tests;
