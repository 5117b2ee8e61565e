//! Wire types for the catalog listing endpoint.
//!
//! ## Observed shape
//!
//! The listing is either `{"products": [...]}` or a bare array. Field names are
//! camelCase (`subCategory`, `sellingPrice`), but older payloads use snake_case;
//! both are accepted through serde aliases.
//!
//! ### IDs and prices
//! IDs arrive as numbers on some endpoints and strings on others. Prices arrive
//! as JSON numbers or decimal strings (`"29.99"`). Both are kept as raw
//! [`serde_json::Value`] here and coerced during normalization.
//!
//! ### Arrays
//! `variants`, `images`, and `sizes` may be absent or explicitly `null`. Both
//! cases deserialize to an empty `Vec`.
//!
//! ### Images
//! Usually plain URL strings; a few payloads send `{"src": "..."}` or
//! `{"url": "..."}` objects instead.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A single product from the catalog listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProduct {
    #[serde(default)]
    pub id: Value,

    #[serde(default, alias = "title", deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,

    #[serde(
        default,
        alias = "sub_category",
        deserialize_with = "null_as_default"
    )]
    pub sub_category: String,

    #[serde(default, alias = "selling_price")]
    pub selling_price: Value,

    /// Pre-discount price; absent when the product is not on sale.
    #[serde(default, alias = "list_price")]
    pub list_price: Value,

    #[serde(default, alias = "is_trending", alias = "isTrending")]
    pub trending: Value,

    /// Epoch milliseconds or an RFC 3339 timestamp.
    #[serde(default, alias = "created_at")]
    pub created_at: Value,

    #[serde(default, deserialize_with = "null_as_default")]
    pub variants: Vec<RawVariant>,
}

/// One color/style option of a [`RawProduct`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawVariant {
    #[serde(default)]
    pub color: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<Value>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub sizes: Vec<RawSize>,
}

/// One row of a variant's size/stock table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSize {
    #[serde(default, alias = "label", deserialize_with = "null_as_default")]
    pub size: String,

    #[serde(default, alias = "quantity", alias = "qty")]
    pub stock: Value,
}

/// Treats an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_camel_and_snake_case_fields() {
        let camel: RawProduct =
            serde_json::from_str(r#"{"id":1,"subCategory":"Sneakers","sellingPrice":10}"#)
                .unwrap();
        let snake: RawProduct =
            serde_json::from_str(r#"{"id":1,"sub_category":"Sneakers","selling_price":10}"#)
                .unwrap();
        assert_eq!(camel.sub_category, "Sneakers");
        assert_eq!(snake.sub_category, "Sneakers");
        assert_eq!(camel.selling_price, snake.selling_price);
    }

    #[test]
    fn null_arrays_become_empty() {
        let product: RawProduct =
            serde_json::from_str(r#"{"id":"a","name":null,"variants":null}"#).unwrap();
        assert!(product.name.is_empty());
        assert!(product.variants.is_empty());

        let variant: RawVariant =
            serde_json::from_str(r#"{"images":null,"sizes":null}"#).unwrap();
        assert!(variant.images.is_empty());
        assert!(variant.sizes.is_empty());
        assert!(variant.color.is_none());
    }

    #[test]
    fn missing_fields_default() {
        let product: RawProduct = serde_json::from_str("{}").unwrap();
        assert!(product.id.is_null());
        assert!(product.category.is_empty());
        assert!(product.trending.is_null());
    }
}
