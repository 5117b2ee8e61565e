use serde::{Deserialize, Serialize};

/// A catalog product as handed to the feed pipeline, after the catalog
/// adapter has coerced missing fields to empty values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog product ID, kept as a string so numeric and opaque IDs share one shape.
    pub id: String,
    pub name: String,
    pub category: String,
    pub sub_category: String,
    pub selling_price: f64,
    /// Pre-discount price; equal to `selling_price` when the product is not on sale.
    pub list_price: f64,
    pub trending: bool,
    /// Creation time in epoch milliseconds, when the catalog supplies one.
    #[serde(default)]
    pub created_at: Option<i64>,
    /// Color/style options in catalog order.
    pub variants: Vec<Variant>,
}

impl Product {
    /// Returns the total number of variants for this product.
    #[must_use]
    pub fn variant_count(&self) -> usize {
        self.variants.len()
    }
}

/// A single color/style option of a [`Product`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub color: Option<String>,
    /// Image URLs in display order; the first one is the card image.
    pub images: Vec<String>,
    pub sizes: Vec<SizeStock>,
}

impl Variant {
    /// The first image of this variant, if any.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Label of the first size that still has stock.
    #[must_use]
    pub fn size_hint(&self) -> Option<&str> {
        self.sizes
            .iter()
            .find(|s| s.stock > 0)
            .map(|s| s.size.as_str())
    }
}

/// One row of a variant's size table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeStock {
    pub size: String,
    pub stock: u32,
}

/// A flattened, renderable unit representing one variant of one product.
///
/// Cards are derived on every product-list change and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantCard {
    /// ID of the owning product; shared by every card of that product.
    pub id: String,
    pub product_name: String,
    pub selling_price: f64,
    pub category: String,
    pub sub_category: String,
    pub image_url: Option<String>,
    pub color: Option<String>,
    pub size_hint: Option<String>,
    pub trending: bool,
    /// Creation time of the owning product in epoch milliseconds.
    pub created_at: Option<i64>,
}

impl VariantCard {
    /// Builds the card for `variant` of `product`.
    #[must_use]
    pub fn from_variant(product: &Product, variant: &Variant) -> Self {
        Self {
            id: product.id.clone(),
            product_name: product.name.clone(),
            selling_price: product.selling_price,
            category: product.category.clone(),
            sub_category: product.sub_category.clone(),
            image_url: variant.primary_image().map(str::to_owned),
            color: variant.color.clone(),
            size_hint: variant.size_hint().map(str::to_owned),
            trending: product.trending,
            created_at: product.created_at,
        }
    }

    /// The category key this card matches in the interest document.
    #[must_use]
    pub fn category_key(&self) -> String {
        normalize_category(&self.category)
    }
}

/// Normalizes a raw category label into an interest key (trimmed, lowercased).
///
/// Returns an empty string for blank input; callers treat that as "no category".
#[must_use]
pub fn normalize_category(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_variant(color: &str, images: &[&str], sizes: &[(&str, u32)]) -> Variant {
        Variant {
            color: Some(color.to_string()),
            images: images.iter().map(|s| (*s).to_string()).collect(),
            sizes: sizes
                .iter()
                .map(|(size, stock)| SizeStock {
                    size: (*size).to_string(),
                    stock: *stock,
                })
                .collect(),
        }
    }

    fn make_product(variants: Vec<Variant>) -> Product {
        Product {
            id: "p-1".to_string(),
            name: "Linen Shirt".to_string(),
            category: " Shirts ".to_string(),
            sub_category: "Casual".to_string(),
            selling_price: 29.99,
            list_price: 39.99,
            trending: true,
            created_at: Some(1_700_000_000_000),
            variants,
        }
    }

    #[test]
    fn variant_count_counts_all_variants() {
        let product = make_product(vec![
            make_variant("red", &[], &[]),
            make_variant("blue", &[], &[]),
        ]);
        assert_eq!(product.variant_count(), 2);
    }

    #[test]
    fn size_hint_skips_out_of_stock_sizes() {
        let variant = make_variant("red", &[], &[("S", 0), ("M", 3), ("L", 1)]);
        assert_eq!(variant.size_hint(), Some("M"));
    }

    #[test]
    fn size_hint_none_when_sold_out() {
        let variant = make_variant("red", &[], &[("S", 0)]);
        assert!(variant.size_hint().is_none());
    }

    #[test]
    fn card_uses_first_image_of_variant() {
        let variant = make_variant(
            "red",
            &["https://cdn.example.com/a.jpg", "https://cdn.example.com/b.jpg"],
            &[("M", 1)],
        );
        let product = make_product(vec![variant.clone()]);
        let card = VariantCard::from_variant(&product, &variant);
        assert_eq!(card.id, "p-1");
        assert_eq!(card.image_url.as_deref(), Some("https://cdn.example.com/a.jpg"));
        assert_eq!(card.color.as_deref(), Some("red"));
        assert_eq!(card.size_hint.as_deref(), Some("M"));
        assert_eq!(card.created_at, Some(1_700_000_000_000));
        assert!(card.trending);
    }

    #[test]
    fn card_without_images_has_no_image_url() {
        let variant = make_variant("red", &[], &[]);
        let product = make_product(vec![variant.clone()]);
        let card = VariantCard::from_variant(&product, &variant);
        assert!(card.image_url.is_none());
    }

    #[test]
    fn category_key_is_trimmed_and_lowercased() {
        let variant = make_variant("red", &[], &[]);
        let product = make_product(vec![variant.clone()]);
        let card = VariantCard::from_variant(&product, &variant);
        assert_eq!(card.category_key(), "shirts");
    }

    #[test]
    fn normalize_category_blank_is_empty() {
        assert_eq!(normalize_category("   "), "");
    }

    #[test]
    fn card_round_trips_through_json() {
        let variant = make_variant("red", &["https://cdn.example.com/a.jpg"], &[]);
        let product = make_product(vec![variant.clone()]);
        let card = VariantCard::from_variant(&product, &variant);
        let json = serde_json::to_string(&card).unwrap();
        let back: VariantCard = serde_json::from_str(&json).unwrap();
        assert_eq!(back, card);
    }
}
