//! Variant expansion: products in, round-robin interleaved variant cards out.

use shopfeed_core::{Product, VariantCard};

/// Number of variants of a product that get their own card.
///
/// | variants | cards |
/// |----------|-------|
/// | 0        | 0     |
/// | 1        | 1     |
/// | 2..=4    | 2     |
/// | 5..=6    | 3     |
/// | 7+       | 4     |
#[must_use]
pub fn max_show(variant_count: usize) -> usize {
    match variant_count {
        0 => 0,
        1 => 1,
        2..=4 => 2,
        5..=6 => 3,
        _ => 4,
    }
}

/// Flattens `products` into variant cards, interleaved round-robin.
///
/// Each product contributes one card for each of its first
/// [`max_show`] variants. Round `r` emits the `r`-th card of every product
/// that has one, in catalog order, so round 0 is exactly one card per
/// product. A product without variants contributes nothing.
#[must_use]
pub fn expand_variants(products: &[Product]) -> Vec<VariantCard> {
    let groups: Vec<Vec<VariantCard>> = products
        .iter()
        .map(|product| {
            product
                .variants
                .iter()
                .take(max_show(product.variant_count()))
                .map(|variant| VariantCard::from_variant(product, variant))
                .collect()
        })
        .collect();

    let max_len = groups.iter().map(Vec::len).max().unwrap_or(0);
    let total = groups.iter().map(Vec::len).sum();
    let mut cards = Vec::with_capacity(total);

    for round in 0..max_len {
        for group in &groups {
            if let Some(card) = group.get(round) {
                cards.push(card.clone());
            }
        }
    }

    tracing::debug!(
        products = products.len(),
        cards = cards.len(),
        rounds = max_len,
        "expanded product variants"
    );
    cards
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopfeed_core::Variant;

    fn variant(label: &str) -> Variant {
        Variant {
            color: Some(label.to_string()),
            images: vec![format!("https://cdn.example.com/{label}.jpg")],
            sizes: Vec::new(),
        }
    }

    fn product(id: &str, variant_count: usize) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            category: "Shoes".to_string(),
            sub_category: String::new(),
            selling_price: 10.0,
            list_price: 10.0,
            trending: false,
            created_at: None,
            variants: (1..=variant_count)
                .map(|n| variant(&format!("{id}.v{n}")))
                .collect(),
        }
    }

    fn labels(cards: &[VariantCard]) -> Vec<&str> {
        cards.iter().filter_map(|c| c.color.as_deref()).collect()
    }

    #[test]
    fn max_show_step_function() {
        let shown: Vec<usize> = [0, 1, 2, 3, 4, 5, 6, 7, 8, 50]
            .into_iter()
            .map(max_show)
            .collect();
        assert_eq!(shown, vec![0, 1, 2, 2, 2, 3, 3, 4, 4, 4]);
    }

    #[test]
    fn expands_mixed_variant_counts_round_robin() {
        let products = vec![
            product("a", 1),
            product("b", 2),
            product("c", 5),
            product("d", 7),
        ];
        let cards = expand_variants(&products);

        assert_eq!(cards.len(), 1 + 2 + 3 + 4);
        assert_eq!(
            labels(&cards),
            vec![
                "a.v1", "b.v1", "c.v1", "d.v1", // round 0
                "b.v2", "c.v2", "d.v2", // round 1
                "c.v3", "d.v3", // round 2
                "d.v4", // round 3
            ]
        );
    }

    #[test]
    fn round_zero_has_one_card_per_product_in_order() {
        let products = vec![product("x", 3), product("y", 1), product("z", 9)];
        let cards = expand_variants(&products);
        let first_round: Vec<&str> = cards.iter().take(3).map(|c| c.id.as_str()).collect();
        assert_eq!(first_round, vec!["x", "y", "z"]);
    }

    #[test]
    fn high_variant_product_is_capped_at_four() {
        let cards = expand_variants(&[product("big", 12)]);
        assert_eq!(labels(&cards), vec!["big.v1", "big.v2", "big.v3", "big.v4"]);
    }

    #[test]
    fn product_without_variants_contributes_nothing() {
        let cards = expand_variants(&[product("empty", 0), product("b", 1)]);
        assert_eq!(labels(&cards), vec!["b.v1"]);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(expand_variants(&[]).is_empty());
    }

    #[test]
    fn expansion_is_deterministic() {
        let products = vec![product("a", 4), product("b", 6)];
        assert_eq!(expand_variants(&products), expand_variants(&products));
    }

    #[test]
    fn cards_carry_owning_product_id() {
        let cards = expand_variants(&[product("p9", 2)]);
        assert!(cards.iter().all(|c| c.id == "p9"));
    }
}
