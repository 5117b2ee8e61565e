//! Interest-based reordering of a card list.

use std::collections::HashSet;

use shopfeed_core::{AppConfig, VariantCard};

use crate::interest::InterestDocument;

/// Tuning knobs for [`rerank`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReorderOptions {
    /// Maximum number of categories promoted.
    pub top_k: usize,
    /// Minimum interaction count for a category to be eligible.
    pub threshold: u64,
}

impl Default for ReorderOptions {
    fn default() -> Self {
        Self {
            top_k: 2,
            threshold: 2,
        }
    }
}

impl ReorderOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            top_k: config.interest_top_k,
            threshold: config.interest_threshold,
        }
    }
}

/// Moves cards of the user's top categories to the front.
///
/// Categories are picked by [`InterestDocument::top_categories`]. For each
/// one, in that order, every matching card is emitted (newest `created_at`
/// first; cards without one keep input order after those with one). The
/// remaining cards follow in input order, skipping any product ID already
/// emitted. The input is not modified.
#[must_use]
pub fn rerank(
    cards: &[VariantCard],
    interests: &InterestDocument,
    options: ReorderOptions,
) -> Vec<VariantCard> {
    let promoted = interests.top_categories(options.threshold, options.top_k);
    if promoted.is_empty() {
        return cards.to_vec();
    }

    let mut out: Vec<VariantCard> = Vec::with_capacity(cards.len());
    let mut seen: HashSet<&str> = HashSet::new();

    for category in &promoted {
        let mut matching: Vec<&VariantCard> = cards
            .iter()
            .filter(|card| card.category_key() == *category && !seen.contains(card.id.as_str()))
            .collect();
        // Stable: equal or missing timestamps keep input order.
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        for card in matching {
            out.push(card.clone());
            seen.insert(card.id.as_str());
        }
    }

    let promoted_count = out.len();
    out.extend(
        cards
            .iter()
            .filter(|card| !seen.contains(card.id.as_str()))
            .cloned(),
    );

    tracing::debug!(
        categories = ?promoted,
        promoted = promoted_count,
        total = out.len(),
        "reranked feed by interest"
    );
    out
}
