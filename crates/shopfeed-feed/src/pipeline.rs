//! Feed assembly: expand products into cards, then rerank by interest.

use shopfeed_core::{Product, VariantCard};

use crate::expander::expand_variants;
use crate::generation::{GenerationToken, RequestGeneration};
use crate::interest::InterestTracker;
use crate::rerank::ReorderOptions;

/// One assembled feed, tagged with the request that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedBuild {
    pub token: GenerationToken,
    pub cards: Vec<VariantCard>,
}

/// Builds feeds from product batches.
///
/// Each [`FeedPipeline::build`] call supersedes the previous one; callers
/// check [`FeedPipeline::is_current`] before applying a result.
pub struct FeedPipeline {
    tracker: InterestTracker,
    options: ReorderOptions,
    generation: RequestGeneration,
}

impl FeedPipeline {
    pub fn new(tracker: InterestTracker, options: ReorderOptions) -> Self {
        Self {
            tracker,
            options,
            generation: RequestGeneration::new(),
        }
    }

    /// Expands `products` and reorders the cards toward the user's interests.
    pub async fn build(&self, products: &[Product]) -> FeedBuild {
        let token = self.generation.begin();
        let expanded = expand_variants(products);
        let cards = self.tracker.reorder(&expanded, self.options).await;
        tracing::debug!(
            generation = token.value(),
            products = products.len(),
            cards = cards.len(),
            "built feed"
        );
        FeedBuild { token, cards }
    }

    /// Whether `build` is from the most recent [`FeedPipeline::build`] call.
    #[must_use]
    pub fn is_current(&self, build: &FeedBuild) -> bool {
        self.generation.is_current(build.token)
    }

    #[must_use]
    pub fn tracker(&self) -> &InterestTracker {
        &self.tracker
    }

    #[must_use]
    pub fn options(&self) -> ReorderOptions {
        self.options
    }
}
