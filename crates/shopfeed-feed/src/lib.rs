//! Client-side feed construction.
//!
//! Three components, leaves first:
//!
//! - [`expander`]: flattens products into interleaved variant cards.
//! - [`interest`] / [`rerank`]: persist category interactions and pull the
//!   most recent, frequent categories to the front of the feed.
//! - [`aspect`]: persisted image aspect ratios with TTL, eviction, and
//!   in-flight probe coalescing.
//!
//! None of them return errors to the caller. Store, parse, and probe failures
//! are logged and degrade to pass-through order, a missing ratio, or an empty
//! expansion.

pub mod aspect;
pub mod error;
pub mod expander;
pub mod generation;
pub mod interest;
pub mod pipeline;
pub mod probe;
pub mod rerank;

pub use aspect::{normalize_image_key, AspectRatioCache, AspectRatioEntry, CacheSettings};
pub use error::ProbeError;
pub use expander::{expand_variants, max_show};
pub use generation::{GenerationToken, RequestGeneration};
pub use interest::{InterestDocument, InterestRecord, InterestTracker};
pub use pipeline::{FeedBuild, FeedPipeline};
pub use probe::{HttpImageProbe, ImageProbe, ImageSize};
pub use rerank::{rerank, ReorderOptions};
