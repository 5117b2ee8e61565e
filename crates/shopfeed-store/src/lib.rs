//! Persisted key-value storage for the feed pipeline.
//!
//! The interest and aspect-ratio caches each live in a single JSON document
//! under a well-known key. Every write replaces the whole document; there is
//! no transactional primitive, so concurrent writers race last-write-wins.

pub mod error;
pub mod file;
pub mod memory;

pub use error::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;

/// Key holding the JSON-serialized interest document.
pub const INTEREST_KEY: &str = "shopfeed:interest";

/// Key holding the JSON-serialized aspect-ratio document.
pub const ASPECT_RATIO_KEY: &str = "shopfeed:aspect_ratios";

/// A string-valued persisted store with whole-value `get`/`set`.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing store cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replaces the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing store cannot be written.
    async fn set(&self, key: &str, value: String) -> Result<(), StoreError>;
}
