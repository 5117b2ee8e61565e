//! Persisted per-category interaction counters.
//!
//! The whole interest map is one JSON document under
//! [`shopfeed_store::INTEREST_KEY`], rewritten on every interaction. Older
//! app versions stored a bare integer per category instead of a
//! `{count, timestamp}` object; those are normalized to `timestamp = 0` on read.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shopfeed_core::{normalize_category, Clock, SystemClock, VariantCard};
use shopfeed_store::{KvStore, StoreError, INTEREST_KEY};

use crate::rerank::{rerank, ReorderOptions};

/// Interaction counter for one normalized category key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestRecord {
    pub count: u64,
    /// Last interaction, epoch milliseconds. `0` for legacy records.
    pub timestamp: i64,
}

/// On-disk shapes a single entry may take.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredRecord {
    Legacy(u64),
    Record {
        #[serde(default)]
        count: u64,
        #[serde(default)]
        timestamp: i64,
    },
}

impl From<StoredRecord> for InterestRecord {
    fn from(stored: StoredRecord) -> Self {
        match stored {
            StoredRecord::Legacy(count) => Self { count, timestamp: 0 },
            StoredRecord::Record { count, timestamp } => Self { count, timestamp },
        }
    }
}

/// The normalized interest document: category key → record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterestDocument {
    records: BTreeMap<String, InterestRecord>,
}

impl InterestDocument {
    /// Parses a stored document, normalizing legacy entries.
    ///
    /// Entries that are neither an integer nor a record object are dropped.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if `raw` is not a JSON object.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let entries: BTreeMap<String, Value> = serde_json::from_str(raw)?;
        let mut records = BTreeMap::new();
        for (key, value) in entries {
            match serde_json::from_value::<StoredRecord>(value) {
                Ok(stored) => {
                    records.insert(key, InterestRecord::from(stored));
                }
                Err(e) => {
                    tracing::warn!(category = %key, error = %e, "dropping unreadable interest record");
                }
            }
        }
        Ok(Self { records })
    }

    /// Serializes every record in canonical `{count, timestamp}` form.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.records)
    }

    /// Bumps `key` by one and stamps it with `timestamp`.
    pub fn record(&mut self, key: &str, timestamp: i64) {
        let entry = self
            .records
            .entry(key.to_owned())
            .or_insert(InterestRecord {
                count: 0,
                timestamp,
            });
        entry.count = entry.count.saturating_add(1);
        entry.timestamp = timestamp;
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&InterestRecord> {
        self.records.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &InterestRecord)> {
        self.records.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Categories with `count >= threshold`, most recent interaction first,
    /// truncated to `top_k`.
    ///
    /// Ties on timestamp go to the higher count, then to the key, so the
    /// selection is stable for an unchanged document.
    #[must_use]
    pub fn top_categories(&self, threshold: u64, top_k: usize) -> Vec<String> {
        let mut eligible: Vec<(&String, &InterestRecord)> = self
            .records
            .iter()
            .filter(|(_, record)| record.count >= threshold)
            .collect();
        eligible.sort_by(|(ka, a), (kb, b)| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| b.count.cmp(&a.count))
                .then_with(|| ka.cmp(kb))
        });
        eligible
            .into_iter()
            .take(top_k)
            .map(|(key, _)| key.clone())
            .collect()
    }
}

/// Why the persisted document could not be used.
#[derive(Debug)]
enum LoadFailure {
    Store(StoreError),
    Parse(serde_json::Error),
}

impl std::fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadFailure::Store(e) => write!(f, "store read failed: {e}"),
            LoadFailure::Parse(e) => write!(f, "document parse failed: {e}"),
        }
    }
}

/// Records category interactions and re-ranks feeds toward them.
#[derive(Clone)]
pub struct InterestTracker {
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
}

impl InterestTracker {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn KvStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Counts one interaction with `category`.
    ///
    /// The category is trimmed and lowercased; blank input is ignored. The
    /// record is stamped with `timestamp` or the current time. The whole
    /// document is read, modified, and written back, so two concurrent calls
    /// may lose one increment.
    pub async fn record_interest(&self, category: &str, timestamp: Option<i64>) {
        let key = normalize_category(category);
        if key.is_empty() {
            return;
        }
        let at = timestamp.unwrap_or_else(|| self.clock.now_ms());

        let mut document = match self.try_load().await {
            Ok(document) => document,
            Err(LoadFailure::Parse(e)) => {
                tracing::warn!(error = %e, "interest document unreadable; starting fresh");
                InterestDocument::default()
            }
            Err(LoadFailure::Store(e)) => {
                // Writing now would clobber whatever the store still holds.
                tracing::warn!(category = %key, error = %e, "interest store unavailable; dropping interaction");
                return;
            }
        };

        document.record(&key, at);
        self.persist(&document).await;
        tracing::debug!(category = %key, timestamp = at, "recorded interest");
    }

    /// The current interest document, or an empty one if it cannot be read.
    pub async fn load(&self) -> InterestDocument {
        self.try_load().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "interest document unavailable; treating as empty");
            InterestDocument::default()
        })
    }

    /// See [`InterestDocument::top_categories`].
    pub async fn top_categories(&self, threshold: u64, top_k: usize) -> Vec<String> {
        self.load().await.top_categories(threshold, top_k)
    }

    /// Erases all interest data. Intended for debug tooling only.
    pub async fn clear(&self) {
        self.persist(&InterestDocument::default()).await;
        tracing::info!("cleared interest document");
    }

    /// Reorders `cards` toward recently and frequently visited categories.
    ///
    /// See [`rerank`] for the ordering rules. If the interest document cannot
    /// be read or parsed, the input order is returned unchanged.
    pub async fn reorder(&self, cards: &[VariantCard], options: ReorderOptions) -> Vec<VariantCard> {
        match self.try_load().await {
            Ok(document) => rerank(cards, &document, options),
            Err(e) => {
                tracing::warn!(error = %e, "interest data unavailable; keeping base order");
                cards.to_vec()
            }
        }
    }

    async fn try_load(&self) -> Result<InterestDocument, LoadFailure> {
        match self.store.get(INTEREST_KEY).await {
            Ok(Some(raw)) => InterestDocument::from_json(&raw).map_err(LoadFailure::Parse),
            Ok(None) => Ok(InterestDocument::default()),
            Err(e) => Err(LoadFailure::Store(e)),
        }
    }

    async fn persist(&self, document: &InterestDocument) {
        let raw = match document.to_json() {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize interest document");
                return;
            }
        };
        if let Err(e) = self.store.set(INTEREST_KEY, raw).await {
            tracing::warn!(error = %e, "failed to persist interest document");
        }
    }
}

#[cfg(test)]
#[path = "interest_test.rs"]
mod tests;
