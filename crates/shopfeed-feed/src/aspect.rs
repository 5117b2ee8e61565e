//! Persisted image aspect ratios.
//!
//! Cards reserve layout height from `height / width` before their image has
//! loaded. Ratios live in one JSON document under
//! [`shopfeed_store::ASPECT_RATIO_KEY`], keyed by [`normalize_image_key`].
//! Entries older than the TTL read as misses but stay stored until the
//! document outgrows its cap, at which point the oldest tenth is evicted.
//!
//! Concurrent lookups of the same uncached key share one probe. The map of
//! pending probes is in-memory only and an entry is removed as soon as its
//! probe settles.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shopfeed_core::{AppConfig, Clock, SystemClock};
use shopfeed_store::{KvStore, ASPECT_RATIO_KEY};

use crate::probe::ImageProbe;

const DEFAULT_TTL_MS: i64 = 7 * 24 * 60 * 60 * 1_000;
const DEFAULT_MAX_ENTRIES: usize = 2_000;
const DEFAULT_WARM_CONCURRENCY: usize = 6;

/// One cached ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AspectRatioEntry {
    /// Height divided by width.
    pub ratio: f64,
    /// When the ratio was probed, epoch milliseconds.
    pub timestamp: i64,
}

impl AspectRatioEntry {
    fn is_usable(&self) -> bool {
        self.ratio.is_finite() && self.ratio > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    pub ttl_ms: i64,
    pub max_entries: usize,
    pub warm_concurrency: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_ms: DEFAULT_TTL_MS,
            max_entries: DEFAULT_MAX_ENTRIES,
            warm_concurrency: DEFAULT_WARM_CONCURRENCY,
        }
    }
}

impl CacheSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            ttl_ms: config.ratio_ttl_ms(),
            max_entries: config.ratio_max_entries,
            warm_concurrency: config.warm_concurrency,
        }
    }
}

/// Canonical cache key for an image URL.
///
/// Lowercases, drops the scheme (`http`, `https`, or protocol-relative `//`),
/// and strips the query string and fragment, so the same image behind either
/// scheme or with different tracking parameters shares one entry. Returns
/// `None` for blank input.
#[must_use]
pub fn normalize_image_key(url: &str) -> Option<String> {
    let lower = url.trim().to_lowercase();
    let without_scheme = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"))
        .or_else(|| lower.strip_prefix("//"))
        .unwrap_or(&lower);
    let end = without_scheme
        .find(|c: char| c == '?' || c == '#')
        .unwrap_or(without_scheme.len());
    let key = &without_scheme[..end];
    (!key.is_empty()).then(|| key.to_string())
}

type Entries = BTreeMap<String, AspectRatioEntry>;
type PendingProbe = Shared<BoxFuture<'static, Option<Resolved>>>;

/// Outcome of a coalesced lookup.
#[derive(Debug, Clone, Copy)]
struct Resolved {
    ratio: f64,
    /// Whether this lookup wrote a new entry to the store.
    stored: bool,
}

struct Inner {
    store: Arc<dyn KvStore>,
    probe: Arc<dyn ImageProbe>,
    clock: Arc<dyn Clock>,
    settings: CacheSettings,
    pending: Mutex<HashMap<String, PendingProbe>>,
    // Serializes this instance's read-modify-write cycles.
    write_gate: tokio::sync::Mutex<()>,
}

/// Aspect-ratio cache with TTL, size-capped eviction, and probe coalescing.
///
/// Cloning is cheap and clones share the pending-probe map.
#[derive(Clone)]
pub struct AspectRatioCache {
    inner: Arc<Inner>,
}

impl AspectRatioCache {
    pub fn new(
        store: Arc<dyn KvStore>,
        probe: Arc<dyn ImageProbe>,
        settings: CacheSettings,
    ) -> Self {
        Self::with_clock(store, probe, Arc::new(SystemClock), settings)
    }

    pub fn with_clock(
        store: Arc<dyn KvStore>,
        probe: Arc<dyn ImageProbe>,
        clock: Arc<dyn Clock>,
        settings: CacheSettings,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                probe,
                clock,
                settings,
                pending: Mutex::new(HashMap::new()),
                write_gate: tokio::sync::Mutex::new(()),
            }),
        }
    }

    /// The stored ratio for `url` if it is still within the TTL.
    ///
    /// Never probes.
    pub async fn get_cached_ratio(&self, url: &str) -> Option<f64> {
        let key = normalize_image_key(url)?;
        let entries = self.inner.load_entries().await;
        self.inner.fresh_ratio(&entries, &key)
    }

    /// The ratio for `url`, probing if no fresh entry exists.
    ///
    /// A probe already in flight for the same key is awaited instead of
    /// starting another. A failed probe returns `None` and stores nothing.
    pub async fn get_or_fetch_ratio(&self, url: &str) -> Option<f64> {
        let key = normalize_image_key(url)?;
        self.resolve(key, url).await.map(|resolved| resolved.ratio)
    }

    /// Re-probes `url` regardless of TTL and overwrites its entry.
    pub async fn force_refresh(&self, url: &str) -> Option<f64> {
        let key = normalize_image_key(url)?;
        self.inner
            .probe_and_store(&key, url)
            .await
            .map(|resolved| resolved.ratio)
    }

    async fn resolve(&self, key: String, url: &str) -> Option<Resolved> {
        let entries = self.inner.load_entries().await;
        if let Some(ratio) = self.inner.fresh_ratio(&entries, &key) {
            return Some(Resolved {
                ratio,
                stored: false,
            });
        }

        let pending = {
            let mut pending = self.inner.lock_pending();
            pending
                .entry(key.clone())
                .or_insert_with(|| {
                    let inner = Arc::clone(&self.inner);
                    let url = url.to_owned();
                    async move {
                        let resolved = inner.recheck_then_probe(&key, &url).await;
                        inner.lock_pending().remove(&key);
                        resolved
                    }
                    .boxed()
                    .shared()
                })
                .clone()
        };
        pending.await
    }

    /// Best-effort population of `urls` with the configured worker count.
    ///
    /// Returns how many ratios were newly cached.
    pub async fn warm(&self, urls: &[String]) -> usize {
        self.warm_with(urls, self.inner.settings.warm_concurrency)
            .await
    }

    /// Like [`Self::warm`] with an explicit worker count.
    ///
    /// URLs that already have a fresh entry, or that normalize to a key seen
    /// earlier in `urls`, are skipped.
    pub async fn warm_with(&self, urls: &[String], concurrency: usize) -> usize {
        let entries = self.inner.load_entries().await;
        let mut seen = HashSet::new();
        let targets: Vec<String> = urls
            .iter()
            .filter(|url| {
                normalize_image_key(url).is_some_and(|key| {
                    self.inner.fresh_ratio(&entries, &key).is_none() && seen.insert(key)
                })
            })
            .cloned()
            .collect();

        let requested = targets.len();
        let cached = stream::iter(targets)
            .map(|url| {
                let cache = self.clone();
                async move {
                    match normalize_image_key(&url) {
                        Some(key) => cache
                            .resolve(key, &url)
                            .await
                            .is_some_and(|resolved| resolved.stored),
                        None => false,
                    }
                }
            })
            .buffer_unordered(concurrency.max(1))
            .filter(|ok| futures::future::ready(*ok))
            .count()
            .await;

        tracing::info!(
            requested,
            cached,
            skipped = urls.len() - requested,
            "warmed aspect-ratio cache"
        );
        cached
    }

    /// Number of probes currently in flight.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.lock_pending().len()
    }
}

impl Inner {
    fn lock_pending(&self) -> MutexGuard<'_, HashMap<String, PendingProbe>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn fresh_ratio(&self, entries: &Entries, key: &str) -> Option<f64> {
        let entry = entries.get(key)?;
        let age = self.clock.now_ms().saturating_sub(entry.timestamp);
        (entry.is_usable() && age <= self.settings.ttl_ms).then_some(entry.ratio)
    }

    /// Reads the stored document; any failure reads as an empty cache.
    async fn load_entries(&self) -> Entries {
        match self.store.get(ASPECT_RATIO_KEY).await {
            Ok(Some(raw)) => parse_entries(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "aspect-ratio document unreadable; treating as empty");
                Entries::new()
            }),
            Ok(None) => Entries::new(),
            Err(e) => {
                tracing::warn!(error = %e, "aspect-ratio store unavailable; treating as empty");
                Entries::new()
            }
        }
    }

    /// Runs as the shared pending future. A probe that settled between the
    /// caller's read and its pending-map lookup has already persisted, so the
    /// document is read again before probing.
    async fn recheck_then_probe(&self, key: &str, url: &str) -> Option<Resolved> {
        let entries = self.load_entries().await;
        if let Some(ratio) = self.fresh_ratio(&entries, key) {
            return Some(Resolved {
                ratio,
                stored: false,
            });
        }
        self.probe_and_store(key, url).await
    }

    async fn probe_and_store(&self, key: &str, url: &str) -> Option<Resolved> {
        let size = match self.probe.probe(url).await {
            Ok(size) => size,
            Err(e) => {
                tracing::debug!(url, error = %e, "image size probe failed");
                return None;
            }
        };
        let Some(ratio) = size.ratio() else {
            tracing::debug!(url, width = size.width, height = size.height, "probe returned zero dimension");
            return None;
        };

        let entry = AspectRatioEntry {
            ratio,
            timestamp: self.clock.now_ms(),
        };
        let stored = self.persist(key, entry).await;
        Some(Resolved { ratio, stored })
    }

    /// Writes `entry` into the document. Returns whether the write landed.
    async fn persist(&self, key: &str, entry: AspectRatioEntry) -> bool {
        let _gate = self.write_gate.lock().await;

        let mut entries = match self.store.get(ASPECT_RATIO_KEY).await {
            Ok(Some(raw)) => parse_entries(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "aspect-ratio document unreadable; starting fresh");
                Entries::new()
            }),
            Ok(None) => Entries::new(),
            Err(e) => {
                tracing::warn!(key, error = %e, "aspect-ratio store unavailable; not caching");
                return false;
            }
        };

        entries.insert(key.to_owned(), entry);
        evict_oldest(&mut entries, self.settings.max_entries);

        let raw = match serde_json::to_string(&entries) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize aspect-ratio document");
                return false;
            }
        };
        match self.store.set(ASPECT_RATIO_KEY, raw).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to persist aspect-ratio document");
                false
            }
        }
    }
}

/// Parses the stored document, dropping entries that do not match
/// [`AspectRatioEntry`].
fn parse_entries(raw: &str) -> Result<Entries, serde_json::Error> {
    let values: BTreeMap<String, Value> = serde_json::from_str(raw)?;
    Ok(values
        .into_iter()
        .filter_map(|(key, value)| serde_json::from_value(value).ok().map(|entry| (key, entry)))
        .collect())
}

/// Once `entries` exceeds `max_entries`, drops the oldest tenth by timestamp
/// (or more, if that is not enough to get back under the cap).
fn evict_oldest(entries: &mut Entries, max_entries: usize) {
    let len = entries.len();
    if len <= max_entries {
        return;
    }
    let drop_count = (len / 10).max(len - max_entries).max(1);

    let mut by_age: Vec<(i64, String)> = entries
        .iter()
        .map(|(key, entry)| (entry.timestamp, key.clone()))
        .collect();
    by_age.sort();

    for (_, key) in by_age.into_iter().take(drop_count) {
        entries.remove(&key);
    }
    tracing::info!(
        evicted = drop_count,
        remaining = entries.len(),
        "evicted oldest aspect-ratio entries"
    );
}

#[cfg(test)]
#[path = "aspect_test.rs"]
mod tests;
