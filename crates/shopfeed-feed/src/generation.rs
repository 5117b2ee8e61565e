//! Request generations for discarding stale feed builds.
//!
//! Every new feed request takes a token. A result is applied only if its
//! token is still the newest one, so a slow build that finishes after a
//! newer request started cannot overwrite the newer result.

use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one request within a [`RequestGeneration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GenerationToken(u64);

impl GenerationToken {
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Monotonic request counter.
#[derive(Debug, Default)]
pub struct RequestGeneration {
    current: AtomicU64,
}

impl RequestGeneration {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new request, superseding every earlier token.
    pub fn begin(&self) -> GenerationToken {
        GenerationToken(self.current.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether `token` belongs to the most recently started request.
    #[must_use]
    pub fn is_current(&self, token: GenerationToken) -> bool {
        self.current.load(Ordering::SeqCst) == token.0
    }
}
