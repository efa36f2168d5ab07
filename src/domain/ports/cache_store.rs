//! Cache Store Port
//!
//! Defines the interface for the response cache. Implementations hold
//! one live entry per key (last write wins) and enforce the hard
//! max-stale bound on reads, so the router never sees arbitrarily old
//! data. Whether a route is cacheable is the router's decision, never
//! the store's.

use crate::domain::entities::CacheEntry;
use crate::domain::value_objects::CacheKey;
use async_trait::async_trait;

/// Key/value store mapping a request signature to a cached response.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Get the entry for a key.
    ///
    /// Returns `None` when no entry exists or when the entry is older
    /// than the store's max-stale bound (lazy eviction), regardless of
    /// its TTL. Entries past their TTL but within the bound are still
    /// returned; the caller decides what staleness means.
    async fn get(&self, key: &CacheKey) -> Option<CacheEntry>;

    /// Insert or overwrite the entry for the entry's key.
    async fn put(&self, entry: CacheEntry);

    /// Remove entries older than the max-stale bound. Returns how many
    /// were removed.
    async fn sweep(&self) -> usize;

    /// Number of live entries.
    async fn count(&self) -> usize;
}
