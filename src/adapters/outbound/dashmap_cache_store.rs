//! DashMap Cache Store
//!
//! Implements CacheStore using DashMap for per-entry concurrent access.
//! Reads lazily evict entries past the max-stale bound; a background
//! sweep reclaims the rest.

use crate::domain::entities::CacheEntry;
use crate::domain::ports::CacheStore;
use crate::domain::value_objects::CacheKey;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// DashMap-backed response cache with a hard max-stale bound.
pub struct DashMapCacheStore {
    entries: Arc<DashMap<CacheKey, CacheEntry>>,
    /// Entries older than this are treated as absent, TTL or not
    max_stale: Duration,
}

impl DashMapCacheStore {
    pub fn new(max_stale: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            max_stale,
        }
    }

    /// Start the background sweep task removing entries past the
    /// max-stale bound.
    pub fn start_sweep(&self, interval: Duration) {
        let entries = self.entries.clone();
        let max_stale = self.max_stale;

        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                let removed = Self::sweep_entries(&entries, max_stale);
                if removed > 0 {
                    tracing::debug!("cache sweep removed {} expired entries", removed);
                }
            }
        });
    }

    fn sweep_entries(entries: &DashMap<CacheKey, CacheEntry>, max_stale: Duration) -> usize {
        let now = Instant::now();
        let mut to_remove = Vec::new();

        for entry in entries.iter() {
            if entry.value().age_at(now) > max_stale {
                to_remove.push(entry.key().clone());
            }
        }

        let count = to_remove.len();
        for key in to_remove {
            entries.remove(&key);
        }

        count
    }
}

#[async_trait]
impl CacheStore for DashMapCacheStore {
    async fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        let now = Instant::now();

        // Read guard must drop before the remove below touches the shard.
        match self.entries.get(key) {
            Some(entry) if entry.age_at(now) > self.max_stale => {}
            Some(entry) => return Some(entry.value().clone()),
            None => return None,
        }

        // Lazy eviction of an entry past the max-stale bound.
        self.entries.remove(key);
        None
    }

    async fn put(&self, entry: CacheEntry) {
        self.entries.insert(entry.key.clone(), entry);
    }

    async fn sweep(&self) -> usize {
        Self::sweep_entries(&self.entries, self.max_stale)
    }

    async fn count(&self) -> usize {
        self.entries.len()
    }
}
