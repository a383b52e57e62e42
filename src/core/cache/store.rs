//! Bounded TTL response cache
//!
//! DashMap-backed store with an insertion-order queue for eviction. Expired
//! entries are dropped lazily on lookup; capacity overflow evicts
//! oldest-first down to the low watermark so eviction cost is amortized
//! instead of paid on every insert.

use super::types::{AtomicCacheStats, CacheEntry, CacheKey, CacheStats};
use crate::config::models::CacheConfig;
use crate::core::types::responses::StandardResponse;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tracing::debug;

/// Concurrency-safe key→response store
pub struct ResponseCache {
    entries: DashMap<CacheKey, CacheEntry>,
    insertion_order: Mutex<VecDeque<CacheKey>>,
    capacity: usize,
    low_watermark: usize,
    stats: AtomicCacheStats,
}

impl ResponseCache {
    /// Create a cache from configuration
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: DashMap::new(),
            insertion_order: Mutex::new(VecDeque::with_capacity(config.capacity)),
            capacity: config.capacity,
            low_watermark: config.low_watermark,
            stats: AtomicCacheStats::default(),
        }
    }

    /// Look up a response. Expired entries are removed and count as misses.
    pub fn get(&self, key: &CacheKey) -> Option<StandardResponse> {
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                let value = entry.value.clone();
                drop(entry);
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                Some(value)
            }
            Some(entry) => {
                drop(entry);
                self.entries.remove(key);
                self.stats.expirations.fetch_add(1, Ordering::Relaxed);
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            None => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store a response under `key` with the supplied TTL. Overwrites
    /// replace the entry wholesale, last writer wins.
    pub fn put(&self, key: CacheKey, value: StandardResponse, ttl: Duration) {
        let replaced = self
            .entries
            .insert(key, CacheEntry::new(value, ttl))
            .is_some();

        if !replaced {
            // A replaced key keeps its original queue position; pushing it
            // again would make eviction remove the fresh entry early.
            self.insertion_order.lock().push_back(key);
        }

        if self.entries.len() > self.capacity {
            self.evict_to_watermark();
        }
    }

    fn evict_to_watermark(&self) {
        let mut order = self.insertion_order.lock();
        let mut evicted = 0u64;

        while self.entries.len() > self.low_watermark {
            let Some(key) = order.pop_front() else {
                break;
            };
            if self.entries.remove(&key).is_some() {
                evicted += 1;
            }
        }

        if evicted > 0 {
            self.stats.evictions.fetch_add(evicted, Ordering::Relaxed);
            debug!(evicted, remaining = self.entries.len(), "cache eviction pass");
        }
    }

    /// Number of live entries (expired-but-unswept entries included)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Counter snapshot
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries.clear();
        self.insertion_order.lock().clear();
    }
}
