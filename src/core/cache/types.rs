//! Cache key and entry types

use crate::core::classifier::QueryCategory;
use crate::core::types::requests::RequestMode;
use crate::core::types::responses::StandardResponse;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Deterministic cache key.
///
/// Derived from (user id, category, normalized message, mode, context flag)
/// so identical repeated questions from the same user hit the cache while
/// unrelated users can never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey([u8; 32]);

impl CacheKey {
    /// Derive the key for a request
    pub fn derive(
        user_id: &str,
        category: QueryCategory,
        message: &str,
        mode: RequestMode,
        include_context: bool,
    ) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(user_id.as_bytes());
        hasher.update([0x1f]);
        hasher.update(category.as_str().as_bytes());
        hasher.update([0x1f]);
        hasher.update(normalize(message).as_bytes());
        hasher.update([0x1f]);
        hasher.update(mode.as_str().as_bytes());
        hasher.update([0x1f]);
        hasher.update([u8::from(include_context)]);
        Self(hasher.finalize().into())
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // First 8 bytes are plenty for log correlation
        write!(f, "{}", hex::encode(&self.0[..8]))
    }
}

/// Lowercase, trim, and collapse runs of whitespace so trivially restated
/// questions share a key.
fn normalize(message: &str) -> String {
    message
        .split_whitespace()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// One cached response. Immutable; replaced wholesale on overwrite.
#[derive(Debug, Clone)]
pub(super) struct CacheEntry {
    pub(super) value: StandardResponse,
    created_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    pub(super) fn new(value: StandardResponse, ttl: Duration) -> Self {
        Self {
            value,
            created_at: Instant::now(),
            ttl,
        }
    }

    pub(super) fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.ttl
    }
}

/// Lock-free cache counters
#[derive(Debug, Default)]
pub(super) struct AtomicCacheStats {
    pub(super) hits: AtomicU64,
    pub(super) misses: AtomicU64,
    pub(super) evictions: AtomicU64,
    pub(super) expirations: AtomicU64,
}

impl AtomicCacheStats {
    pub(super) fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups that returned a live entry
    pub hits: u64,
    /// Lookups that found nothing
    pub misses: u64,
    /// Entries removed under capacity pressure
    pub evictions: u64,
    /// Entries dropped because their TTL had elapsed
    pub expirations: u64,
}
