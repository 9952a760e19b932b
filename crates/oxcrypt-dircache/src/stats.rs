//! Hit/miss and invalidation counters for the directory IV cache.
//!
//! Counters are lock-free atomics updated with relaxed ordering; they are
//! diagnostic only and never influence cache behavior.

use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics for one [`DirCache`](crate::DirCache).
#[derive(Debug, Default)]
pub struct CacheStats {
    /// Lookups answered from the cache (root lookups included).
    pub hits: AtomicU64,
    /// Lookups that missed, for any reason.
    pub misses: AtomicU64,
    /// Successful stores (root stores included).
    pub stores: AtomicU64,
    /// Stores dropped because an ancestor was not cached.
    pub dropped_stores: AtomicU64,
    /// Entries evicted to stay within the capacity bound.
    pub evictions: AtomicU64,
    /// Times the whole cache was discarded because its window elapsed.
    pub expirations: AtomicU64,
    /// Entries discarded by `remove`, `clear` or replacement of an ancestor.
    pub invalidations: AtomicU64,
}

impl CacheStats {
    /// Create new cache statistics.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_store(&self) {
        self.stores.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_dropped_store(&self) {
        self.dropped_stores.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_expiration(&self) {
        self.expirations.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_invalidations(&self, count: usize) {
        self.invalidations.fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Get the total number of cache hits.
    pub fn hit_count(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Get the total number of cache misses.
    pub fn miss_count(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Get the total number of evictions.
    pub fn eviction_count(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    /// Compute the cache hit rate as a fraction (0.0 to 1.0).
    ///
    /// Returns 0.0 if no lookups have been performed.
    pub fn hit_rate(&self) -> f64 {
        self.snapshot().hit_rate()
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        for counter in [
            &self.hits,
            &self.misses,
            &self.stores,
            &self.dropped_stores,
            &self.evictions,
            &self.expirations,
            &self.invalidations,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }

    /// Create a snapshot of current values.
    pub fn snapshot(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            stores: self.stores.load(Ordering::Relaxed),
            dropped_stores: self.dropped_stores.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
        }
    }
}

/// A serializable snapshot of cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CacheStatsSnapshot {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Number of successful stores.
    pub stores: u64,
    /// Number of dropped stores.
    pub dropped_stores: u64,
    /// Number of capacity evictions.
    pub evictions: u64,
    /// Number of whole-cache expirations.
    pub expirations: u64,
    /// Number of explicitly invalidated entries.
    pub invalidations: u64,
}

impl CacheStatsSnapshot {
    /// Compute the cache hit rate as a fraction (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
