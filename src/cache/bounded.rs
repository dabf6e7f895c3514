//! Bounded Cache Module
//!
//! Fixed-capacity byte cache combining HashMap storage with LRU tracking.

use std::collections::HashMap;

use tracing::trace;

use crate::cache::{CacheStats, LruTracker};

// == Bounded Cache ==
/// Key to raw value cache that never holds more than `capacity` entries.
#[derive(Debug)]
pub(crate) struct BoundedCache {
    entries: HashMap<String, Vec<u8>>,
    lru: LruTracker,
    stats: CacheStats,
    capacity: usize,
}

impl BoundedCache {
    // == Constructor ==
    /// Creates an empty cache.
    ///
    /// # Panics
    /// If `capacity` is zero.
    pub(crate) fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "cache capacity must be at least 1");
        Self {
            entries: HashMap::with_capacity(capacity),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            capacity,
        }
    }

    // == Insert ==
    /// Stores or refreshes a value, making it the most recently used.
    ///
    /// A new key arriving at capacity evicts the least recently used entry.
    pub(crate) fn insert(&mut self, key: &str, value: Vec<u8>) {
        if !self.entries.contains_key(key) && self.entries.len() >= self.capacity {
            if let Some(evicted) = self.lru.evict_oldest() {
                trace!(driver = "lru", key = %evicted, "evicted");
                self.entries.remove(&evicted);
                self.stats.record_eviction();
            }
        }

        self.entries.insert(key.to_string(), value);
        self.lru.touch(key);
    }

    // == Get ==
    /// Returns a copy of the cached value and refreshes its recency.
    ///
    /// Counts a hit or a miss either way.
    pub(crate) fn get(&mut self, key: &str) -> Option<Vec<u8>> {
        match self.entries.get(key) {
            Some(value) => {
                let value = value.clone();
                self.stats.record_hit();
                self.lru.touch(key);
                Some(value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Returns the cached value without touching recency or stats.
    #[cfg(test)]
    pub(crate) fn peek(&self, key: &str) -> Option<&[u8]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    // == Remove ==
    /// Drops a key, returning whether it was cached.
    pub(crate) fn remove(&mut self, key: &str) -> bool {
        self.lru.remove(key);
        self.entries.remove(key).is_some()
    }

    // == Stats ==
    pub(crate) fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.total_entries = self.entries.len();
        stats
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
