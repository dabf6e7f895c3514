//! Cache Statistics Module
//!
//! Tracks how often the LRU layer saves a trip to the backend.

use serde::Serialize;

// == Cache Stats ==
/// Snapshot of the caching decorator's counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Reads served from the cache (`cache_read`)
    pub hits: u64,
    /// Reads that fell through to the backend (`cache_load`)
    pub misses: u64,
    /// Entries dropped to stay within capacity
    pub evictions: u64,
    /// Current number of cached entries
    pub total_entries: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 before any read.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub(crate) fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub(crate) fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub(crate) fn record_eviction(&mut self) {
        self.evictions += 1;
    }
}
