//! Cache Module
//!
//! Bounded LRU caching in front of a slower store.
//!
//! Only [`Lru`] and [`CacheStats`] are public; the bookkeeping behind them
//! is not:
//!
//! ```compile_fail
//! use glue_store::cache::BoundedCache;
//! ```

mod bounded;
mod layer;
mod lru;
mod stats;


// Re-export public types
pub(crate) use bounded::BoundedCache;
pub use layer::Lru;
pub(crate) use lru::LruTracker;
pub use stats::CacheStats;

// == Public Constants ==
/// Number of entries an [`Lru`] holds unless told otherwise
pub const DEFAULT_CACHE_CAPACITY: usize = 512;
