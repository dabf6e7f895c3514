//! Glue Store - typed, cached key-value storage for glue pipelines
//!
//! A byte-level [`Store`] contract with concrete backends, a write-through
//! [`Lru`] cache decorator and a typed [`Json`] decorator that namespaces
//! keys by table prefix. Layers compose by wrapping:
//!
//! ```ignore
//! let raw = Arc::new(Lru::new(BucketStore::local("/var/lib/glue").await?));
//! let seen: Json<String, _> = Json::new(Arc::clone(&raw), tables::SEEN_URLS);
//! ```

pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod json;
pub mod store;

pub use cache::{CacheStats, Lru, DEFAULT_CACHE_CAPACITY};
pub use config::Config;
pub use context::Context;
pub use error::{Result, StoreError};
pub use json::Json;
pub use store::{tables, BucketStore, MemoryStore, Store};
