//! Caching decorator over any [`Store`].

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, trace, warn};

use crate::cache::{BoundedCache, CacheStats, DEFAULT_CACHE_CAPACITY};
use crate::context::Context;
use crate::error::Result;
use crate::store::Store;

// == Lru ==
/// Write-through LRU cache in front of a slower store.
///
/// Reads are served from the cache when possible; writes update the cache
/// before the backend, so a failed backend write leaves the cache holding
/// the newer value. Existence checks and listings always go to the backend.
///
/// Each call locks the cache on its own. A miss-then-fill racing a `set` on
/// the same key may leave either value cached.
#[derive(Debug)]
pub struct Lru<S> {
    inner: S,
    cache: Mutex<BoundedCache>,
}

impl<S: Store> Lru<S> {
    /// Wraps `inner` with a cache of [`DEFAULT_CACHE_CAPACITY`] entries.
    pub fn new(inner: S) -> Self {
        Self::with_capacity(inner, DEFAULT_CACHE_CAPACITY)
    }

    /// Wraps `inner` with a cache of `capacity` entries.
    ///
    /// # Panics
    /// If `capacity` is zero.
    pub fn with_capacity(inner: S, capacity: usize) -> Self {
        debug!(driver = "lru", backend = inner.name(), capacity, "cache created");
        Self {
            inner,
            cache: Mutex::new(BoundedCache::new(capacity)),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    /// Snapshot of hit/miss/eviction counters.
    pub async fn stats(&self) -> CacheStats {
        self.cache.lock().await.stats()
    }
}

#[async_trait]
impl<S: Store> Store for Lru<S> {
    fn name(&self) -> &'static str {
        "lru"
    }

    async fn get(&self, ctx: &Context, key: &str) -> Result<Vec<u8>> {
        if let Some(value) = self.cache.lock().await.get(key) {
            trace!(driver = "lru", action = "cache_read", key);
            return Ok(value);
        }

        trace!(driver = "lru", action = "cache_load", key);
        let value = self.inner.get(ctx, key).await?;
        self.cache.lock().await.insert(key, value.clone());
        Ok(value)
    }

    async fn set(&self, ctx: &Context, key: &str, value: Vec<u8>) -> Result<()> {
        self.cache.lock().await.insert(key, value.clone());

        if let Err(err) = self.inner.set(ctx, key, value).await {
            warn!(driver = "lru", key, error = %err, "backend write failed, cache is ahead");
            return Err(err);
        }
        Ok(())
    }

    async fn delete(&self, ctx: &Context, key: &str) -> Result<()> {
        self.cache.lock().await.remove(key);
        self.inner.delete(ctx, key).await
    }

    async fn exists(&self, ctx: &Context, key: &str) -> Result<()> {
        self.inner.exists(ctx, key).await
    }

    async fn list(&self, ctx: &Context, prefix: &str) -> Result<Vec<String>> {
        self.inner.list(ctx, prefix).await
    }
}
