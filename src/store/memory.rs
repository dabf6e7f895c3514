//! In-memory backend.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::context::Context;
use crate::error::{Result, StoreError};
use crate::store::Store;

// == Memory Store ==
/// Process-local backend holding every value in an ordered map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for MemoryStore
where
    K: Into<String>,
    V: Into<Vec<u8>>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let entries = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: RwLock::new(entries),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, ctx: &Context, key: &str) -> Result<Vec<u8>> {
        ctx.check()?;
        debug!(driver = "memory", key, "get");
        self.entries
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn set(&self, ctx: &Context, key: &str, value: Vec<u8>) -> Result<()> {
        ctx.check()?;
        debug!(driver = "memory", key, len = value.len(), "set");
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, ctx: &Context, key: &str) -> Result<()> {
        ctx.check()?;
        debug!(driver = "memory", key, "delete");
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn exists(&self, ctx: &Context, key: &str) -> Result<()> {
        ctx.check()?;
        if self.entries.read().await.contains_key(key) {
            Ok(())
        } else {
            Err(StoreError::NotFound(key.to_string()))
        }
    }

    async fn list(&self, ctx: &Context, prefix: &str) -> Result<Vec<String>> {
        ctx.check()?;
        let entries = self.entries.read().await;
        let keys: Vec<String> = entries
            .range(prefix.to_string()..)
            .map(|(k, _)| k)
            .take_while(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        debug!(driver = "memory", prefix, count = keys.len(), "list");
        Ok(keys)
    }
}
