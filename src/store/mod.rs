//! Store Module
//!
//! The byte-oriented key-value contract and its concrete backends.

mod bucket;
mod memory;

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::Context;
use crate::error::Result;

pub use bucket::BucketStore;
pub use memory::MemoryStore;

// == Store Trait ==
/// A generic key-value storage interface over raw bytes.
///
/// Backends and decorators all implement this, so they compose by wrapping
/// one another.
#[async_trait]
pub trait Store: Send + Sync {
    /// A driver name for tracing and stats.
    ///
    /// # Example
    /// - "memory"
    /// - "local"
    /// - "s3"
    /// - "lru"
    fn name(&self) -> &'static str;

    /// Returns the value of a key, or `NotFound` if it is absent.
    async fn get(&self, ctx: &Context, key: &str) -> Result<Vec<u8>>;

    /// Creates or overwrites the value of a key.
    async fn set(&self, ctx: &Context, key: &str, value: Vec<u8>) -> Result<()>;

    /// Removes a key. Removing an absent key is not an error.
    async fn delete(&self, ctx: &Context, key: &str) -> Result<()>;

    /// Returns `Ok(())` if the key exists, `NotFound` if it does not.
    async fn exists(&self, ctx: &Context, key: &str) -> Result<()>;

    /// Lists every key starting with `prefix`, in no particular order.
    async fn list(&self, ctx: &Context, prefix: &str) -> Result<Vec<String>>;
}

#[async_trait]
impl<S: Store + ?Sized> Store for Arc<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn get(&self, ctx: &Context, key: &str) -> Result<Vec<u8>> {
        (**self).get(ctx, key).await
    }

    async fn set(&self, ctx: &Context, key: &str, value: Vec<u8>) -> Result<()> {
        (**self).set(ctx, key, value).await
    }

    async fn delete(&self, ctx: &Context, key: &str) -> Result<()> {
        (**self).delete(ctx, key).await
    }

    async fn exists(&self, ctx: &Context, key: &str) -> Result<()> {
        (**self).exists(ctx, key).await
    }

    async fn list(&self, ctx: &Context, prefix: &str) -> Result<Vec<String>> {
        (**self).list(ctx, prefix).await
    }
}

#[async_trait]
impl<S: Store + ?Sized> Store for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn get(&self, ctx: &Context, key: &str) -> Result<Vec<u8>> {
        (**self).get(ctx, key).await
    }

    async fn set(&self, ctx: &Context, key: &str, value: Vec<u8>) -> Result<()> {
        (**self).set(ctx, key, value).await
    }

    async fn delete(&self, ctx: &Context, key: &str) -> Result<()> {
        (**self).delete(ctx, key).await
    }

    async fn exists(&self, ctx: &Context, key: &str) -> Result<()> {
        (**self).exists(ctx, key).await
    }

    async fn list(&self, ctx: &Context, prefix: &str) -> Result<Vec<String>> {
        (**self).list(ctx, prefix).await
    }
}

// == Table Prefixes ==
/// Namespaces the glue pipelines keep in one physical store.
pub mod tables {
    /// Feed item URLs already posted to Discord
    pub const SEEN_URLS: &str = "seen-urls";
    /// Scraped forum topics
    pub const DISCOURSE: &str = "discourse";
    /// Cleaned-up question threads
    pub const DISCOURSE_THREAD: &str = "discourse-thread";
    /// Forum topic to Discord thread id
    pub const DISCORD_THREAD_MAPPING: &str = "discord-thread-mapping";
    /// Generated poster identities and avatars
    pub const DISCORD_GENERATED_USERNAMES: &str = "discord-generated-usernames";
}
