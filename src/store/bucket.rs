//! Bucket backend.
//!
//! Adapts any `object_store` implementation (a local directory, S3, or the
//! crate's in-memory store) to the byte-level [`Store`] contract.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::{Path, PathPart};
use object_store::ObjectStore;
use percent_encoding::percent_decode_str;
use tracing::{debug, warn};

use crate::context::Context;
use crate::error::{Result, StoreError};
use crate::store::Store;

/// Longest run of encoded key bytes kept in one path part. Local
/// filesystems cap file names at 255 bytes.
const MAX_PART_BYTES: usize = 200;

/// A part that is exactly this marks an empty key segment; a part ending
/// in it continues into the next part. Encoded segments only ever carry
/// `%` as the start of a `%XX` escape, so neither shape is ambiguous.
const MARK: &str = "%";

// == Bucket Store ==
/// Backend storing each key as one object in an object-store bucket.
#[derive(Debug, Clone)]
pub struct BucketStore {
    inner: Arc<dyn ObjectStore>,
    driver: &'static str,
}

impl BucketStore {
    // == Constructors ==
    /// Wraps an already built object store.
    pub fn new(inner: Arc<dyn ObjectStore>, driver: &'static str) -> Self {
        Self { inner, driver }
    }

    /// Opens a bucket rooted at an existing local directory.
    ///
    /// Returns `BadConfig` if `root` is missing or not a directory.
    pub async fn local(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        match tokio::fs::metadata(&root).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(StoreError::BadConfig(format!(
                    "{} is not a directory",
                    root.display()
                )))
            }
            Err(err) => {
                return Err(StoreError::BadConfig(format!(
                    "can't open {}: {}",
                    root.display(),
                    err
                )))
            }
        }

        let fs = LocalFileSystem::new_with_prefix(&root).map_err(|err| {
            StoreError::BadConfig(format!("local bucket {}: {}", root.display(), err))
        })?;
        debug!(driver = "local", root = %root.display(), "bucket opened");
        Ok(Self::new(Arc::new(fs), "local"))
    }

    /// Opens an S3 bucket. Region, endpoint and credentials come from the
    /// usual `AWS_*` environment variables.
    ///
    /// Returns `BadConfig` for an empty bucket name or a builder error.
    pub fn s3(bucket: &str) -> Result<Self> {
        if bucket.trim().is_empty() {
            return Err(StoreError::BadConfig("s3 bucket name is empty".to_string()));
        }
        let s3 = AmazonS3Builder::from_env()
            .with_bucket_name(bucket)
            .build()
            .map_err(|err| StoreError::BadConfig(format!("s3 bucket {:?}: {}", bucket, err)))?;
        debug!(driver = "s3", bucket, "bucket opened");
        Ok(Self::new(Arc::new(s3), "s3"))
    }

    /// A process-local bucket, mostly useful in tests.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemory::new()), "in-memory")
    }

    /// The wrapped object store.
    pub fn object_store(&self) -> &Arc<dyn ObjectStore> {
        &self.inner
    }

    // == Operations ==
    async fn read(&self, key: &str) -> Result<Vec<u8>> {
        let path = object_path(key)?;
        let found = self
            .inner
            .get(&path)
            .await
            .map_err(|err| classify("get", key, err))?;
        let bytes = found
            .bytes()
            .await
            .map_err(|err| classify("get", key, err))?;
        Ok(bytes.to_vec())
    }

    async fn write(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let path = object_path(key)?;
        self.inner
            .put(&path, value.into())
            .await
            .map_err(|err| StoreError::backend("set", key, err))?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = object_path(key)?;
        match self.inner.delete(&path).await {
            Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(err) => Err(StoreError::backend("delete", key, err)),
        }
    }

    async fn head(&self, key: &str) -> Result<()> {
        let path = object_path(key)?;
        self.inner
            .head(&path)
            .await
            .map_err(|err| classify("exists", key, err))?;
        Ok(())
    }

    async fn scan(&self, prefix: &str) -> Result<Vec<String>> {
        // Object stores list whole path segments, so start from the last
        // complete segment of the prefix and filter the rest here.
        let dir = match prefix.rsplit_once('/') {
            Some((dir, _)) => Some(object_path(dir)?),
            None => None,
        };

        let mut stream = self.inner.list(dir.as_ref());
        let mut keys = Vec::new();
        while let Some(meta) = stream.next().await {
            let meta = meta.map_err(|err| StoreError::backend("list", prefix, err))?;
            match key_for(&meta.location) {
                Some(key) if key.starts_with(prefix) => keys.push(key),
                Some(_) => {}
                None => warn!(
                    driver = self.driver,
                    location = %meta.location,
                    "skipping object whose name is not a store key"
                ),
            }
        }
        Ok(keys)
    }
}

#[async_trait]
impl Store for BucketStore {
    fn name(&self) -> &'static str {
        self.driver
    }

    async fn get(&self, ctx: &Context, key: &str) -> Result<Vec<u8>> {
        debug!(driver = self.driver, key, "get");
        ctx.run(self.read(key)).await
    }

    async fn set(&self, ctx: &Context, key: &str, value: Vec<u8>) -> Result<()> {
        debug!(driver = self.driver, key, len = value.len(), "set");
        ctx.run(self.write(key, value)).await
    }

    async fn delete(&self, ctx: &Context, key: &str) -> Result<()> {
        debug!(driver = self.driver, key, "delete");
        ctx.run(self.remove(key)).await
    }

    async fn exists(&self, ctx: &Context, key: &str) -> Result<()> {
        ctx.run(self.head(key)).await
    }

    async fn list(&self, ctx: &Context, prefix: &str) -> Result<Vec<String>> {
        let keys = ctx.run(self.scan(prefix)).await?;
        debug!(driver = self.driver, prefix, count = keys.len(), "list");
        Ok(keys)
    }
}

// == Key Mapping ==
/// Maps a key onto an object path, one `/`-separated segment at a time.
///
/// Ordinary keys like `discourse/123` map to themselves. Characters object
/// stores reject are percent-encoded by `PathPart`, empty segments become
/// [`MARK`], and long segments are split over several parts.
fn object_path(key: &str) -> Result<Path> {
    let mut parts: Vec<String> = Vec::new();
    for segment in key.split('/') {
        let encoded = PathPart::from(segment);
        let mut rest: &str = encoded.as_ref();
        if rest.is_empty() {
            parts.push(MARK.to_string());
            continue;
        }
        while rest.len() > MAX_PART_BYTES {
            let cut = part_end(rest);
            parts.push(format!("{}{}", &rest[..cut], MARK));
            rest = &rest[cut..];
        }
        parts.push(rest.to_string());
    }

    Path::parse(parts.join("/")).map_err(|_| StoreError::InvalidKey(key.to_string()))
}

/// Where to cut an over-long encoded segment without splitting an escape.
/// Encoded text is ASCII, so any byte offset is a char boundary.
fn part_end(encoded: &str) -> usize {
    let cut = MAX_PART_BYTES;
    match encoded[..cut].rfind('%') {
        Some(pos) if pos + 3 > cut => pos,
        _ => cut,
    }
}

/// Inverse of [`object_path`]. None for objects no key maps to.
fn key_for(location: &Path) -> Option<String> {
    let mut segments: Vec<String> = Vec::new();
    let mut pending = String::new();

    for part in location.parts() {
        let raw: &str = part.as_ref();
        if raw == MARK {
            if !pending.is_empty() {
                return None;
            }
            segments.push(String::new());
            continue;
        }
        match raw.strip_suffix(MARK) {
            Some(head) => pending.push_str(head),
            None => {
                pending.push_str(raw);
                let decoded = percent_decode_str(&pending).decode_utf8().ok()?;
                segments.push(decoded.into_owned());
                pending.clear();
            }
        }
    }

    if !pending.is_empty() || segments.is_empty() {
        return None;
    }
    Some(segments.join("/"))
}

/// `NotFound` from the object store means the key is absent.
fn classify(op: &'static str, key: &str, err: object_store::Error) -> StoreError {
    match err {
        object_store::Error::NotFound { .. } => StoreError::NotFound(key.to_string()),
        other => StoreError::backend(op, key, other),
    }
}
