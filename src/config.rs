//! Configuration Module
//!
//! Chooses and assembles the raw store stack from environment variables.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::cache::{Lru, DEFAULT_CACHE_CAPACITY};
use crate::error::{Result, StoreError};
use crate::store::{BucketStore, MemoryStore, Store};

// == Backend Kind ==
/// Which raw backend to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// Process-local map, gone at exit
    Memory,
    /// Local directory acting as a bucket
    Directory,
    /// S3 bucket
    S3,
}

impl std::str::FromStr for Backend {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Backend::Memory),
            "directory" | "dir" | "local" => Ok(Backend::Directory),
            "s3" => Ok(Backend::S3),
            other => Err(StoreError::BadConfig(format!(
                "unknown store backend {:?}",
                other
            ))),
        }
    }
}

/// Store configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Raw backend to open
    pub backend: Backend,
    /// Root directory (the "bucket") for the directory backend
    pub root: Option<PathBuf>,
    /// Bucket name for the s3 backend
    pub bucket: Option<String>,
    /// LRU capacity in entries; 0 disables caching
    pub cache_entries: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `STORE_BACKEND` - `memory`, `directory` or `s3` (default: memory)
    /// - `STORE_ROOT` - Bucket directory for the directory backend
    /// - `STORE_BUCKET` - Bucket name for the s3 backend; credentials and
    ///   region come from the standard `AWS_*` variables
    /// - `STORE_CACHE_ENTRIES` - LRU capacity, 0 to disable (default: 512)
    ///
    /// Returns `BadConfig` for an unknown backend or unparseable capacity.
    pub fn from_env() -> Result<Self> {
        let backend = match env::var("STORE_BACKEND") {
            Ok(v) if !v.trim().is_empty() => v.parse()?,
            _ => Backend::Memory,
        };
        let root = env::var_os("STORE_ROOT")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        let bucket = env::var("STORE_BUCKET")
            .ok()
            .filter(|v| !v.trim().is_empty());
        let cache_entries = match env::var("STORE_CACHE_ENTRIES") {
            Ok(v) => v.trim().parse().map_err(|_| {
                StoreError::BadConfig(format!("STORE_CACHE_ENTRIES is not a number: {:?}", v))
            })?,
            Err(_) => DEFAULT_CACHE_CAPACITY,
        };

        let config = Self {
            backend,
            root,
            bucket,
            cache_entries,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks the combination of settings without touching the backend.
    pub fn validate(&self) -> Result<()> {
        match self.backend {
            Backend::Directory if self.root.is_none() => Err(StoreError::BadConfig(
                "directory backend needs STORE_ROOT".to_string(),
            )),
            Backend::S3 if self.bucket.is_none() => Err(StoreError::BadConfig(
                "s3 backend needs STORE_BUCKET".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Opens the configured backend, wrapped in an LRU cache unless
    /// `cache_entries` is 0.
    pub async fn open(&self) -> Result<Arc<dyn Store>> {
        let raw: Arc<dyn Store> = match self.backend {
            Backend::Memory => Arc::new(MemoryStore::new()),
            Backend::Directory => {
                let root = self.root.as_ref().ok_or_else(|| {
                    StoreError::BadConfig("directory backend needs STORE_ROOT".to_string())
                })?;
                Arc::new(BucketStore::local(root).await?)
            }
            Backend::S3 => {
                let bucket = self.bucket.as_deref().ok_or_else(|| {
                    StoreError::BadConfig("s3 backend needs STORE_BUCKET".to_string())
                })?;
                Arc::new(BucketStore::s3(bucket)?)
            }
        };

        info!(
            "Store opened: backend={}, cache_entries={}",
            raw.name(),
            self.cache_entries
        );

        if self.cache_entries == 0 {
            Ok(raw)
        } else {
            Ok(Arc::new(Lru::with_capacity(raw, self.cache_entries)))
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::Memory,
            root: None,
            bucket: None,
            cache_entries: DEFAULT_CACHE_CAPACITY,
        }
    }
}
