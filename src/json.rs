//! Typed JSON Decorator
//!
//! Presents a store of `T` values on top of any byte [`Store`], isolating a
//! logical table behind a key prefix.

use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::context::Context;
use crate::error::{Result, StoreError};
use crate::store::Store;

// == Json ==
/// Typed view over a byte store, namespaced by `prefix`.
///
/// With a non-empty prefix every key becomes `"<prefix>/<key>"`. An empty
/// prefix leaves keys untouched, for listing too.
pub struct Json<T, S> {
    underlying: S,
    prefix: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T, S> Json<T, S>
where
    T: Serialize + DeserializeOwned,
    S: Store,
{
    // == Constructor ==
    pub fn new(underlying: S, prefix: impl Into<String>) -> Self {
        Self {
            underlying,
            prefix: prefix.into(),
            _marker: PhantomData,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn underlying(&self) -> &S {
        &self.underlying
    }

    pub fn into_inner(self) -> S {
        self.underlying
    }

    fn full_key<'k>(&self, key: &'k str) -> Cow<'k, str> {
        if self.prefix.is_empty() {
            Cow::Borrowed(key)
        } else {
            Cow::Owned(format!("{}/{}", self.prefix, key))
        }
    }

    // == Get ==
    /// Reads and decodes a value.
    ///
    /// `NotFound` when the key is absent, `CantDecode` when the stored bytes
    /// are not a valid `T`.
    pub async fn get(&self, ctx: &Context, key: &str) -> Result<T> {
        let key = self.full_key(key);
        let data = self.underlying.get(ctx, &key).await?;

        serde_json::from_slice(&data).map_err(|source| StoreError::CantDecode {
            key: key.into_owned(),
            source,
        })
    }

    /// Like [`Json::get`], but an absent key is `Ok(None)`.
    pub async fn get_opt(&self, ctx: &Context, key: &str) -> Result<Option<T>> {
        match self.get(ctx, key).await {
            Ok(value) => Ok(Some(value)),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    // == Set ==
    /// Encodes and stores a value.
    pub async fn set(&self, ctx: &Context, key: &str, value: &T) -> Result<()> {
        let key = self.full_key(key);
        let data = serde_json::to_vec(value).map_err(|source| StoreError::CantEncode {
            key: key.to_string(),
            source,
        })?;

        self.underlying.set(ctx, &key, data).await
    }

    pub async fn delete(&self, ctx: &Context, key: &str) -> Result<()> {
        self.underlying.delete(ctx, &self.full_key(key)).await
    }

    pub async fn exists(&self, ctx: &Context, key: &str) -> Result<()> {
        self.underlying.exists(ctx, &self.full_key(key)).await
    }

    // == List ==
    /// Lists keys under `sub_prefix` in this namespace, relative to it.
    ///
    /// The search prefix is `"<prefix>/<sub_prefix>"` and that whole string
    /// is stripped from each result, so listing `"sub/"` yields `"a"` for
    /// the stored key `"<prefix>/sub/a"`.
    pub async fn list(&self, ctx: &Context, sub_prefix: &str) -> Result<Vec<String>> {
        let full_prefix = if self.prefix.is_empty() {
            sub_prefix.to_string()
        } else {
            format!("{}/{}", self.prefix, sub_prefix)
        };

        let keys = self.underlying.list(ctx, &full_prefix).await?;
        debug!(table = %self.prefix, prefix = %full_prefix, count = keys.len(), "list");

        Ok(keys
            .into_iter()
            .map(|k| match k.strip_prefix(full_prefix.as_str()) {
                Some(rest) => rest.to_string(),
                None => k,
            })
            .collect())
    }
}

impl<T, S: fmt::Debug> fmt::Debug for Json<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Json")
            .field("underlying", &self.underlying)
            .field("prefix", &self.prefix)
            .finish()
    }
}

impl<T, S: Clone> Clone for Json<T, S> {
    fn clone(&self) -> Self {
        Self {
            underlying: self.underlying.clone(),
            prefix: self.prefix.clone(),
            _marker: PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::store::MemoryStore;

    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    struct TestStruct {
        name: String,
        value: i64,
    }

    fn sample() -> TestStruct {
        TestStruct {
            name: "test".to_string(),
            value: 42,
        }
    }

    #[tokio::test]
    async fn test_json_set_stores_exact_bytes() {
        let ctx = Context::background();
        let raw = Arc::new(MemoryStore::new());
        let table: Json<TestStruct, _> = Json::new(Arc::clone(&raw), "testprefix");

        table.set(&ctx, "mykey", &sample()).await.unwrap();

        let bytes = raw.get(&ctx, "testprefix/mykey").await.unwrap();
        assert_eq!(bytes, br#"{"name":"test","value":42}"#);
    }

    #[tokio::test]
    async fn test_json_set_empty_struct() {
        let ctx = Context::background();
        let raw = Arc::new(MemoryStore::new());
        let table: Json<TestStruct, _> = Json::new(Arc::clone(&raw), "testprefix");

        table.set(&ctx, "empty", &TestStruct::default()).await.unwrap();

        let bytes = raw.get(&ctx, "testprefix/empty").await.unwrap();
        assert_eq!(bytes, br#"{"name":"","value":0}"#);
    }

    #[tokio::test]
    async fn test_json_empty_prefix_uses_bare_key() {
        let ctx = Context::background();
        let raw: MemoryStore = [("mykey", r#"{"name":"noprefix","value":99}"#)]
            .into_iter()
            .collect();
        let table: Json<TestStruct, _> = Json::new(raw, "");

        let got = table.get(&ctx, "mykey").await.unwrap();
        assert_eq!(got.name, "noprefix");
        assert_eq!(got.value, 99);
        assert!(table.exists(&ctx, "mykey").await.is_ok());

        table.delete(&ctx, "mykey").await.unwrap();
        assert!(table.underlying().is_empty().await);
    }

    #[tokio::test]
    async fn test_json_get_empty_object() {
        let ctx = Context::background();
        let raw: MemoryStore = [("testprefix/empty", "{}")].into_iter().collect();
        let table: Json<BTreeMap<String, i64>, _> = Json::new(raw, "testprefix");

        assert!(table.get(&ctx, "empty").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_json_invalid_bytes_cant_decode() {
        let ctx = Context::background();
        let raw: MemoryStore = [("testprefix/badjson", "not valid json")]
            .into_iter()
            .collect();
        let table: Json<TestStruct, _> = Json::new(raw, "testprefix");

        match table.get(&ctx, "badjson").await {
            Err(StoreError::CantDecode { key, .. }) => assert_eq!(key, "testprefix/badjson"),
            other => panic!("expected CantDecode, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_json_not_found_vs_get_opt() {
        let ctx = Context::background();
        let raw: MemoryStore = [("otherprefix/mykey", r#"{"name":"x","value":1}"#)]
            .into_iter()
            .collect();
        let table: Json<TestStruct, _> = Json::new(raw, "testprefix");

        assert!(matches!(
            table.get(&ctx, "mykey").await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            table.exists(&ctx, "mykey").await,
            Err(StoreError::NotFound(_))
        ));
        assert_eq!(table.get_opt(&ctx, "mykey").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_json_cant_encode() {
        let ctx = Context::background();
        // Non-string map keys have no JSON representation.
        let table: Json<BTreeMap<(u8, u8), String>, _> = Json::new(MemoryStore::new(), "t");
        let mut value = BTreeMap::new();
        value.insert((1, 2), "x".to_string());

        let result = table.set(&ctx, "k", &value).await;
        assert!(matches!(result, Err(StoreError::CantEncode { .. })));
        assert!(table.underlying().is_empty().await);
    }

    #[tokio::test]
    async fn test_json_list_strips_prefix() {
        let ctx = Context::background();
        let raw: MemoryStore = [
            ("testprefix/a", r#"{"name":"a","value":1}"#),
            ("testprefix/b", r#"{"name":"b","value":2}"#),
            ("testprefix/c", r#"{"name":"c","value":3}"#),
            ("otherprefix/x", r#"{"name":"x","value":4}"#),
        ]
        .into_iter()
        .collect();
        let table: Json<TestStruct, _> = Json::new(raw, "testprefix");

        let mut keys = table.list(&ctx, "").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_json_list_sub_prefix() {
        let ctx = Context::background();
        let raw: MemoryStore = [
            ("testprefix/sub/a", "{}"),
            ("testprefix/sub/b", "{}"),
            ("testprefix/other/x", "{}"),
        ]
        .into_iter()
        .collect();
        let table: Json<TestStruct, _> = Json::new(raw, "testprefix");

        let mut keys = table.list(&ctx, "sub/").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["a", "b"]);
        assert!(table.list(&ctx, "noprefix/").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_json_list_empty_prefix_has_no_leading_separator() {
        let ctx = Context::background();
        let raw: MemoryStore = [("sub/a", "{}"), ("sub/b", "{}"), ("other", "{}")]
            .into_iter()
            .collect();
        let table: Json<TestStruct, _> = Json::new(raw, "");

        let mut keys = table.list(&ctx, "sub/").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["a", "b"]);
    }
}
