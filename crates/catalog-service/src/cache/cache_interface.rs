//! Cache interface trait for abstracted caching operations.

use catalog_core::CatalogResult;
use async_trait::async_trait;
use shaku::Interface;
use std::time::Duration;

/// Cache interface for storing and retrieving serialized snapshots.
///
/// Values are JSON strings so the trait stays dyn-compatible.
#[async_trait]
pub trait CacheInterface: Interface + Send + Sync {
    /// Gets a raw JSON value from the cache.
    ///
    /// Returns `None` if the key doesn't exist or has expired.
    async fn get_raw(&self, key: &str) -> CatalogResult<Option<String>>;

    /// Sets a raw JSON value in the cache with a TTL.
    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> CatalogResult<()>;

    /// Deletes a value from the cache.
    ///
    /// Returns `true` if the key existed. A missing key is not an error.
    async fn delete(&self, key: &str) -> CatalogResult<bool>;

    /// Checks if caching is enabled.
    fn is_enabled(&self) -> bool;
}

/// Extension trait with typed methods for convenience.
#[async_trait]
pub trait CacheExt: CacheInterface {
    /// Gets a typed value from the cache.
    ///
    /// A stored value that does not decode as `T` yields a serialization error.
    async fn get<T: serde::de::DeserializeOwned + Send>(&self, key: &str) -> CatalogResult<Option<T>> {
        match self.get_raw(key).await? {
            Some(json) => {
                let value: T = serde_json::from_str(&json)?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Sets a typed value in the cache.
    async fn set<T: serde::Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> CatalogResult<()> {
        let json = serde_json::to_string(value)?;
        self.set_raw(key, &json, ttl).await
    }
}

impl<T: CacheInterface + ?Sized> CacheExt for T {}
