//! Product-specific cache operations.

use super::{cache_keys, CacheExt, CacheInterface};
use catalog_config::CacheConfig;
use catalog_core::{CatalogError, Page, Product, ProductFilter, ProductId};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Expiration applied to product cache entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    /// TTL of single-product entries.
    pub product: Duration,
    /// TTL of list-page entries.
    pub list: Duration,
}

impl CacheTtls {
    /// One hour for products, thirty minutes for list pages.
    pub const DEFAULT: Self = Self {
        product: Duration::from_secs(3600),
        list: Duration::from_secs(1800),
    };
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<&CacheConfig> for CacheTtls {
    fn from(config: &CacheConfig) -> Self {
        Self {
            product: config.product_ttl(),
            list: config.list_ttl(),
        }
    }
}

/// Cached snapshot of one list page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedProductPage {
    pub products: Vec<Product>,
    pub total_count: i64,
}

impl From<Page<Product>> for CachedProductPage {
    fn from(page: Page<Product>) -> Self {
        Self {
            products: page.items,
            total_count: page.total_count,
        }
    }
}

impl From<CachedProductPage> for Page<Product> {
    fn from(cached: CachedProductPage) -> Self {
        Page::new(cached.products, cached.total_count)
    }
}

/// Best-effort product cache over any [`CacheInterface`].
///
/// Reads never fail: transport errors, timeouts and undecodable entries are
/// logged and reported as a miss. Writes and invalidations never fail either;
/// their errors are logged and dropped.
pub struct ProductCache<'a> {
    cache: &'a dyn CacheInterface,
    ttls: CacheTtls,
}

impl<'a> ProductCache<'a> {
    /// Wraps a cache backend.
    #[must_use]
    pub fn new(cache: &'a dyn CacheInterface, ttls: CacheTtls) -> Self {
        Self { cache, ttls }
    }

    /// Returns the cached product, if a readable entry exists.
    pub async fn get_product(&self, id: ProductId) -> Option<Product> {
        self.read(&cache_keys::product_by_id(id)).await
    }

    /// Stores a product snapshot.
    pub async fn set_product(&self, product: &Product) {
        let key = cache_keys::product_by_id(product.id);
        self.write(&key, product, self.ttls.product).await;
    }

    /// Returns the cached page for a filter, if a readable entry exists.
    pub async fn get_list(&self, filter: &ProductFilter) -> Option<Page<Product>> {
        self.read::<CachedProductPage>(&cache_keys::product_list(filter))
            .await
            .map(Page::from)
    }

    /// Stores a page snapshot for a filter.
    pub async fn set_list(&self, filter: &ProductFilter, page: &Page<Product>) {
        let key = cache_keys::product_list(filter);
        let snapshot = CachedProductPage {
            products: page.items.clone(),
            total_count: page.total_count,
        };
        self.write(&key, &snapshot, self.ttls.list).await;
    }

    /// Removes the single-product entry.
    pub async fn invalidate_product(&self, id: ProductId) {
        let key = cache_keys::product_by_id(id);
        if let Err(e) = self.cache.delete(&key).await {
            warn!(cache_key = %key, error = %e, "Failed to invalidate cache entry");
        }
    }

    async fn read<T>(&self, key: &str) -> Option<T>
    where
        T: serde::de::DeserializeOwned + Send,
    {
        match self.cache.get::<T>(key).await {
            Ok(Some(value)) => {
                debug!(cache_key = %key, "Cache hit");
                Some(value)
            }
            Ok(None) => {
                debug!(cache_key = %key, "Cache miss");
                None
            }
            Err(CatalogError::Serialization(e)) => {
                warn!(cache_key = %key, error = %e, "Discarding unreadable cache entry");
                if let Err(e) = self.cache.delete(key).await {
                    warn!(cache_key = %key, error = %e, "Failed to drop unreadable cache entry");
                }
                None
            }
            Err(e) => {
                warn!(cache_key = %key, error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    async fn write<T>(&self, key: &str, value: &T, ttl: Duration)
    where
        T: Serialize + Send + Sync,
    {
        if let Err(e) = self.cache.set(key, value, ttl).await {
            warn!(cache_key = %key, error = %e, "Failed to populate cache");
        }
    }
}

impl std::fmt::Debug for ProductCache<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductCache")
            .field("enabled", &self.cache.is_enabled())
            .field("ttls", &self.ttls)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::{CatalogResult, UserId};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MapCache {
        entries: Mutex<HashMap<String, (String, Duration)>>,
        broken: bool,
        undeletable: bool,
    }

    #[async_trait]
    impl CacheInterface for MapCache {
        async fn get_raw(&self, key: &str) -> CatalogResult<Option<String>> {
            if self.broken {
                return Err(CatalogError::cache("connection refused"));
            }
            Ok(self.entries.lock().unwrap().get(key).map(|(v, _)| v.clone()))
        }

        async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> CatalogResult<()> {
            if self.broken {
                return Err(CatalogError::cache("connection refused"));
            }
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), (value.to_string(), ttl));
            Ok(())
        }

        async fn delete(&self, key: &str) -> CatalogResult<bool> {
            if self.broken || self.undeletable {
                return Err(CatalogError::cache("connection refused"));
            }
            Ok(self.entries.lock().unwrap().remove(key).is_some())
        }

        fn is_enabled(&self) -> bool {
            true
        }
    }

    fn product(id: i64) -> Product {
        let now = Utc::now();
        Product {
            id: ProductId(id),
            user_id: UserId(1),
            product_name: format!("Product {id}"),
            product_description: None,
            product_price: 5.0,
            product_images: vec!["a.jpg".to_string()],
            compressed_product_images: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_product_round_trip_uses_product_ttl() {
        let backend = MapCache::default();
        let cache = ProductCache::new(&backend, CacheTtls::DEFAULT);
        let stored = product(1);

        assert_eq!(cache.get_product(ProductId(1)).await, None);
        cache.set_product(&stored).await;
        assert_eq!(cache.get_product(ProductId(1)).await, Some(stored));

        let ttl = backend.entries.lock().unwrap()["catalog:cache:product:1"].1;
        assert_eq!(ttl, Duration::from_secs(3600));
    }

    #[tokio::test]
    async fn test_list_round_trip_uses_list_ttl() {
        let backend = MapCache::default();
        let cache = ProductCache::new(&backend, CacheTtls::DEFAULT);
        let filter = ProductFilter::for_user(UserId(1));
        let page = Page::new(vec![product(1), product(2)], 12);

        cache.set_list(&filter, &page).await;
        let cached = cache.get_list(&filter).await.unwrap();
        assert_eq!(cached.total_count, 12);
        assert_eq!(cached.items.len(), 2);

        let key = cache_keys::product_list(&filter);
        let (raw, ttl) = backend.entries.lock().unwrap()[&key].clone();
        assert_eq!(ttl, Duration::from_secs(1800));
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(json.get("products").is_some());
        assert_eq!(json["total_count"], 12);
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_a_miss_and_is_dropped() {
        let backend = MapCache::default();
        backend.entries.lock().unwrap().insert(
            "catalog:cache:product:9".to_string(),
            ("{not json".to_string(), Duration::from_secs(1)),
        );
        let cache = ProductCache::new(&backend, CacheTtls::DEFAULT);

        assert_eq!(cache.get_product(ProductId(9)).await, None);
        assert!(backend.entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_a_miss_when_drop_fails() {
        let backend = MapCache {
            undeletable: true,
            ..MapCache::default()
        };
        backend.entries.lock().unwrap().insert(
            "catalog:cache:product:9".to_string(),
            ("{not json".to_string(), Duration::from_secs(1)),
        );
        let cache = ProductCache::new(&backend, CacheTtls::DEFAULT);

        assert_eq!(cache.get_product(ProductId(9)).await, None);
        assert_eq!(cache.get_product(ProductId(9)).await, None);
        assert_eq!(backend.entries.lock().unwrap().len(), 1);

        let stored = product(9);
        cache.set_product(&stored).await;
        assert_eq!(cache.get_product(ProductId(9)).await, Some(stored));
    }

    #[tokio::test]
    async fn test_broken_backend_never_fails() {
        let backend = MapCache {
            broken: true,
            ..MapCache::default()
        };
        let cache = ProductCache::new(&backend, CacheTtls::DEFAULT);

        assert_eq!(cache.get_product(ProductId(1)).await, None);
        cache.set_product(&product(1)).await;
        cache.invalidate_product(ProductId(1)).await;
        assert!(cache.get_list(&ProductFilter::for_user(UserId(1))).await.is_none());
    }

    #[tokio::test]
    async fn test_invalidate_missing_key_is_fine() {
        let backend = MapCache::default();
        let cache = ProductCache::new(&backend, CacheTtls::DEFAULT);
        cache.invalidate_product(ProductId(404)).await;
        assert!(backend.entries.lock().unwrap().is_empty());
    }

    #[test]
    fn test_ttls_from_config() {
        let config = CacheConfig {
            product_ttl_secs: 60,
            list_ttl_secs: 30,
            operation_timeout_ms: 100,
        };
        let ttls = CacheTtls::from(&config);
        assert_eq!(ttls.product, Duration::from_secs(60));
        assert_eq!(ttls.list, Duration::from_secs(30));
    }
}
