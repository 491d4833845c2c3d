//! Redis-based cache implementation.

use super::CacheInterface;
use catalog_core::{CatalogError, CatalogResult, HealthCheck, HealthStatus};
use async_trait::async_trait;
use deadpool_redis::{redis::AsyncCommands, Pool};
use shaku::Component;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Default upper bound for a single cache round trip.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_millis(500);

/// Redis-based cache service.
///
/// Without a pool the service is a no-op: reads miss and writes succeed.
#[derive(Component)]
#[shaku(interface = CacheInterface)]
pub struct RedisCacheService {
    /// Redis connection pool.
    pool: Option<Arc<Pool>>,
    /// Upper bound for one cache round trip, including pool checkout.
    #[shaku(default = DEFAULT_OPERATION_TIMEOUT)]
    operation_timeout: Duration,
}

impl RedisCacheService {
    /// Creates a new Redis cache service.
    #[must_use]
    pub fn new(pool: Arc<Pool>) -> Self {
        Self::with_timeout(pool, DEFAULT_OPERATION_TIMEOUT)
    }

    /// Creates a cache service with a custom operation timeout.
    #[must_use]
    pub fn with_timeout(pool: Arc<Pool>, operation_timeout: Duration) -> Self {
        Self {
            pool: Some(pool),
            operation_timeout,
        }
    }

    /// Creates a no-op cache service (for when Redis is disabled).
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            pool: None,
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    /// Gets a connection from the pool.
    async fn get_conn(&self) -> CatalogResult<deadpool_redis::Connection> {
        match &self.pool {
            Some(pool) => pool.get().await.map_err(|e| {
                CatalogError::Cache(format!("Failed to get Redis connection: {e}"))
            }),
            None => Err(CatalogError::Cache("Cache is disabled".to_string())),
        }
    }

    /// Runs one cache operation under the configured timeout.
    async fn bounded<T, F>(&self, op: &str, key: &str, fut: F) -> CatalogResult<T>
    where
        F: Future<Output = CatalogResult<T>> + Send,
    {
        tokio::time::timeout(self.operation_timeout, fut)
            .await
            .map_err(|_| {
                CatalogError::Timeout(format!(
                    "Cache {op} of key '{key}' exceeded {}ms",
                    self.operation_timeout.as_millis()
                ))
            })?
    }

    async fn ping(&self) -> CatalogResult<()> {
        self.bounded("ping", "-", async {
            let mut conn = self.get_conn().await?;
            let _: String = deadpool_redis::redis::cmd("PING")
                .query_async(&mut conn)
                .await
                .map_err(|e| CatalogError::Cache(format!("Ping failed: {e}")))?;
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl CacheInterface for RedisCacheService {
    fn is_enabled(&self) -> bool {
        self.pool.is_some()
    }

    async fn get_raw(&self, key: &str) -> CatalogResult<Option<String>> {
        if !self.is_enabled() {
            return Ok(None);
        }

        let value: Option<String> = self
            .bounded("get", key, async {
                let mut conn = self.get_conn().await?;
                conn.get::<_, Option<String>>(key).await.map_err(|e| {
                    CatalogError::Cache(format!("Failed to get key '{key}': {e}"))
                })
            })
            .await?;

        match &value {
            Some(_) => debug!("Cache hit for key '{}'", key),
            None => debug!("Cache miss for key '{}'", key),
        }

        Ok(value)
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> CatalogResult<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        let ttl_secs = ttl.as_secs().max(1);

        self.bounded("set", key, async {
            let mut conn = self.get_conn().await?;
            conn.set_ex::<_, _, ()>(key, value, ttl_secs)
                .await
                .map_err(|e| CatalogError::Cache(format!("Failed to set key '{key}': {e}")))
        })
        .await?;

        debug!("Cached key '{}' with TTL {}s", key, ttl_secs);
        Ok(())
    }

    async fn delete(&self, key: &str) -> CatalogResult<bool> {
        if !self.is_enabled() {
            return Ok(false);
        }

        let deleted: i64 = self
            .bounded("delete", key, async {
                let mut conn = self.get_conn().await?;
                conn.del::<_, i64>(key).await.map_err(|e| {
                    CatalogError::Cache(format!("Failed to delete key '{key}': {e}"))
                })
            })
            .await?;

        debug!("Deleted key '{}': {}", key, deleted > 0);
        Ok(deleted > 0)
    }
}

#[async_trait]
impl HealthCheck for RedisCacheService {
    fn name(&self) -> &str {
        "cache"
    }

    // The store stays authoritative, so a dead cache only degrades service.
    async fn check(&self) -> HealthStatus {
        if !self.is_enabled() {
            return HealthStatus::Degraded("cache disabled".to_string());
        }
        match self.ping().await {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Degraded(e.to_string()),
        }
    }
}

impl std::fmt::Debug for RedisCacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheService")
            .field("enabled", &self.is_enabled())
            .field("operation_timeout", &self.operation_timeout)
            .finish()
    }
}
