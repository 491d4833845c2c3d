//! Dependency injection module using Shaku.
//!
//! Both binaries resolve their services from [`CatalogModule`]. The API
//! serves requests through the product service; the image processor needs
//! the same graph because `process_product_images` touches the store and
//! the cache, and its jobs come from the same queue the API publishes to.

use catalog_config::AppConfig;
use catalog_core::{CatalogResult, HealthCheck};
use catalog_jobs::{
    build_pool, create_pool, JobQueue, JobTaskPublisher, JobTaskPublisherParameters,
    RedisJobQueue, RedisJobQueueParameters, RedisKeys,
};
use catalog_repository::{
    DatabasePool, DatabasePoolInterface, DatabasePoolParameters, PgProductRepository,
    ProductRepository,
};
use catalog_service::{
    CacheInterface, CacheTtls, PrefixImageCompressor, ProductService, ProductServiceComponent,
    ProductServiceComponentParameters, RedisCacheService, RedisCacheServiceParameters,
    TaskPublisher,
};
use deadpool_redis::Pool;
use shaku::{module, HasComponent};
use std::sync::Arc;
use tracing::info;

// ============================================================================
// Shaku Module Definition
// ============================================================================

module! {
    pub CatalogModule {
        components = [
            DatabasePool,
            PgProductRepository,
            RedisCacheService,
            PrefixImageCompressor,
            RedisJobQueue,
            JobTaskPublisher,
            ProductServiceComponent,
        ],
        providers = [],
    }
}

// ============================================================================
// Connections
// ============================================================================

/// External connections shared by the module and the readiness probes.
#[derive(Clone)]
pub struct Connections {
    /// PostgreSQL pool.
    pub database: DatabasePool,
    /// Redis pool backing both the cache and the job queue.
    pub redis: Pool,
}

impl Connections {
    /// Connects for the API process.
    ///
    /// The store must be reachable. Redis is connected lazily so the API
    /// starts, and serves from the store, while Redis is down.
    pub async fn for_api(config: &AppConfig) -> CatalogResult<Self> {
        let database = DatabasePool::new(&config.database).await?;
        let redis = build_pool(&config.redis)?;
        Ok(Self { database, redis })
    }

    /// Connects for the image processor. Both the store and Redis must answer.
    pub async fn for_worker(config: &AppConfig) -> CatalogResult<Self> {
        let database = DatabasePool::new(&config.database).await?;
        let redis = create_pool(&config.redis).await?;
        Ok(Self { database, redis })
    }

    fn cache_pool(&self, config: &AppConfig) -> Option<Arc<Pool>> {
        config.redis.enabled.then(|| Arc::new(self.redis.clone()))
    }
}

// ============================================================================
// Module Builder
// ============================================================================

/// Builds the module over already established connections.
pub fn build_module(config: &AppConfig, connections: &Connections) -> Arc<CatalogModule> {
    if !config.redis.enabled {
        info!("Redis caching disabled; reads go straight to the store");
    }

    let module = CatalogModule::builder()
        .with_component_parameters::<DatabasePool>(DatabasePoolParameters {
            pool: connections.database.pg_pool(),
        })
        .with_component_parameters::<RedisCacheService>(RedisCacheServiceParameters {
            pool: connections.cache_pool(config),
            operation_timeout: config.cache.operation_timeout(),
        })
        .with_component_parameters::<RedisJobQueue>(RedisJobQueueParameters {
            pool: connections.redis.clone(),
            keys: RedisKeys::new(config.jobs.key_prefix.clone()),
        })
        .with_component_parameters::<JobTaskPublisher>(JobTaskPublisherParameters {
            config: config.jobs.clone(),
        })
        .with_component_parameters::<ProductServiceComponent>(
            ProductServiceComponentParameters {
                cache_ttls: CacheTtls::from(&config.cache),
            },
        )
        .build();

    Arc::new(module)
}

/// Dependencies probed by `/ready`: the store, the cache and the queue.
pub fn readiness_checks(config: &AppConfig, connections: &Connections) -> Vec<Arc<dyn HealthCheck>> {
    let cache = match connections.cache_pool(config) {
        Some(pool) => RedisCacheService::with_timeout(pool, config.cache.operation_timeout()),
        None => RedisCacheService::disabled(),
    };
    let queue = RedisJobQueue::with_keys(
        connections.redis.clone(),
        RedisKeys::new(config.jobs.key_prefix.clone()),
    );

    vec![
        Arc::new(connections.database.clone()),
        Arc::new(cache),
        Arc::new(queue),
    ]
}

// ============================================================================
// Module Resolution Helpers
// ============================================================================

/// Resolves the services the binaries drive directly.
pub trait ServiceResolver {
    /// Resolves the product orchestrator.
    fn product_service(&self) -> Arc<dyn ProductService>;

    /// Resolves the job queue.
    fn job_queue(&self) -> Arc<dyn JobQueue>;

    /// Resolves the database pool.
    fn database_pool(&self) -> Arc<dyn DatabasePoolInterface>;
}

impl ServiceResolver for CatalogModule {
    fn product_service(&self) -> Arc<dyn ProductService> {
        self.resolve()
    }

    fn job_queue(&self) -> Arc<dyn JobQueue> {
        self.resolve()
    }

    fn database_pool(&self) -> Arc<dyn DatabasePoolInterface> {
        self.resolve()
    }
}
