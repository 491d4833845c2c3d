//! Database connection pool management.

use catalog_config::DatabaseConfig;
use catalog_core::{CatalogError, CatalogResult, HealthCheck, HealthStatus, Interface};
use async_trait::async_trait;
use shaku::Component;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, warn};

/// Interface for database pool operations.
///
/// This trait abstracts database pool functionality for dependency injection.
#[async_trait]
pub trait DatabasePoolInterface: Interface + Send + Sync {
    /// Returns a reference to the underlying PostgreSQL pool.
    fn inner(&self) -> &PgPool;

    /// Checks if the database connection is healthy.
    async fn ping(&self) -> CatalogResult<()>;

    /// Runs database migrations.
    async fn run_migrations(&self) -> CatalogResult<()>;

    /// Closes the database pool.
    async fn close(&self);
}

/// Database pool wrapper.
#[derive(Component, Clone)]
#[shaku(interface = DatabasePoolInterface)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Creates a new database pool from configuration.
    pub async fn new(config: &DatabaseConfig) -> CatalogResult<Self> {
        info!("Connecting to PostgreSQL database...");

        let pool = Self::options(config)
            .connect(&config.url)
            .await
            .map_err(|e| {
                warn!("Failed to connect to database: {}", e);
                CatalogError::Database(format!("Failed to connect: {e}"))
            })?;

        info!("PostgreSQL connection pool established");
        Ok(Self { pool })
    }

    /// Creates a pool that opens connections on first use.
    pub fn connect_lazy(config: &DatabaseConfig) -> CatalogResult<Self> {
        let pool = Self::options(config)
            .connect_lazy(&config.url)
            .map_err(|e| CatalogError::Configuration(format!("Invalid database URL: {e}")))?;
        Ok(Self { pool })
    }

    fn options(config: &DatabaseConfig) -> PgPoolOptions {
        PgPoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout())
            .idle_timeout(Some(config.idle_timeout()))
    }

    /// Wraps a pre-existing pool (for Shaku injection and tests).
    #[must_use]
    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a clone of the underlying pool handle.
    #[must_use]
    pub fn pg_pool(&self) -> PgPool {
        self.pool.clone()
    }
}

#[async_trait]
impl DatabasePoolInterface for DatabasePool {
    fn inner(&self) -> &PgPool {
        &self.pool
    }

    async fn ping(&self) -> CatalogResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| CatalogError::Database(format!("Health check failed: {e}")))?;
        Ok(())
    }

    async fn run_migrations(&self) -> CatalogResult<()> {
        info!("Running database migrations...");
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| CatalogError::Database(format!("Migration failed: {e}")))?;
        info!("Database migrations completed");
        Ok(())
    }

    async fn close(&self) {
        info!("Closing database connection pool...");
        self.pool.close().await;
        info!("Database connection pool closed");
    }
}

#[async_trait]
impl HealthCheck for DatabasePool {
    fn name(&self) -> &str {
        "database"
    }

    async fn check(&self) -> HealthStatus {
        match self.ping().await {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        }
    }
}

impl std::fmt::Debug for DatabasePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabasePool")
            .field("size", &self.pool.size())
            .field("num_idle", &self.pool.num_idle())
            .finish()
    }
}
