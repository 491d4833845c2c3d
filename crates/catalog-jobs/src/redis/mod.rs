//! Redis-backed job queue implementation.

mod queue;

pub use queue::{RedisJobQueue, RedisJobQueueParameters};

use crate::error::{JobError, JobResult};
use catalog_config::RedisConfig;
use deadpool_redis::{Config, Pool, Runtime};
use tracing::info;

/// Default prefix for every job key.
pub const DEFAULT_KEY_PREFIX: &str = "catalog:jobs";

/// Builds a Redis connection pool without connecting.
///
/// Connections are opened on first use, so a Redis outage at startup only
/// surfaces once the pool is used.
pub fn build_pool(config: &RedisConfig) -> JobResult<Pool> {
    Config::from_url(&config.url)
        .builder()
        .map_err(|e| JobError::Configuration(format!("Invalid Redis config: {e}")))?
        .max_size(config.pool_size)
        .runtime(Runtime::Tokio1)
        .build()
        .map_err(|e| JobError::Configuration(format!("Failed to create pool: {e}")))
}

/// Creates a Redis connection pool and verifies it with a `PING`.
pub async fn create_pool(config: &RedisConfig) -> JobResult<Pool> {
    info!("Creating Redis connection pool for job queue...");

    let pool = build_pool(config)?;
    let mut conn = pool.get().await?;
    redis::cmd("PING").query_async::<String>(&mut *conn).await?;

    info!("Redis connection pool created successfully");

    Ok(pool)
}

/// Redis key builder for the job queue.
#[derive(Debug, Clone)]
pub struct RedisKeys {
    prefix: String,
}

impl RedisKeys {
    /// Creates a key builder with the given prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Envelope of one job (string).
    #[must_use]
    pub fn job(&self, job_id: &str) -> String {
        format!("{}:job:{}", self.prefix, job_id)
    }

    /// Pending ids of a queue (list, consumed from the right).
    #[must_use]
    pub fn queue(&self, queue_name: &str) -> String {
        format!("{}:queue:{}", self.prefix, queue_name)
    }

    /// In-flight ids of a queue (list).
    #[must_use]
    pub fn processing(&self, queue_name: &str) -> String {
        format!("{}:processing:{}", self.prefix, queue_name)
    }

    /// Dead-lettered ids of a queue (list).
    #[must_use]
    pub fn dlq(&self, queue_name: &str) -> String {
        format!("{}:dlq:{}", self.prefix, queue_name)
    }

    /// Owner of each in-flight job (hash: job id -> worker id).
    #[must_use]
    pub fn active(&self) -> String {
        format!("{}:active", self.prefix)
    }

    /// Worker heartbeat key.
    #[must_use]
    pub fn worker(&self, worker_id: &str) -> String {
        format!("{}:worker:{}", self.prefix, worker_id)
    }
}

impl Default for RedisKeys {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_PREFIX)
    }
}
