//! Redis job queue implementation.

use super::RedisKeys;
use crate::error::{JobError, JobResult};
use crate::job::{JobData, JobId};
use crate::queue::{FailOutcome, JobQueue};
use async_trait::async_trait;
use catalog_core::{HealthCheck, HealthStatus};
use deadpool_redis::Pool;
use redis::AsyncCommands;
use redis::Script;
use shaku::Component;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Moves the oldest pending id to the processing list and records its owner.
///
/// KEYS: pending, processing, active. ARGV: worker id.
const CLAIM_SCRIPT: &str = r"
local id = redis.call('LMOVE', KEYS[1], KEYS[2], 'RIGHT', 'LEFT')
if id then
    redis.call('HSET', KEYS[3], id, ARGV[1])
end
return id
";

/// Puts an in-flight id back at the head of its pending list.
///
/// KEYS: processing, pending, active. ARGV: job id. Returns 1 when requeued.
const REQUEUE_SCRIPT: &str = r"
if redis.call('LREM', KEYS[1], 1, ARGV[1]) > 0 then
    redis.call('RPUSH', KEYS[2], ARGV[1])
    redis.call('HDEL', KEYS[3], ARGV[1])
    return 1
end
return 0
";

/// Redis-backed job queue.
///
/// Pending and in-flight ids live in Redis lists, envelopes in plain string
/// keys. Claiming and recovering an id run as Lua scripts, and every other
/// multi-key transition runs as a `MULTI` pipeline, so no crash leaves an id
/// outside both lists.
#[derive(Component)]
#[shaku(interface = JobQueue)]
pub struct RedisJobQueue {
    pool: Pool,
    keys: RedisKeys,
}

impl RedisJobQueue {
    /// Creates a queue with the default key prefix.
    #[must_use]
    pub fn new(pool: Pool) -> Self {
        Self::with_keys(pool, RedisKeys::default())
    }

    /// Creates a queue with a custom key layout.
    #[must_use]
    pub fn with_keys(pool: Pool, keys: RedisKeys) -> Self {
        Self { pool, keys }
    }

    /// Returns the key layout.
    #[must_use]
    pub const fn keys(&self) -> &RedisKeys {
        &self.keys
    }

    async fn conn(&self) -> JobResult<deadpool_redis::Connection> {
        Ok(self.pool.get().await?)
    }

    /// Moves an in-flight id to the dead-letter list and stores the envelope.
    async fn dead_letter(
        &self,
        conn: &mut deadpool_redis::Connection,
        job: &JobData,
    ) -> JobResult<()> {
        let id = job.id.as_str();
        let _: () = redis::pipe()
            .atomic()
            .set(self.keys.job(id), job.to_json()?)
            .ignore()
            .lrem(self.keys.processing(&job.queue), 1, id)
            .ignore()
            .lpush(self.keys.dlq(&job.queue), id)
            .ignore()
            .hdel(self.keys.active(), id)
            .ignore()
            .query_async(&mut **conn)
            .await?;

        warn!(
            job_id = %job.id,
            queue = %job.queue,
            attempts = job.attempt,
            error = job.last_error.as_deref().unwrap_or("-"),
            "Moved job to dead letter queue"
        );
        Ok(())
    }
}

#[async_trait]
impl JobQueue for RedisJobQueue {
    async fn push(&self, job: JobData) -> JobResult<JobId> {
        let mut conn = self.conn().await?;
        let id = job.id.clone();

        let _: () = redis::pipe()
            .atomic()
            .set(self.keys.job(id.as_str()), job.to_json()?)
            .ignore()
            .lpush(self.keys.queue(&job.queue), id.as_str())
            .ignore()
            .query_async(&mut *conn)
            .await?;

        debug!(job_id = %id, queue = %job.queue, name = %job.name, "Enqueued job");
        Ok(id)
    }

    async fn dequeue(&self, queue: &str, worker_id: &str) -> JobResult<Option<JobData>> {
        let mut conn = self.conn().await?;
        let processing_key = self.keys.processing(queue);

        let claimed: Option<String> = Script::new(CLAIM_SCRIPT)
            .key(self.keys.queue(queue))
            .key(&processing_key)
            .key(self.keys.active())
            .arg(worker_id)
            .invoke_async(&mut *conn)
            .await?;

        let Some(id) = claimed else {
            return Ok(None);
        };

        let envelope: Option<String> = conn.get(self.keys.job(&id)).await?;
        let Some(json) = envelope else {
            warn!(job_id = %id, queue = %queue, "Dropping id without envelope");
            let _: () = redis::pipe()
                .atomic()
                .lrem(&processing_key, 1, &id)
                .ignore()
                .hdel(self.keys.active(), &id)
                .ignore()
                .query_async(&mut *conn)
                .await?;
            return Ok(None);
        };

        let mut job = match JobData::from_json(&json) {
            Ok(job) => job,
            Err(e) => {
                error!(job_id = %id, queue = %queue, error = %e, "Unreadable job envelope");
                let _: () = redis::pipe()
                    .atomic()
                    .lrem(&processing_key, 1, &id)
                    .ignore()
                    .lpush(self.keys.dlq(queue), &id)
                    .ignore()
                    .hdel(self.keys.active(), &id)
                    .ignore()
                    .query_async(&mut *conn)
                    .await?;
                return Ok(None);
            }
        };

        job.increment_attempt();
        if job.attempt > job.max_attempts {
            job.last_error
                .get_or_insert_with(|| "delivery limit exceeded".to_string());
            self.dead_letter(&mut conn, &job).await?;
            return Ok(None);
        }

        let _: () = conn.set(self.keys.job(&id), job.to_json()?).await?;

        debug!(
            job_id = %job.id,
            queue = %queue,
            attempt = job.attempt,
            worker_id = %worker_id,
            "Dequeued job"
        );
        Ok(Some(job))
    }

    async fn complete(&self, job: &JobData) -> JobResult<()> {
        let mut conn = self.conn().await?;
        let id = job.id.as_str();

        let _: () = redis::pipe()
            .atomic()
            .lrem(self.keys.processing(&job.queue), 1, id)
            .ignore()
            .del(self.keys.job(id))
            .ignore()
            .hdel(self.keys.active(), id)
            .ignore()
            .query_async(&mut *conn)
            .await?;

        debug!(job_id = %job.id, queue = %job.queue, "Completed job");
        Ok(())
    }

    async fn fail(&self, job: &JobData, error: &JobError) -> JobResult<FailOutcome> {
        let mut conn = self.conn().await?;
        let mut job = job.clone();
        job.set_error(error);

        if job.is_exhausted() || !error.is_retryable() {
            self.dead_letter(&mut conn, &job).await?;
            return Ok(FailOutcome::DeadLettered);
        }

        let id = job.id.as_str();
        let _: () = redis::pipe()
            .atomic()
            .set(self.keys.job(id), job.to_json()?)
            .ignore()
            .lrem(self.keys.processing(&job.queue), 1, id)
            .ignore()
            .lpush(self.keys.queue(&job.queue), id)
            .ignore()
            .hdel(self.keys.active(), id)
            .ignore()
            .query_async(&mut *conn)
            .await?;

        debug!(
            job_id = %job.id,
            queue = %job.queue,
            attempt = job.attempt,
            max_attempts = job.max_attempts,
            "Re-queued job"
        );
        Ok(FailOutcome::Retried)
    }

    async fn recover_stale(&self, queue: &str) -> JobResult<u64> {
        let mut conn = self.conn().await?;
        let processing_key = self.keys.processing(queue);
        let in_flight: Vec<String> = conn.lrange(&processing_key, 0, -1).await?;

        let mut liveness: HashMap<String, bool> = HashMap::new();
        let mut recovered = 0u64;
        for job_id in in_flight {
            // Ids with no recorded owner are recovered too.
            let owner: Option<String> = conn.hget(self.keys.active(), &job_id).await?;
            if let Some(worker_id) = &owner {
                let alive = if let Some(&alive) = liveness.get(worker_id) {
                    alive
                } else {
                    let alive: bool = conn.exists(self.keys.worker(worker_id)).await?;
                    liveness.insert(worker_id.clone(), alive);
                    alive
                };
                if alive {
                    continue;
                }
            }

            let requeued: i64 = Script::new(REQUEUE_SCRIPT)
                .key(&processing_key)
                .key(self.keys.queue(queue))
                .key(self.keys.active())
                .arg(&job_id)
                .invoke_async(&mut *conn)
                .await?;
            if requeued > 0 {
                recovered += 1;
                warn!(
                    job_id = %job_id,
                    worker_id = owner.as_deref().unwrap_or("-"),
                    "Recovered in-flight job"
                );
            }
        }

        if recovered > 0 {
            info!(count = recovered, queue = %queue, "Recovered stale jobs");
        }
        Ok(recovered)
    }

    async fn heartbeat(&self, worker_id: &str, ttl: Duration) -> JobResult<()> {
        let mut conn = self.conn().await?;
        let _: () = conn
            .set_ex(self.keys.worker(worker_id), chrono::Utc::now().to_rfc3339(), ttl.as_secs().max(1))
            .await?;
        Ok(())
    }

    async fn queue_length(&self, queue: &str) -> JobResult<u64> {
        let mut conn = self.conn().await?;
        Ok(conn.llen(self.keys.queue(queue)).await?)
    }

    async fn dead_letter_length(&self, queue: &str) -> JobResult<u64> {
        let mut conn = self.conn().await?;
        Ok(conn.llen(self.keys.dlq(queue)).await?)
    }

    async fn health_check(&self) -> JobResult<()> {
        let mut conn = self.conn().await?;
        let _: String = redis::cmd("PING").query_async(&mut *conn).await?;
        Ok(())
    }
}

#[async_trait]
impl HealthCheck for RedisJobQueue {
    fn name(&self) -> &str {
        "queue"
    }

    async fn check(&self) -> HealthStatus {
        match self.health_check().await {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Degraded(e.to_string()),
        }
    }
}

impl std::fmt::Debug for RedisJobQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisJobQueue")
            .field("keys", &self.keys)
            .field("pool_size", &self.pool.status().size)
            .finish()
    }
}
