//! Job queue abstraction.

use crate::error::{JobError, JobResult};
use crate::job::{Job, JobData, JobId};
use async_trait::async_trait;
use shaku::Interface;
use std::time::Duration;

/// What happened to a job after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOutcome {
    /// The job was put back on its pending list.
    Retried,
    /// The job was moved to the dead-letter list.
    DeadLettered,
}

/// Reliable job queue with at-least-once delivery.
///
/// A dequeued job stays in an in-flight list until it is completed or
/// failed, so a worker that dies mid-job does not lose it:
/// [`recover_stale`](JobQueue::recover_stale) puts it back once the
/// worker's heartbeat expires.
#[async_trait]
pub trait JobQueue: Interface + Send + Sync {
    /// Stores the envelope and appends it to its queue.
    async fn push(&self, job: JobData) -> JobResult<JobId>;

    /// Claims the next pending job for `worker_id`, if any.
    ///
    /// The returned envelope already has its attempt counter incremented.
    async fn dequeue(&self, queue: &str, worker_id: &str) -> JobResult<Option<JobData>>;

    /// Acknowledges a job and forgets it.
    async fn complete(&self, job: &JobData) -> JobResult<()>;

    /// Records a failed attempt and either re-queues or dead-letters the job.
    async fn fail(&self, job: &JobData, error: &JobError) -> JobResult<FailOutcome>;

    /// Re-queues in-flight jobs with no owner or whose owner has no live heartbeat.
    async fn recover_stale(&self, queue: &str) -> JobResult<u64>;

    /// Marks `worker_id` alive for `ttl`.
    async fn heartbeat(&self, worker_id: &str, ttl: Duration) -> JobResult<()>;

    /// Number of pending jobs.
    async fn queue_length(&self, queue: &str) -> JobResult<u64>;

    /// Number of dead-lettered jobs.
    async fn dead_letter_length(&self, queue: &str) -> JobResult<u64>;

    /// Checks connectivity to the backing store.
    async fn health_check(&self) -> JobResult<()>;
}

/// Typed helpers over any [`JobQueue`].
#[async_trait]
pub trait JobQueueExt {
    /// Wraps `job` in an envelope with its type defaults and pushes it.
    async fn enqueue<J: Job>(&self, job: &J) -> JobResult<JobId>;
}

#[async_trait]
impl<Q: JobQueue + ?Sized> JobQueueExt for Q {
    async fn enqueue<J: Job>(&self, job: &J) -> JobResult<JobId> {
        let data = JobData::new(job)?;
        self.push(data).await
    }
}
