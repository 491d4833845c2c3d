//! Catalog Jobs - reliable task channel for image processing.
//!
//! A Redis-backed queue with at-least-once delivery:
//! - Typed job payloads wrapped in a [`JobData`] envelope
//! - A worker pool with bounded concurrency and per-job timeouts
//! - Bounded redelivery followed by a dead letter list
//! - Heartbeat-based recovery of jobs held by crashed workers
//!
//! # Architecture
//!
//! ```text
//!  API process                         Redis
//!  ┌────────────────┐   push    ┌──────────────────┐
//!  │ JobTaskPublisher│─────────▶│ queue:{name}     │ pending ids
//!  └────────────────┘           └────────┬─────────┘
//!                                        │ LMOVE
//!  image-processor                       ▼
//!  ┌────────────────┐  dequeue  ┌──────────────────┐
//!  │   WorkerPool   │◀──────────│ processing:{name}│ in-flight ids
//!  │  (N handlers)  │           └────────┬─────────┘
//!  └───────┬────────┘    complete │ fail │ recover_stale
//!          │                      ▼      ▼
//!          │                  (deleted)  queue:{name} again, or
//!          │                             dlq:{name} when exhausted
//!          ▼
//!   ProductService::process_product_images
//! ```

pub mod error;
pub mod job;
pub mod metrics;
pub mod process_images;
pub mod queue;
pub mod redis;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{JobError, JobResult};
pub use job::{Job, JobContext, JobData, JobId};
pub use metrics::{register_metrics, JobMetrics};
pub use process_images::{
    register_image_processing, JobTaskPublisher, JobTaskPublisherParameters, ProcessImagesJob,
};
pub use queue::{FailOutcome, JobQueue, JobQueueExt};
pub use self::redis::{build_pool, create_pool, RedisJobQueue, RedisJobQueueParameters, RedisKeys};
pub use worker::{JobHandler, WorkerPool, WorkerPoolConfig, WorkerPoolStats};
