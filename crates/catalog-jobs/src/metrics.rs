//! Job queue metrics.
//!
//! Recorded through the `metrics` facade; the binary decides whether an
//! exporter is installed.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use std::time::Duration;

/// Metric names for the job queue.
pub mod names {
    /// Total jobs enqueued.
    pub const JOBS_ENQUEUED_TOTAL: &str = "catalog_jobs_enqueued_total";
    /// Total jobs dequeued for processing.
    pub const JOBS_DEQUEUED_TOTAL: &str = "catalog_jobs_dequeued_total";
    /// Total jobs completed successfully.
    pub const JOBS_COMPLETED_TOTAL: &str = "catalog_jobs_completed_total";
    /// Total failed attempts.
    pub const JOBS_FAILED_TOTAL: &str = "catalog_jobs_failed_total";
    /// Total jobs put back for another attempt.
    pub const JOBS_RETRIED_TOTAL: &str = "catalog_jobs_retried_total";
    /// Total jobs sent to the dead letter list.
    pub const JOBS_DEAD_LETTERED_TOTAL: &str = "catalog_jobs_dead_lettered_total";
    /// Total attempts that hit the job timeout.
    pub const JOBS_TIMED_OUT_TOTAL: &str = "catalog_jobs_timed_out_total";
    /// Total in-flight jobs recovered from dead workers.
    pub const JOBS_RECOVERED_TOTAL: &str = "catalog_jobs_recovered_total";

    /// Current pending jobs.
    pub const JOBS_PENDING: &str = "catalog_jobs_pending";
    /// Current dead letter list size.
    pub const JOBS_DEAD_LETTER: &str = "catalog_jobs_dead_letter";

    /// Job execution duration in seconds.
    pub const JOB_DURATION_SECONDS: &str = "catalog_job_duration_seconds";
}

/// Registers all metric descriptions.
pub fn register_metrics() {
    describe_counter!(names::JOBS_ENQUEUED_TOTAL, "Total number of jobs enqueued");
    describe_counter!(
        names::JOBS_DEQUEUED_TOTAL,
        "Total number of jobs dequeued for processing"
    );
    describe_counter!(
        names::JOBS_COMPLETED_TOTAL,
        "Total number of jobs completed successfully"
    );
    describe_counter!(names::JOBS_FAILED_TOTAL, "Total number of failed job attempts");
    describe_counter!(names::JOBS_RETRIED_TOTAL, "Total number of job retries");
    describe_counter!(
        names::JOBS_DEAD_LETTERED_TOTAL,
        "Total number of jobs sent to the dead letter queue"
    );
    describe_counter!(
        names::JOBS_TIMED_OUT_TOTAL,
        "Total number of job attempts that timed out"
    );
    describe_counter!(
        names::JOBS_RECOVERED_TOTAL,
        "Total number of jobs recovered from dead workers"
    );

    describe_gauge!(names::JOBS_PENDING, "Current number of pending jobs");
    describe_gauge!(names::JOBS_DEAD_LETTER, "Current size of the dead letter queue");

    describe_histogram!(
        names::JOB_DURATION_SECONDS,
        "Job execution duration in seconds"
    );
}

/// Job metrics recorder.
#[derive(Clone, Copy, Debug)]
pub struct JobMetrics;

impl JobMetrics {
    /// Records a job enqueued.
    pub fn job_enqueued(queue: &str, job_name: &str) {
        counter!(
            names::JOBS_ENQUEUED_TOTAL,
            "queue" => queue.to_string(),
            "job_name" => job_name.to_string()
        )
        .increment(1);
    }

    /// Records a job dequeued.
    pub fn job_dequeued(queue: &str, job_name: &str) {
        counter!(
            names::JOBS_DEQUEUED_TOTAL,
            "queue" => queue.to_string(),
            "job_name" => job_name.to_string()
        )
        .increment(1);
    }

    /// Records a successful attempt.
    pub fn job_completed(queue: &str, job_name: &str, duration: Duration) {
        counter!(
            names::JOBS_COMPLETED_TOTAL,
            "queue" => queue.to_string(),
            "job_name" => job_name.to_string()
        )
        .increment(1);

        histogram!(
            names::JOB_DURATION_SECONDS,
            "queue" => queue.to_string(),
            "job_name" => job_name.to_string(),
            "status" => "completed"
        )
        .record(duration.as_secs_f64());
    }

    /// Records a failed attempt.
    pub fn job_failed(queue: &str, job_name: &str, error_type: &'static str, duration: Duration) {
        counter!(
            names::JOBS_FAILED_TOTAL,
            "queue" => queue.to_string(),
            "job_name" => job_name.to_string(),
            "error_type" => error_type
        )
        .increment(1);

        histogram!(
            names::JOB_DURATION_SECONDS,
            "queue" => queue.to_string(),
            "job_name" => job_name.to_string(),
            "status" => "failed"
        )
        .record(duration.as_secs_f64());
    }

    /// Records a job put back for another attempt.
    pub fn job_retried(queue: &str, job_name: &str, attempt: u32) {
        counter!(
            names::JOBS_RETRIED_TOTAL,
            "queue" => queue.to_string(),
            "job_name" => job_name.to_string(),
            "attempt" => attempt.to_string()
        )
        .increment(1);
    }

    /// Records a job moved to the dead letter list.
    pub fn job_dead_lettered(queue: &str, job_name: &str) {
        counter!(
            names::JOBS_DEAD_LETTERED_TOTAL,
            "queue" => queue.to_string(),
            "job_name" => job_name.to_string()
        )
        .increment(1);
    }

    /// Records an attempt that hit the timeout.
    pub fn job_timed_out(queue: &str, job_name: &str) {
        counter!(
            names::JOBS_TIMED_OUT_TOTAL,
            "queue" => queue.to_string(),
            "job_name" => job_name.to_string()
        )
        .increment(1);
    }

    /// Records jobs recovered from dead workers.
    pub fn jobs_recovered(queue: &str, count: u64) {
        counter!(names::JOBS_RECOVERED_TOTAL, "queue" => queue.to_string()).increment(count);
    }

    /// Updates the queue size gauges.
    pub fn update_queue_sizes(queue: &str, pending: u64, dead_letter: u64) {
        gauge!(names::JOBS_PENDING, "queue" => queue.to_string()).set(pending as f64);
        gauge!(names::JOBS_DEAD_LETTER, "queue" => queue.to_string()).set(dead_letter as f64);
    }
}
