//! Worker pool for processing jobs.

use crate::error::{JobError, JobResult};
use crate::job::{Job, JobContext, JobData};
use crate::metrics::JobMetrics;
use crate::queue::{FailOutcome, JobQueue};
use catalog_config::JobsConfig;
use futures::future::BoxFuture;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, Semaphore};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, info, warn, Instrument};
use uuid::Uuid;

/// Worker pool configuration.
#[derive(Debug, Clone)]
pub struct WorkerPoolConfig {
    /// Number of jobs processed concurrently.
    pub concurrency: usize,

    /// Queue to consume.
    pub queue: String,

    /// Timeout for jobs whose envelope carries none.
    pub job_timeout: Duration,

    /// Wait between polls of an empty queue.
    pub poll_interval: Duration,

    /// Grace period for in-flight jobs on shutdown.
    pub shutdown_timeout: Duration,

    /// Heartbeat and stale-job recovery interval.
    pub heartbeat_interval: Duration,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self::from_config(&JobsConfig::default(), Duration::from_secs(5))
    }
}

impl WorkerPoolConfig {
    /// Builds the pool configuration from the `jobs` section.
    #[must_use]
    pub fn from_config(config: &JobsConfig, shutdown_timeout: Duration) -> Self {
        Self {
            concurrency: config.concurrency.max(1),
            queue: config.queue.clone(),
            job_timeout: config.job_timeout(),
            poll_interval: config.poll_interval(),
            shutdown_timeout,
            heartbeat_interval: config.heartbeat_interval(),
        }
    }

    /// How long a heartbeat keeps the pool alive.
    #[must_use]
    pub fn heartbeat_ttl(&self) -> Duration {
        self.heartbeat_interval * 3
    }
}

/// Type-erased job handler.
pub type JobHandler =
    Arc<dyn Fn(JobData, JobContext) -> BoxFuture<'static, JobResult<()>> + Send + Sync>;

/// Worker pool statistics.
#[derive(Debug, Clone)]
pub struct WorkerPoolStats {
    /// Pool ID.
    pub id: String,

    /// Is running.
    pub running: bool,

    /// Configured concurrency.
    pub concurrency: usize,

    /// Jobs completed.
    pub jobs_processed: u64,

    /// Failed attempts.
    pub jobs_failed: u64,

    /// Queue being processed.
    pub queue: String,
}

#[derive(Clone)]
struct Counters {
    processed: Arc<AtomicU64>,
    failed: Arc<AtomicU64>,
}

/// Worker pool for concurrent job processing.
///
/// The pool id doubles as the worker id recorded against every job it
/// claims, so one heartbeat key covers all of its in-flight jobs.
pub struct WorkerPool {
    id: String,
    queue: Arc<dyn JobQueue>,
    config: WorkerPoolConfig,
    handlers: Arc<RwLock<HashMap<String, JobHandler>>>,
    shutdown_tx: broadcast::Sender<()>,
    stopping: AtomicBool,
    running: AtomicBool,
    counters: Counters,
}

impl WorkerPool {
    /// Creates a new worker pool.
    pub fn new(queue: Arc<dyn JobQueue>, config: WorkerPoolConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            id: format!("worker-pool-{}", Uuid::new_v4()),
            queue,
            config,
            handlers: Arc::new(RwLock::new(HashMap::new())),
            shutdown_tx,
            stopping: AtomicBool::new(false),
            running: AtomicBool::new(false),
            counters: Counters {
                processed: Arc::new(AtomicU64::new(0)),
                failed: Arc::new(AtomicU64::new(0)),
            },
        }
    }

    /// Registers the handler for jobs of type `J`.
    ///
    /// A payload that does not decode as `J` fails with a non-retryable
    /// error and goes straight to the dead letter list.
    pub fn register<J, F, Fut>(&self, handler: F)
    where
        J: Job,
        F: Fn(J, JobContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = JobResult<()>> + Send + 'static,
    {
        let handler_fn: JobHandler = Arc::new(
            move |job_data: JobData, ctx: JobContext| -> BoxFuture<'static, JobResult<()>> {
                match job_data.deserialize::<J>() {
                    Ok(job) => Box::pin(handler(job, ctx)),
                    Err(e) => Box::pin(async move { Err(e) }),
                }
            },
        );

        self.handlers.write().insert(J::NAME.to_string(), handler_fn);
        info!(job_type = J::NAME, "Registered job handler");
    }

    /// Runs the pool until [`stop`](Self::stop) is called.
    ///
    /// On shutdown, in-flight jobs get up to `shutdown_timeout` to finish.
    /// Anything still running after that stays in the in-flight list and is
    /// recovered once this pool's heartbeat expires.
    pub async fn start(&self) -> JobResult<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(JobError::Worker("Worker pool already running".to_string()));
        }

        info!(
            pool_id = %self.id,
            concurrency = self.config.concurrency,
            queue = %self.config.queue,
            "Starting worker pool"
        );

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));

        self.maintain().await;
        let maintenance = self.spawn_maintenance();

        loop {
            if self.stopping.load(Ordering::SeqCst) {
                break;
            }

            let permit = tokio::select! {
                _ = shutdown_rx.recv() => break,
                permit = semaphore.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            match self.queue.dequeue(&self.config.queue, &self.id).await {
                Ok(Some(job)) => {
                    JobMetrics::job_dequeued(&job.queue, &job.name);
                    let span = tracing::info_span!(
                        "job",
                        job_id = %job.id,
                        job_name = %job.name,
                        attempt = job.attempt
                    );
                    let queue = Arc::clone(&self.queue);
                    let handlers = Arc::clone(&self.handlers);
                    let counters = self.counters.clone();
                    let worker_id = self.id.clone();
                    let fallback_timeout = self.config.job_timeout;

                    tokio::spawn(
                        async move {
                            Self::process_job(
                                queue.as_ref(),
                                &handlers,
                                &counters,
                                &worker_id,
                                fallback_timeout,
                                job,
                            )
                            .await;
                            drop(permit);
                        }
                        .instrument(span),
                    );
                    continue;
                }
                Ok(None) => drop(permit),
                Err(e) => {
                    drop(permit);
                    error!(pool_id = %self.id, error = %e, "Failed to dequeue job");
                }
            }

            tokio::select! {
                _ = shutdown_rx.recv() => break,
                () = tokio::time::sleep(self.config.poll_interval) => {}
            }
        }

        info!(pool_id = %self.id, "Waiting for in-flight jobs to finish...");
        let permits = u32::try_from(self.config.concurrency).unwrap_or(u32::MAX);
        if timeout(self.config.shutdown_timeout, semaphore.acquire_many(permits))
            .await
            .is_err()
        {
            warn!(
                pool_id = %self.id,
                in_flight = self.config.concurrency - semaphore.available_permits(),
                "Shutdown timeout elapsed with jobs still running"
            );
        }

        maintenance.abort();
        self.running.store(false, Ordering::SeqCst);

        info!(
            pool_id = %self.id,
            processed = self.jobs_processed(),
            failed = self.jobs_failed(),
            "Worker pool stopped"
        );

        Ok(())
    }

    /// Sends the heartbeat and recovers jobs of dead workers once.
    async fn maintain(&self) {
        maintenance_tick(self.queue.as_ref(), &self.id, &self.config).await;
    }

    fn spawn_maintenance(&self) -> JoinHandle<()> {
        let queue = Arc::clone(&self.queue);
        let id = self.id.clone();
        let config = self.config.clone();

        tokio::spawn(async move {
            let period = config.heartbeat_interval.max(Duration::from_millis(100));
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                maintenance_tick(queue.as_ref(), &id, &config).await;
            }
        })
    }

    async fn process_job(
        queue: &dyn JobQueue,
        handlers: &RwLock<HashMap<String, JobHandler>>,
        counters: &Counters,
        worker_id: &str,
        fallback_timeout: Duration,
        job: JobData,
    ) {
        let ctx = job.to_context(worker_id);
        let handler = handlers.read().get(&job.name).cloned();
        let job_timeout = job.timeout_or(fallback_timeout);
        let started = Instant::now();

        debug!("Processing job");

        let result = match handler {
            Some(handler) => match timeout(job_timeout, handler(job.clone(), ctx)).await {
                Ok(result) => result,
                Err(_) => {
                    JobMetrics::job_timed_out(&job.queue, &job.name);
                    Err(JobError::Timeout(job_timeout.as_secs()))
                }
            },
            None => Err(JobError::Configuration(format!(
                "No handler for job type: {}",
                job.name
            ))),
        };

        match result {
            Ok(()) => {
                if let Err(e) = queue.complete(&job).await {
                    error!(error = %e, "Failed to mark job as complete");
                }
                counters.processed.fetch_add(1, Ordering::Relaxed);
                JobMetrics::job_completed(&job.queue, &job.name, started.elapsed());
                debug!("Job completed");
            }
            Err(err) => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                JobMetrics::job_failed(&job.queue, &job.name, err.error_type(), started.elapsed());
                warn!(error = %err, "Job attempt failed");

                match queue.fail(&job, &err).await {
                    Ok(FailOutcome::Retried) => {
                        JobMetrics::job_retried(&job.queue, &job.name, job.attempt);
                    }
                    Ok(FailOutcome::DeadLettered) => {
                        JobMetrics::job_dead_lettered(&job.queue, &job.name);
                    }
                    Err(e) => error!(error = %e, "Failed to record job failure"),
                }
            }
        }
    }

    /// Signals the pool to stop.
    pub fn stop(&self) {
        info!(pool_id = %self.id, "Stopping worker pool...");
        self.stopping.store(true, Ordering::SeqCst);
        let _ = self.shutdown_tx.send(());
    }

    /// Checks if the pool is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Number of jobs completed.
    pub fn jobs_processed(&self) -> u64 {
        self.counters.processed.load(Ordering::Relaxed)
    }

    /// Number of failed attempts.
    pub fn jobs_failed(&self) -> u64 {
        self.counters.failed.load(Ordering::Relaxed)
    }

    /// Returns the pool ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns pool statistics.
    pub fn stats(&self) -> WorkerPoolStats {
        WorkerPoolStats {
            id: self.id.clone(),
            running: self.is_running(),
            concurrency: self.config.concurrency,
            jobs_processed: self.jobs_processed(),
            jobs_failed: self.jobs_failed(),
            queue: self.config.queue.clone(),
        }
    }
}

async fn maintenance_tick(queue: &dyn JobQueue, worker_id: &str, config: &WorkerPoolConfig) {
    if let Err(e) = queue.heartbeat(worker_id, config.heartbeat_ttl()).await {
        warn!(worker_id = %worker_id, error = %e, "Failed to send heartbeat");
    }

    match queue.recover_stale(&config.queue).await {
        Ok(0) => {}
        Ok(count) => JobMetrics::jobs_recovered(&config.queue, count),
        Err(e) => warn!(queue = %config.queue, error = %e, "Failed to recover stale jobs"),
    }

    if let (Ok(pending), Ok(dead)) = (
        queue.queue_length(&config.queue).await,
        queue.dead_letter_length(&config.queue).await,
    ) {
        JobMetrics::update_queue_sizes(&config.queue, pending, dead);
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}
