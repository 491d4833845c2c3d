//! Image processing task: payload, publisher and worker registration.

use crate::error::JobError;
use crate::job::{Job, JobData};
use crate::metrics::JobMetrics;
use crate::queue::JobQueue;
use crate::worker::WorkerPool;
use async_trait::async_trait;
use catalog_config::JobsConfig;
use catalog_core::{CatalogError, CatalogResult, ProductId};
use catalog_service::{ProductService, TaskPublisher};
use serde::{Deserialize, Serialize};
use shaku::Component;
use std::sync::Arc;
use tracing::{debug, info};

/// Message handed from the API to the image processor.
///
/// Serializes as `{"product_id": 42, "image_urls": ["..."]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessImagesJob {
    /// Product whose images should be processed.
    pub product_id: ProductId,
    /// Original image URLs, in display order.
    pub image_urls: Vec<String>,
}

impl Job for ProcessImagesJob {
    const NAME: &'static str = "process_images";
    const QUEUE: &'static str = "image_processing";
}

/// [`TaskPublisher`] that pushes [`ProcessImagesJob`]s onto the job queue.
#[derive(Component)]
#[shaku(interface = TaskPublisher)]
pub struct JobTaskPublisher {
    #[shaku(inject)]
    queue: Arc<dyn JobQueue>,
    config: JobsConfig,
}

impl JobTaskPublisher {
    /// Creates a publisher over `queue`.
    pub fn new(queue: Arc<dyn JobQueue>, config: JobsConfig) -> Self {
        Self { queue, config }
    }

    fn envelope(&self, job: &ProcessImagesJob) -> Result<JobData, JobError> {
        Ok(JobData::new(job)?
            .on_queue(self.config.queue.clone())
            .with_max_attempts(self.config.max_attempts)
            .with_timeout(self.config.job_timeout()))
    }
}

#[async_trait]
impl TaskPublisher for JobTaskPublisher {
    async fn publish_image_task(
        &self,
        product_id: ProductId,
        image_urls: Vec<String>,
    ) -> CatalogResult<()> {
        let job = ProcessImagesJob {
            product_id,
            image_urls,
        };
        let data = self.envelope(&job)?;
        let queue_name = data.queue.clone();

        let job_id = tokio::time::timeout(self.config.publish_timeout(), self.queue.push(data))
            .await
            .map_err(|_| {
                CatalogError::Timeout(format!(
                    "Publishing image task for product {product_id} exceeded {}ms",
                    self.config.publish_timeout_ms
                ))
            })??;

        JobMetrics::job_enqueued(&queue_name, ProcessImagesJob::NAME);
        debug!(product_id = %product_id, job_id = %job_id, "Published image processing task");
        Ok(())
    }
}

impl std::fmt::Debug for JobTaskPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobTaskPublisher")
            .field("queue", &self.config.queue)
            .finish_non_exhaustive()
    }
}

/// Registers the [`ProcessImagesJob`] handler on `pool`.
///
/// Domain errors from the service keep their retry classification: a
/// missing product is retried, a rejected payload is dead-lettered.
pub fn register_image_processing(pool: &WorkerPool, service: Arc<dyn ProductService>) {
    pool.register(move |job: ProcessImagesJob, ctx| {
        let service = Arc::clone(&service);
        async move {
            info!(
                product_id = %job.product_id,
                images = job.image_urls.len(),
                attempt = ctx.attempt,
                "Processing product images"
            );
            service
                .process_product_images(job.product_id, job.image_urls)
                .await
                .map_err(JobError::from)
        }
    });
}
