//! # Image Processor
//!
//! Consumes `process_images` jobs from the Redis queue and writes the
//! compressed image references back through the product service.

use catalog_config::AppConfig;
use catalog_core::{CatalogError, CatalogResult};
use catalog_jobs::{register_image_processing, register_metrics, JobResult, WorkerPool, WorkerPoolConfig};
use catalog_repository::DatabasePoolInterface;
use catalog_server::di::{build_module, Connections, ServiceResolver};
use catalog_server::startup::{bootstrap, print_banner, shutdown_signal};
use std::sync::Arc;
use tokio::task::JoinError;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = bootstrap().await;
    print_banner("image-processor", &config);

    if let Err(e) = run(config).await {
        error!("Application error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> CatalogResult<()> {
    register_metrics();

    let connections = Connections::for_worker(&config).await?;
    let module = build_module(&config, &connections);

    let pool_config = WorkerPoolConfig::from_config(&config.jobs, config.server.shutdown_timeout());
    let pool = Arc::new(WorkerPool::new(module.job_queue(), pool_config));
    register_image_processing(&pool, module.product_service());

    info!(
        worker = %pool.id(),
        queue = %config.jobs.queue,
        concurrency = config.jobs.concurrency,
        "Image processor ready"
    );

    let worker = Arc::clone(&pool);
    let mut handle = tokio::spawn(async move { worker.start().await });

    let result = tokio::select! {
        () = shutdown_signal() => {
            pool.stop();
            handle.await
        }
        result = &mut handle => result,
    };
    finish(result)?;

    let stats = pool.stats();
    info!(
        processed = stats.jobs_processed,
        failed = stats.jobs_failed,
        "Image processor stopped"
    );

    connections.database.close().await;
    Ok(())
}

fn finish(result: Result<JobResult<()>, JoinError>) -> CatalogResult<()> {
    result
        .map_err(|e| CatalogError::internal(format!("Worker task failed: {e}")))?
        .map_err(CatalogError::from)
}
