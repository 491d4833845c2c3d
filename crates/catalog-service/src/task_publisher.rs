//! Task handoff seam between the orchestrator and the task channel.

use catalog_core::{CatalogResult, Interface, ProductId};
use async_trait::async_trait;

/// Publishes image processing tasks for the background worker.
#[async_trait]
pub trait TaskPublisher: Interface + Send + Sync {
    /// Hands off one `{product_id, image_urls}` task.
    async fn publish_image_task(&self, product_id: ProductId, image_urls: Vec<String>) -> CatalogResult<()>;
}
