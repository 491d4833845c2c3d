//! Product service trait definition.

use crate::dto::{CreateProductRequest, ProductListQuery, ProductListResponse, ProductResponse};
use catalog_core::{CatalogResult, Interface, ProductId};
use async_trait::async_trait;

/// Product orchestrator.
///
/// Coordinates the product store, the cache layer and the task channel. The
/// store is the only authority: cache and task failures never fail a call.
#[async_trait]
pub trait ProductService: Interface + Send + Sync {
    /// Validates and stores a new product, then schedules image processing.
    ///
    /// A failed task handoff is logged; the product is still returned.
    async fn create_product(&self, request: CreateProductRequest) -> CatalogResult<ProductResponse>;

    /// Gets a product by ID, reading through the cache.
    async fn get_product(&self, id: ProductId) -> CatalogResult<ProductResponse>;

    /// Lists one page of a user's products, reading through the cache.
    async fn list_products(&self, query: ProductListQuery) -> CatalogResult<ProductListResponse>;

    /// Computes and stores compressed references for a product's images.
    ///
    /// Overwrites any previous result, so repeated calls with the same input
    /// converge on the same stored state.
    async fn process_product_images(&self, id: ProductId, image_urls: Vec<String>) -> CatalogResult<()>;
}
