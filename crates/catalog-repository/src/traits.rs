//! Repository trait definitions.

use catalog_core::{CatalogResult, Interface, NewProduct, Page, Product, ProductFilter, ProductId};
use async_trait::async_trait;

/// Repository trait for product persistence.
#[async_trait]
pub trait ProductRepository: Interface + Send + Sync {
    /// Inserts a product; the store assigns the ID and timestamps.
    async fn create(&self, product: NewProduct) -> CatalogResult<Product>;

    /// Finds a product by ID.
    async fn find_by_id(&self, id: ProductId) -> CatalogResult<Option<Product>>;

    /// Returns one page of a user's products plus the total match count.
    async fn find_page(&self, filter: &ProductFilter) -> CatalogResult<Page<Product>>;

    /// Overwrites the compressed image list and bumps `updated_at`.
    ///
    /// Returns `false` when no row has the given ID.
    async fn update_compressed_images(
        &self,
        id: ProductId,
        compressed: &[String],
    ) -> CatalogResult<bool>;
}
