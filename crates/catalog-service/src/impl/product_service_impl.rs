//! Product service implementation.

use crate::cache::{CacheInterface, CacheTtls, ProductCache};
use crate::dto::{CreateProductRequest, ProductListQuery, ProductListResponse, ProductResponse};
use crate::image_compressor::ImageCompressor;
use crate::product_service::ProductService;
use crate::task_publisher::TaskPublisher;
use catalog_core::{CatalogError, CatalogResult, ProductId, ValidateExt};
use catalog_repository::ProductRepository;
use async_trait::async_trait;
use shaku::Component;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Concrete product service component for Shaku DI.
#[derive(Component)]
#[shaku(interface = ProductService)]
pub struct ProductServiceComponent {
    #[shaku(inject)]
    repository: Arc<dyn ProductRepository>,
    #[shaku(inject)]
    cache: Arc<dyn CacheInterface>,
    #[shaku(inject)]
    task_publisher: Arc<dyn TaskPublisher>,
    #[shaku(inject)]
    image_compressor: Arc<dyn ImageCompressor>,
    #[shaku(default = CacheTtls::DEFAULT)]
    cache_ttls: CacheTtls,
}

impl ProductServiceComponent {
    /// Creates a product service outside of a DI module.
    pub fn new(
        repository: Arc<dyn ProductRepository>,
        cache: Arc<dyn CacheInterface>,
        task_publisher: Arc<dyn TaskPublisher>,
        image_compressor: Arc<dyn ImageCompressor>,
        cache_ttls: CacheTtls,
    ) -> Self {
        Self {
            repository,
            cache,
            task_publisher,
            image_compressor,
            cache_ttls,
        }
    }

    fn product_cache(&self) -> ProductCache<'_> {
        ProductCache::new(self.cache.as_ref(), self.cache_ttls)
    }
}

#[async_trait]
impl ProductService for ProductServiceComponent {
    async fn create_product(&self, request: CreateProductRequest) -> CatalogResult<ProductResponse> {
        debug!(user_id = request.user_id, "Creating product");

        request.validate_request()?;

        let product = self.repository.create(request.into_new_product()).await?;
        info!(product_id = %product.id, user_id = %product.user_id, "Product created");

        if let Err(e) = self
            .task_publisher
            .publish_image_task(product.id, product.product_images.clone())
            .await
        {
            error!(
                product_id = %product.id,
                error = %e,
                "Failed to publish image processing task"
            );
        }

        Ok(ProductResponse::from(product))
    }

    async fn get_product(&self, id: ProductId) -> CatalogResult<ProductResponse> {
        debug!(product_id = %id, "Getting product");

        let cache = self.product_cache();
        if let Some(cached) = cache.get_product(id).await {
            return Ok(ProductResponse::from(cached));
        }

        let product = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::not_found("Product", id))?;

        cache.set_product(&product).await;

        Ok(ProductResponse::from(product))
    }

    async fn list_products(&self, query: ProductListQuery) -> CatalogResult<ProductListResponse> {
        let filter = query.normalize();
        debug!(
            user_id = %filter.user_id,
            page = filter.page.page,
            page_size = filter.page.page_size,
            "Listing products"
        );

        let cache = self.product_cache();
        if let Some(cached) = cache.get_list(&filter).await {
            return Ok(ProductListResponse::from_page(cached, &filter));
        }

        let page = self.repository.find_page(&filter).await?;
        cache.set_list(&filter, &page).await;

        Ok(ProductListResponse::from_page(page, &filter))
    }

    async fn process_product_images(&self, id: ProductId, image_urls: Vec<String>) -> CatalogResult<()> {
        debug!(product_id = %id, images = image_urls.len(), "Processing product images");

        let compressed = self.image_compressor.compress_all(&image_urls);

        if !self.repository.update_compressed_images(id, &compressed).await? {
            return Err(CatalogError::not_found("Product", id));
        }

        // List pages are left to expire on their own TTL.
        self.product_cache().invalidate_product(id).await;

        info!(product_id = %id, images = compressed.len(), "Product images processed");
        Ok(())
    }
}

impl std::fmt::Debug for ProductServiceComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductServiceComponent")
            .field("cache_ttls", &self.cache_ttls)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::cache_keys;
    use crate::image_compressor::PrefixImageCompressor;
    use catalog_core::{NewProduct, Page, Product, ProductFilter, UserId};
    use chrono::Utc;
    use mockall::predicate::eq;
    use std::collections::{BTreeMap, HashMap};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    mockall::mock! {
        Publisher {}

        #[async_trait]
        impl TaskPublisher for Publisher {
            async fn publish_image_task(
                &self,
                product_id: ProductId,
                image_urls: Vec<String>,
            ) -> CatalogResult<()>;
        }
    }

    /// In-memory product store.
    #[derive(Default)]
    struct MemoryRepository {
        products: Mutex<BTreeMap<ProductId, Product>>,
        next_id: Mutex<i64>,
        find_calls: AtomicUsize,
        page_calls: AtomicUsize,
        writes: AtomicUsize,
    }

    #[async_trait]
    impl ProductRepository for MemoryRepository {
        async fn create(&self, product: NewProduct) -> CatalogResult<Product> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            let mut next_id = self.next_id.lock().unwrap();
            *next_id += 1;
            let now = Utc::now();
            let stored = Product {
                id: ProductId(*next_id),
                user_id: product.user_id,
                product_name: product.product_name,
                product_description: product.product_description,
                product_price: product.product_price,
                product_images: product.product_images,
                compressed_product_images: Vec::new(),
                created_at: now,
                updated_at: now,
            };
            self.products.lock().unwrap().insert(stored.id, stored.clone());
            Ok(stored)
        }

        async fn find_by_id(&self, id: ProductId) -> CatalogResult<Option<Product>> {
            self.find_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.products.lock().unwrap().get(&id).cloned())
        }

        async fn find_page(&self, filter: &ProductFilter) -> CatalogResult<Page<Product>> {
            self.page_calls.fetch_add(1, Ordering::SeqCst);
            let matching: Vec<Product> = self
                .products
                .lock()
                .unwrap()
                .values()
                .filter(|p| p.user_id == filter.user_id)
                .filter(|p| filter.min_price.map_or(true, |min| p.product_price >= min))
                .filter(|p| filter.max_price.map_or(true, |max| p.product_price <= max))
                .filter(|p| {
                    filter.name.as_ref().map_or(true, |n| {
                        p.product_name.to_lowercase().contains(&n.to_lowercase())
                    })
                })
                .cloned()
                .collect();
            let total = matching.len() as i64;
            let items = matching
                .into_iter()
                .skip(filter.page.offset() as usize)
                .take(filter.page.limit() as usize)
                .collect();
            Ok(Page::new(items, total))
        }

        async fn update_compressed_images(&self, id: ProductId, images: &[String]) -> CatalogResult<bool> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            let mut products = self.products.lock().unwrap();
            match products.get_mut(&id) {
                Some(product) => {
                    product.compressed_product_images = images.to_vec();
                    product.updated_at = Utc::now();
                    Ok(true)
                }
                None => Ok(false),
            }
        }
    }

    /// In-memory cache backend that can be switched into a failing state.
    #[derive(Default)]
    struct MemoryCache {
        entries: Mutex<HashMap<String, String>>,
        broken: bool,
    }

    impl MemoryCache {
        fn broken() -> Self {
            Self {
                broken: true,
                ..Self::default()
            }
        }

        fn contains(&self, key: &str) -> bool {
            self.entries.lock().unwrap().contains_key(key)
        }

        fn is_empty(&self) -> bool {
            self.entries.lock().unwrap().is_empty()
        }
    }

    #[async_trait]
    impl CacheInterface for MemoryCache {
        async fn get_raw(&self, key: &str) -> CatalogResult<Option<String>> {
            if self.broken {
                return Err(CatalogError::Timeout("cache get".to_string()));
            }
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        async fn set_raw(&self, key: &str, value: &str, _ttl: Duration) -> CatalogResult<()> {
            if self.broken {
                return Err(CatalogError::Timeout("cache set".to_string()));
            }
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn delete(&self, key: &str) -> CatalogResult<bool> {
            if self.broken {
                return Err(CatalogError::Timeout("cache delete".to_string()));
            }
            Ok(self.entries.lock().unwrap().remove(key).is_some())
        }

        fn is_enabled(&self) -> bool {
            true
        }
    }

    struct Fixture {
        repository: Arc<MemoryRepository>,
        cache: Arc<MemoryCache>,
        service: ProductServiceComponent,
    }

    fn fixture_with(cache: MemoryCache, publisher: MockPublisher) -> Fixture {
        let repository = Arc::new(MemoryRepository::default());
        let cache = Arc::new(cache);
        let service = ProductServiceComponent::new(
            repository.clone(),
            cache.clone(),
            Arc::new(publisher),
            Arc::new(PrefixImageCompressor::new()),
            CacheTtls::DEFAULT,
        );
        Fixture {
            repository,
            cache,
            service,
        }
    }

    fn accepting_publisher() -> MockPublisher {
        let mut publisher = MockPublisher::new();
        publisher.expect_publish_image_task().returning(|_, _| Ok(()));
        publisher
    }

    fn fixture() -> Fixture {
        fixture_with(MemoryCache::default(), accepting_publisher())
    }

    fn widget_request() -> CreateProductRequest {
        CreateProductRequest {
            user_id: 1,
            product_name: "Widget".to_string(),
            product_description: None,
            product_price: 9.99,
            product_images: vec!["a.jpg".to_string(), "b.jpg".to_string()],
        }
    }

    #[tokio::test]
    async fn test_create_product_publishes_task() {
        let mut publisher = MockPublisher::new();
        publisher
            .expect_publish_image_task()
            .with(
                eq(ProductId(1)),
                eq(vec!["a.jpg".to_string(), "b.jpg".to_string()]),
            )
            .times(1)
            .returning(|_, _| Ok(()));
        let fx = fixture_with(MemoryCache::default(), publisher);

        let created = fx.service.create_product(widget_request()).await.unwrap();

        assert!(created.id.into_inner() > 0);
        assert!(created.compressed_product_images.is_empty());
        assert_eq!(created.product_name, "Widget");
    }

    #[tokio::test]
    async fn test_create_product_invalid_touches_nothing() {
        let mut publisher = MockPublisher::new();
        publisher.expect_publish_image_task().times(0);
        let fx = fixture_with(MemoryCache::default(), publisher);

        let request = CreateProductRequest {
            product_price: -1.0,
            ..widget_request()
        };
        let result = fx.service.create_product(request).await;

        assert!(matches!(result, Err(CatalogError::Validation(_))));
        assert_eq!(fx.repository.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_create_product_survives_publish_failure() {
        let mut publisher = MockPublisher::new();
        publisher
            .expect_publish_image_task()
            .times(1)
            .returning(|_, _| Err(CatalogError::queue("broker unreachable")));
        let fx = fixture_with(MemoryCache::default(), publisher);

        let created = fx.service.create_product(widget_request()).await.unwrap();

        let fetched = fx.service.get_product(created.id).await.unwrap();
        assert_eq!(fetched.id, created.id);
    }

    #[tokio::test]
    async fn test_get_product_reads_through_cache() {
        let fx = fixture();
        let created = fx.service.create_product(widget_request()).await.unwrap();

        let first = fx.service.get_product(created.id).await.unwrap();
        let second = fx.service.get_product(created.id).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first, created);
        assert_eq!(fx.repository.find_calls.load(Ordering::SeqCst), 1);
        assert!(fx.cache.contains(&cache_keys::product_by_id(created.id)));
    }

    #[tokio::test]
    async fn test_get_product_not_found_creates_no_entry() {
        let fx = fixture();

        let result = fx.service.get_product(ProductId(999_999)).await;

        assert!(matches!(result, Err(CatalogError::NotFound { .. })));
        assert!(fx.cache.is_empty());
    }

    #[tokio::test]
    async fn test_get_product_with_broken_cache_uses_store() {
        let fx = fixture_with(MemoryCache::broken(), accepting_publisher());
        let created = fx.service.create_product(widget_request()).await.unwrap();

        let fetched = fx.service.get_product(created.id).await.unwrap();
        assert_eq!(fetched, created);

        let listed = fx
            .service
            .list_products(ProductListQuery {
                user_id: 1,
                ..ProductListQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(listed.total_count, 1);
    }

    #[tokio::test]
    async fn test_list_products_normalizes_and_caches() {
        let fx = fixture();
        for _ in 0..3 {
            fx.service.create_product(widget_request()).await.unwrap();
        }
        let query = ProductListQuery {
            user_id: 1,
            page: Some(0),
            page_size: Some(0),
            ..ProductListQuery::default()
        };

        let first = fx.service.list_products(query.clone()).await.unwrap();
        let second = fx.service.list_products(query).await.unwrap();

        assert_eq!(first.page, 1);
        assert_eq!(first.page_size, 10);
        assert_eq!(first.total_count, 3);
        assert_eq!(first.products.len(), 3);
        assert_eq!(first, second);
        assert_eq!(fx.repository.page_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_list_products_distinct_pages_are_distinct_entries() {
        let fx = fixture();
        for _ in 0..3 {
            fx.service.create_product(widget_request()).await.unwrap();
        }
        let page = |n| ProductListQuery {
            user_id: 1,
            page: Some(n),
            page_size: Some(2),
            ..ProductListQuery::default()
        };

        let first = fx.service.list_products(page(1)).await.unwrap();
        let second = fx.service.list_products(page(2)).await.unwrap();

        assert_eq!(first.products.len(), 2);
        assert_eq!(second.products.len(), 1);
        assert_eq!(second.total_count, 3);
        assert_eq!(fx.repository.page_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_process_images_updates_and_invalidates() {
        let fx = fixture();
        let created = fx.service.create_product(widget_request()).await.unwrap();
        fx.service.get_product(created.id).await.unwrap();
        assert!(fx.cache.contains(&cache_keys::product_by_id(created.id)));

        fx.service
            .process_product_images(created.id, created.product_images.clone())
            .await
            .unwrap();

        assert!(!fx.cache.contains(&cache_keys::product_by_id(created.id)));
        let fetched = fx.service.get_product(created.id).await.unwrap();
        assert_eq!(
            fetched.compressed_product_images,
            vec!["compressed_a.jpg", "compressed_b.jpg"]
        );
        assert_eq!(fetched.product_images, created.product_images);
    }

    #[tokio::test]
    async fn test_process_images_is_idempotent() {
        let fx = fixture();
        let created = fx.service.create_product(widget_request()).await.unwrap();
        let urls = created.product_images.clone();

        fx.service.process_product_images(created.id, urls.clone()).await.unwrap();
        let once = fx.service.get_product(created.id).await.unwrap();
        fx.service.process_product_images(created.id, urls).await.unwrap();
        let twice = fx.service.get_product(created.id).await.unwrap();

        assert_eq!(once.compressed_product_images, twice.compressed_product_images);
        assert_eq!(twice.compressed_product_images.len(), 2);
    }

    #[tokio::test]
    async fn test_process_images_missing_product() {
        let fx = fixture();

        let result = fx
            .service
            .process_product_images(ProductId(42), vec!["a.jpg".to_string()])
            .await;

        assert!(matches!(result, Err(CatalogError::NotFound { .. })));
        assert!(fx.cache.is_empty());
    }

    #[tokio::test]
    async fn test_process_images_leaves_list_entries() {
        let fx = fixture();
        let created = fx.service.create_product(widget_request()).await.unwrap();
        let query = ProductListQuery {
            user_id: 1,
            ..ProductListQuery::default()
        };
        fx.service.list_products(query.clone()).await.unwrap();

        fx.service
            .process_product_images(created.id, created.product_images.clone())
            .await
            .unwrap();

        let listed = fx.service.list_products(query).await.unwrap();
        assert!(listed.products[0].compressed_product_images.is_empty());
        assert_eq!(fx.repository.page_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_debug_hides_dependencies() {
        let fx = fixture();
        let debug = format!("{:?}", fx.service);
        assert!(debug.starts_with("ProductServiceComponent"));
    }
}
