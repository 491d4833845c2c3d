//! PostgreSQL product repository implementation.

use crate::{traits::ProductRepository, DatabasePoolInterface};
use catalog_core::{CatalogResult, NewProduct, Page, Product, ProductFilter, ProductId, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shaku::Component;
use sqlx::{FromRow, Postgres, QueryBuilder};
use std::sync::Arc;
use tracing::debug;

const PRODUCT_COLUMNS: &str = "id, user_id, product_name, product_description, product_price, \
     product_images, compressed_product_images, created_at, updated_at";

/// PostgreSQL product repository implementation.
#[derive(Component, Clone)]
#[shaku(interface = ProductRepository)]
pub struct PgProductRepository {
    #[shaku(inject)]
    pool: Arc<dyn DatabasePoolInterface>,
}

impl PgProductRepository {
    /// Creates a new PostgreSQL product repository.
    #[must_use]
    pub fn new(pool: Arc<dyn DatabasePoolInterface>) -> Self {
        Self { pool }
    }
}

/// Database row representation of a product.
#[derive(Debug, FromRow)]
struct ProductRow {
    id: i64,
    user_id: i64,
    product_name: String,
    product_description: Option<String>,
    product_price: f64,
    product_images: Vec<String>,
    compressed_product_images: Option<Vec<String>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId(row.id),
            user_id: UserId(row.user_id),
            product_name: row.product_name,
            product_description: row.product_description,
            product_price: row.product_price,
            product_images: row.product_images,
            compressed_product_images: row.compressed_product_images.unwrap_or_default(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Escapes `LIKE` metacharacters so the name filter matches literally.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Appends the `WHERE` clause shared by the page and count queries.
fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &ProductFilter) {
    qb.push(" WHERE user_id = ").push_bind(filter.user_id.into_inner());

    if let Some(min) = filter.min_price {
        qb.push(" AND product_price >= ").push_bind(min);
    }
    if let Some(max) = filter.max_price {
        qb.push(" AND product_price <= ").push_bind(max);
    }
    if let Some(name) = &filter.name {
        qb.push(" AND product_name ILIKE ")
            .push_bind(format!("%{}%", escape_like(name)));
    }
}

fn count_query(filter: &ProductFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM products");
    push_filter(&mut qb, filter);
    qb
}

fn page_query(filter: &ProductFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products"));
    push_filter(&mut qb, filter);
    qb.push(" ORDER BY id LIMIT ")
        .push_bind(filter.page.limit())
        .push(" OFFSET ")
        .push_bind(filter.page.offset());
    qb
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn create(&self, product: NewProduct) -> CatalogResult<Product> {
        debug!(user_id = %product.user_id, "Inserting product");

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            INSERT INTO products
                (user_id, product_name, product_description, product_price, product_images)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(product.user_id.into_inner())
        .bind(&product.product_name)
        .bind(&product.product_description)
        .bind(product.product_price)
        .bind(&product.product_images)
        .fetch_one(self.pool.inner())
        .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: ProductId) -> CatalogResult<Option<Product>> {
        debug!(product_id = %id, "Finding product by id");

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(self.pool.inner())
        .await?;

        Ok(row.map(Product::from))
    }

    async fn find_page(&self, filter: &ProductFilter) -> CatalogResult<Page<Product>> {
        debug!(
            user_id = %filter.user_id,
            page = filter.page.page,
            page_size = filter.page.page_size,
            "Listing products"
        );

        let total = count_query(filter)
            .build_query_scalar::<i64>()
            .fetch_one(self.pool.inner())
            .await?;

        let rows = page_query(filter)
            .build_query_as::<ProductRow>()
            .fetch_all(self.pool.inner())
            .await?;

        Ok(Page::new(rows.into_iter().map(Product::from).collect(), total))
    }

    async fn update_compressed_images(
        &self,
        id: ProductId,
        compressed: &[String],
    ) -> CatalogResult<bool> {
        debug!(product_id = %id, count = compressed.len(), "Updating compressed images");

        let result = sqlx::query(
            r#"
            UPDATE products
            SET compressed_product_images = $1, updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(compressed)
        .bind(id.into_inner())
        .execute(self.pool.inner())
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
