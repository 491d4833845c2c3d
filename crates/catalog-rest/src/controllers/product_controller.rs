//! Product controller.

use crate::{
    extractors::{ApiQuery, ValidatedJson},
    responses::{created, ok, ApiResult, AppError},
    state::AppState,
};
use catalog_core::{CatalogError, ErrorResponse, ProductId};
use catalog_service::{CreateProductRequest, ProductListQuery, ProductListResponse, ProductResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::debug;

/// Creates the product router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/:id", get(get_product))
}

/// Create a product.
#[utoipa::path(
    post,
    path = "/products",
    tag = "products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Malformed or invalid body", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
pub async fn create_product(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), AppError> {
    debug!(user_id = request.user_id, "Create product request");

    let response = state.product_service.create_product(request).await?;
    Ok(created(response))
}

/// Get a product by ID.
#[utoipa::path(
    get,
    path = "/products/{id}",
    tag = "products",
    params(("id" = i64, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    )
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ProductResponse> {
    debug!("Get product request: {}", id);

    let product_id = parse_product_id(&id)?;
    let response = state
        .product_service
        .get_product(product_id)
        .await
        .map_err(|e| AppError::lookup(e, product_id))?;
    ok(response)
}

/// List a user's products.
#[utoipa::path(
    get,
    path = "/products",
    tag = "products",
    params(ProductListQuery),
    responses(
        (status = 200, description = "One page of products", body = ProductListResponse),
        (status = 400, description = "Malformed query", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
pub async fn list_products(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProductListQuery>,
) -> ApiResult<ProductListResponse> {
    debug!(user_id = query.user_id, "List products request");

    let response = state.product_service.list_products(query).await?;
    ok(response)
}

/// Helper to parse a product ID from a path parameter.
fn parse_product_id(id: &str) -> Result<ProductId, AppError> {
    ProductId::parse(id)
        .map_err(|_| AppError(CatalogError::validation(format!("Invalid product ID: {id}"))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_product_id() {
        assert_eq!(parse_product_id("42").unwrap(), ProductId(42));
        assert_eq!(
            parse_product_id("abc").unwrap_err().status(),
            StatusCode::BAD_REQUEST
        );
    }
}
