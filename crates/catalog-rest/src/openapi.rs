//! OpenAPI documentation configuration.

use crate::controllers::health_controller::{ComponentHealth, HealthResponse, ReadinessResponse};
use catalog_core::{ErrorResponse, FieldError, ProductId, UserId};
use catalog_service::{CreateProductRequest, ProductListResponse, ProductResponse};
use utoipa::OpenApi;

/// OpenAPI document for the product catalog API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Product Catalog API",
        version = "1.0.0",
        description = "Create, fetch and list products; images are processed in the background"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        crate::controllers::product_controller::create_product,
        crate::controllers::product_controller::get_product,
        crate::controllers::product_controller::list_products,
        crate::controllers::health_controller::health_check,
        crate::controllers::health_controller::readiness_check,
    ),
    components(
        schemas(
            ProductId,
            UserId,
            ErrorResponse,
            FieldError,
            CreateProductRequest,
            ProductResponse,
            ProductListResponse,
            HealthResponse,
            ReadinessResponse,
            ComponentHealth,
        )
    ),
    tags(
        (name = "products", description = "Product endpoints"),
        (name = "health", description = "Health check endpoints")
    )
)]
pub struct ApiDoc;
