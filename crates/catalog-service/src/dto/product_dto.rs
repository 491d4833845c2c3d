//! Product-related DTOs.

use catalog_core::rules;
use catalog_core::{NewProduct, Page, Product, ProductFilter, ProductId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Request to create a new product.
///
/// Missing fields other than the price deserialize to empty values so that
/// validation reports them field by field. A missing price is a malformed
/// body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[serde(default)]
    #[validate(range(min = 1, message = "user_id is required"))]
    pub user_id: i64,

    #[serde(default)]
    #[validate(
        length(min = 1, max = 255, message = "product_name must be 1-255 characters"),
        custom(function = rules::not_blank, message = "product_name must not be blank")
    )]
    pub product_name: String,

    pub product_description: Option<String>,

    #[validate(
        range(min = 0.0, message = "product_price must be non-negative"),
        custom(function = rules::finite, message = "product_price must be a finite number")
    )]
    pub product_price: f64,

    #[serde(default)]
    #[validate(
        length(min = 1, message = "at least one product image is required"),
        custom(function = rules::no_blank_entries, message = "product_images must not contain blank entries")
    )]
    pub product_images: Vec<String>,
}

impl CreateProductRequest {
    /// Converts a validated request into the store's insert shape.
    #[must_use]
    pub fn into_new_product(self) -> NewProduct {
        NewProduct {
            user_id: UserId(self.user_id),
            product_name: self.product_name,
            product_description: self.product_description,
            product_price: self.product_price,
            product_images: self.product_images,
        }
    }
}

/// Product response DTO.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: ProductId,
    pub user_id: UserId,
    pub product_name: String,
    pub product_description: Option<String>,
    pub product_price: f64,
    pub product_images: Vec<String>,
    pub compressed_product_images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            user_id: product.user_id,
            product_name: product.product_name,
            product_description: product.product_description,
            product_price: product.product_price,
            product_images: product.product_images,
            compressed_product_images: product.compressed_product_images,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

/// Query parameters of the product list endpoint.
///
/// `user_id` is required; every other parameter is optional.
/// [`ProductListQuery::normalize`] applies the paging defaults and drops
/// unusable filters.
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ProductListQuery {
    /// Owner whose products are listed.
    pub user_id: i64,
    /// Inclusive lower price bound; ignored unless positive.
    pub min_price: Option<f64>,
    /// Inclusive upper price bound; ignored unless positive.
    pub max_price: Option<f64>,
    /// Case-insensitive substring of the product name.
    pub product_name: Option<String>,
    /// 1-based page number (default 1).
    pub page: Option<i64>,
    /// Page size (default 10, at most 100).
    pub page_size: Option<i64>,
}

impl ProductListQuery {
    /// Produces the normalized filter used for the store query and cache key.
    #[must_use]
    pub fn normalize(self) -> ProductFilter {
        ProductFilter::new(
            UserId(self.user_id),
            self.min_price,
            self.max_price,
            self.product_name,
            self.page.unwrap_or_default(),
            self.page_size.unwrap_or_default(),
        )
    }
}

/// Product list response with pagination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductListResponse {
    pub products: Vec<ProductResponse>,
    pub total_count: i64,
    pub page: i64,
    pub page_size: i64,
}

impl ProductListResponse {
    /// Builds the response for a page fetched with `filter`.
    #[must_use]
    pub fn from_page(page: Page<Product>, filter: &ProductFilter) -> Self {
        Self {
            products: page.items.into_iter().map(ProductResponse::from).collect(),
            total_count: page.total_count,
            page: filter.page.page,
            page_size: filter.page.page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::{CatalogError, ValidateExt};

    fn valid_request() -> CreateProductRequest {
        CreateProductRequest {
            user_id: 1,
            product_name: "Widget".to_string(),
            product_description: Some("A widget".to_string()),
            product_price: 9.99,
            product_images: vec!["a.jpg".to_string(), "b.jpg".to_string()],
        }
    }

    #[test]
    fn test_create_request_valid() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_create_request_zero_price_allowed() {
        let request = CreateProductRequest {
            product_price: 0.0,
            ..valid_request()
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_request_negative_price() {
        let request = CreateProductRequest {
            product_price: -0.01,
            ..valid_request()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_request_non_finite_price() {
        let request = CreateProductRequest {
            product_price: f64::INFINITY,
            ..valid_request()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_request_missing_price_is_malformed() {
        let result = serde_json::from_str::<CreateProductRequest>(r#"{"user_id": 1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_create_request_empty_images() {
        let request = CreateProductRequest {
            product_images: Vec::new(),
            ..valid_request()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_request_name_bounds() {
        let blank = CreateProductRequest {
            product_name: "   ".to_string(),
            ..valid_request()
        };
        assert!(blank.validate().is_err());

        let long = CreateProductRequest {
            product_name: "x".repeat(256),
            ..valid_request()
        };
        assert!(long.validate().is_err());

        let max = CreateProductRequest {
            product_name: "x".repeat(255),
            ..valid_request()
        };
        assert!(max.validate().is_ok());
    }

    #[test]
    fn test_create_request_missing_fields_from_json() {
        let request: CreateProductRequest =
            serde_json::from_str(r#"{"product_price": 1.0}"#).unwrap();
        match request.validate_request() {
            Err(CatalogError::Validation(msg)) => {
                assert!(msg.contains("user_id"));
                assert!(msg.contains("product_name"));
                assert!(msg.contains("product_images"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_into_new_product() {
        let new = valid_request().into_new_product();
        assert_eq!(new.user_id, UserId(1));
        assert_eq!(new.product_price, 9.99);
        assert_eq!(new.product_images.len(), 2);
    }

    #[test]
    fn test_list_query_defaults() {
        let filter = ProductListQuery {
            user_id: 1,
            page: Some(0),
            page_size: Some(0),
            ..ProductListQuery::default()
        }
        .normalize();
        assert_eq!(filter.page.page, 1);
        assert_eq!(filter.page.page_size, 10);

        let absent = ProductListQuery::default().normalize();
        assert_eq!(absent.page.page, 1);
        assert_eq!(absent.page.page_size, 10);
    }

    #[test]
    fn test_list_response_echoes_normalized_paging() {
        let filter = ProductListQuery {
            user_id: 1,
            page: Some(-3),
            page_size: Some(500),
            ..ProductListQuery::default()
        }
        .normalize();
        let response = ProductListResponse::from_page(Page::empty(), &filter);
        assert_eq!(response.page, 1);
        assert_eq!(response.page_size, 100);
        assert_eq!(response.total_count, 0);
    }

    #[test]
    fn test_response_field_names() {
        let now = Utc::now();
        let product = Product {
            id: ProductId(3),
            user_id: UserId(1),
            product_name: "Widget".to_string(),
            product_description: None,
            product_price: 1.5,
            product_images: vec!["a.jpg".to_string()],
            compressed_product_images: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(ProductResponse::from(product)).unwrap();
        for field in [
            "id",
            "user_id",
            "product_name",
            "product_description",
            "product_price",
            "product_images",
            "compressed_product_images",
            "created_at",
            "updated_at",
        ] {
            assert!(json.get(field).is_some(), "missing {field}");
        }
        assert_eq!(json["id"], 3);
    }
}
