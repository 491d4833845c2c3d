//! API response types.

use catalog_core::{CatalogError, ErrorResponse, ProductId};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};

/// Application error type for Axum.
#[derive(Debug)]
pub struct AppError(pub CatalogError);

impl AppError {
    /// Maps a failed single-product lookup.
    ///
    /// Only validation errors keep their own status; everything else is
    /// reported as the product not being found.
    pub fn lookup(err: CatalogError, id: ProductId) -> Self {
        match err {
            CatalogError::Validation(_) | CatalogError::NotFound { .. } => Self(err),
            other => {
                warn!(product_id = %id, error = %other, "Product lookup failed");
                Self(CatalogError::not_found("Product", id))
            }
        }
    }

    /// Returns the HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        }

        let body = match &self.0 {
            CatalogError::Validation(_) | CatalogError::NotFound { .. } => {
                ErrorResponse::from_error(&self.0)
            }
            other => ErrorResponse::new(other.error_code(), "The request could not be completed"),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for Axum handlers.
pub type ApiResult<T> = Result<Json<T>, AppError>;

/// Returns a 200 response.
pub fn ok<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(Json(data))
}

/// Returns a 201 response.
pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(data))
}

/// Builds a 400 response with an explicit code.
pub fn bad_request(code: &str, message: impl Into<String>) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(code, message))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_maps_store_failure_to_not_found() {
        let err = AppError::lookup(CatalogError::Database("down".into()), ProductId(5));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert!(err.0.to_string().contains('5'));
    }

    #[test]
    fn test_lookup_keeps_validation() {
        let err = AppError::lookup(CatalogError::validation("bad"), ProductId(5));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_store_failure_is_internal() {
        let err = AppError::from(CatalogError::Database("down".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
