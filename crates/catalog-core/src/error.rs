//! Unified error types for all layers of the catalog.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;

/// Unified error type for the catalog.
///
/// Variants fall into three groups. Domain errors are user-actionable and
/// surface unchanged. Infrastructure errors describe a store, cache or queue
/// that could not be reached in time. Internal errors cover everything else.
#[derive(Error, Debug)]
pub enum CatalogError {
    // ============ Domain Errors ============
    /// Resource not found
    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    // ============ Infrastructure Errors ============
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Redis/Cache error
    #[error("Cache error: {0}")]
    Cache(String),

    /// Task queue error
    #[error("Queue error: {0}")]
    Queue(String),

    /// Timeout error
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Payload could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    // ============ Internal Errors ============
    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CatalogError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Validation(_) => 400,
            Self::Database(_)
            | Self::Timeout(_)
            | Self::Cache(_)
            | Self::Queue(_)
            | Self::Serialization(_)
            | Self::Configuration(_)
            | Self::Internal(_)
            | Self::Other(_) => 500,
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Cache(_) => "CACHE_ERROR",
            Self::Queue(_) => "QUEUE_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) | Self::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Creates a not found error for a resource.
    #[must_use]
    pub fn not_found<T: ToString>(resource_type: &'static str, id: T) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a cache error.
    #[must_use]
    pub fn cache<T: Into<String>>(message: T) -> Self {
        Self::Cache(message.into())
    }

    /// Creates a queue error.
    #[must_use]
    pub fn queue<T: Into<String>>(message: T) -> Self {
        Self::Queue(message.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true for errors that callers may see directly and act on.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Validation(_))
    }

    /// Returns true for transient infrastructure failures.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::Cache(_) | Self::Queue(_) | Self::Timeout(_)
        )
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for CatalogError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::NotFound {
                resource_type: "database_row",
                id: "unknown".to_string(),
            },
            _ => Self::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Serializable error response for API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional field-level errors for validation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

/// Field-level validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FieldError {
    /// Field name
    pub field: String,
    /// Error message
    pub message: String,
    /// Error code
    pub code: String,
}

impl ErrorResponse {
    /// Creates a new error response from a `CatalogError`.
    #[must_use]
    pub fn from_error(error: &CatalogError) -> Self {
        Self {
            code: error.error_code().to_string(),
            message: error.to_string(),
            details: None,
        }
    }

    /// Creates an error response with an explicit code and message.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Sets field-level validation errors.
    #[must_use]
    pub fn with_details(mut self, details: Vec<FieldError>) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<&CatalogError> for ErrorResponse {
    fn from(error: &CatalogError) -> Self {
        Self::from_error(error)
    }
}
