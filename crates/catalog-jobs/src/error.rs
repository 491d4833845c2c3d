//! Job error types.

use catalog_core::CatalogError;
use thiserror::Error;

/// Result type for job operations.
pub type JobResult<T> = Result<T, JobError>;

/// Job-related errors.
#[derive(Debug, Error)]
pub enum JobError {
    /// Job execution failed.
    #[error("Job execution failed: {0}")]
    ExecutionFailed(String),

    /// The handler rejected the payload; redelivery cannot help.
    #[error("Job rejected: {0}")]
    Rejected(String),

    /// Job timed out.
    #[error("Job timed out after {0} seconds")]
    Timeout(u64),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Redis error.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Redis pool error.
    #[error("Redis pool error: {0}")]
    Pool(#[from] deadpool_redis::PoolError),

    /// Job not found.
    #[error("Job not found: {0}")]
    NotFound(String),

    /// Worker error.
    #[error("Worker error: {0}")]
    Worker(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl JobError {
    /// Returns true if another delivery of the same job may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ExecutionFailed(_)
                | Self::Timeout(_)
                | Self::Redis(_)
                | Self::Pool(_)
                | Self::Worker(_)
        )
    }

    /// Returns a short label for metrics.
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::ExecutionFailed(_) => "execution_failed",
            Self::Rejected(_) => "rejected",
            Self::Timeout(_) => "timeout",
            Self::Serialization(_) => "serialization",
            Self::Redis(_) | Self::Pool(_) => "redis",
            Self::NotFound(_) => "not_found",
            Self::Worker(_) => "worker",
            Self::Configuration(_) => "configuration",
        }
    }
}

impl From<CatalogError> for JobError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Validation(_) | CatalogError::Serialization(_) => {
                Self::Rejected(err.to_string())
            }
            _ => Self::ExecutionFailed(err.to_string()),
        }
    }
}

impl From<JobError> for CatalogError {
    fn from(err: JobError) -> Self {
        match err {
            JobError::Timeout(_) => Self::Timeout(err.to_string()),
            JobError::Serialization(e) => Self::Serialization(e.to_string()),
            _ => Self::Queue(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_retryable_execution_failed() {
        assert!(JobError::ExecutionFailed("oops".into()).is_retryable());
    }

    #[test]
    fn test_is_retryable_timeout() {
        assert!(JobError::Timeout(30).is_retryable());
    }

    #[test]
    fn test_is_not_retryable_rejected() {
        assert!(!JobError::Rejected("bad payload".into()).is_retryable());
    }

    #[test]
    fn test_is_not_retryable_configuration() {
        assert!(!JobError::Configuration("no handler".into()).is_retryable());
    }

    #[test]
    fn test_serialization_not_retryable() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err = JobError::from(json_err);
        assert!(!err.is_retryable());
        assert_eq!(err.error_type(), "serialization");
    }

    #[test]
    fn test_from_catalog_not_found_is_retryable() {
        let err = JobError::from(CatalogError::not_found("Product", 7));
        assert!(err.is_retryable());
        assert!(err.to_string().contains("Product"));
    }

    #[test]
    fn test_from_catalog_validation_is_rejected() {
        let err = JobError::from(CatalogError::validation("bad"));
        assert!(matches!(err, JobError::Rejected(_)));
    }

    #[test]
    fn test_into_catalog_error() {
        let err: CatalogError = JobError::Timeout(1).into();
        assert!(matches!(err, CatalogError::Timeout(_)));

        let err: CatalogError = JobError::Worker("down".into()).into();
        assert!(matches!(err, CatalogError::Queue(_)));
    }

    #[test]
    fn test_error_display_timeout() {
        assert!(JobError::Timeout(60).to_string().contains("60"));
    }
}
