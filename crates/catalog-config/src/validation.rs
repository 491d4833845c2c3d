//! Configuration validation module.
//!
//! Fails fast on invalid configuration rather than at runtime.

use crate::AppConfig;
use std::fmt;
use std::fmt::Write as _;
use url::Url;

/// Configuration validation error variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// Port number is invalid (must be 1-65535).
    InvalidPort { name: String, value: u16 },
    /// Pool size configuration is invalid (min must be <= max).
    InvalidPoolSize { min: u32, max: u32 },
    /// Pool size exceeds maximum allowed.
    PoolSizeTooLarge { name: String, value: usize, maximum: usize },
    /// URL format is invalid.
    InvalidUrl { url_type: String, message: String },
    /// Timeout or TTL must be positive.
    NonPositiveTimeout { name: String },
    /// A count that must be at least one is zero.
    ZeroCount { name: String },
    /// Log level is invalid.
    InvalidLogLevel { value: String },
    /// Log format is invalid.
    InvalidLogFormat { value: String },
    /// Queue name or key prefix is empty.
    EmptyName { name: String },
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPort { name, value } => {
                write!(f, "Invalid port for {name}: {value} (must be 1-65535)")
            }
            Self::InvalidPoolSize { min, max } => {
                write!(
                    f,
                    "Invalid pool size: min ({min}) cannot be greater than max ({max})"
                )
            }
            Self::PoolSizeTooLarge { name, value, maximum } => {
                write!(f, "Pool size {name} = {value} exceeds maximum allowed ({maximum})")
            }
            Self::InvalidUrl { url_type, message } => {
                write!(f, "Invalid {url_type} URL: {message}")
            }
            Self::NonPositiveTimeout { name } => {
                write!(f, "'{name}' must be positive")
            }
            Self::ZeroCount { name } => {
                write!(f, "'{name}' must be at least 1")
            }
            Self::InvalidLogLevel { value } => {
                write!(
                    f,
                    "Invalid log level: '{value}' (valid: trace, debug, info, warn, error)"
                )
            }
            Self::InvalidLogFormat { value } => {
                write!(f, "Invalid log format: '{value}' (valid: json, pretty)")
            }
            Self::EmptyName { name } => write!(f, "'{name}' cannot be empty"),
        }
    }
}

impl std::error::Error for ConfigValidationError {}

/// Accumulates every error found in one validation pass.
#[derive(Debug, Default)]
struct ValidationResult {
    errors: Vec<ConfigValidationError>,
}

impl ValidationResult {
    fn add_error(&mut self, error: ConfigValidationError) {
        self.errors.push(error);
    }

    fn require_positive(&mut self, name: &str, value: u64) {
        if value == 0 {
            self.add_error(ConfigValidationError::NonPositiveTimeout {
                name: name.to_string(),
            });
        }
    }

    fn into_result(self) -> Result<(), Vec<ConfigValidationError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Maximum connection pool size.
    const MAX_POOL_SIZE: usize = 1000;
    /// Valid log levels.
    const VALID_LOG_LEVELS: &'static [&'static str] = &["trace", "debug", "info", "warn", "error"];
    /// Valid log formats.
    const VALID_LOG_FORMATS: &'static [&'static str] = &["json", "pretty"];

    /// Validates the entire application configuration.
    ///
    /// Returns Ok(()) if valid, or Err with all validation errors found.
    pub fn validate(config: &AppConfig) -> Result<(), Vec<ConfigValidationError>> {
        let mut result = ValidationResult::default();

        Self::validate_server(&config.server, &mut result);
        Self::validate_database(&config.database, &mut result);
        Self::validate_redis(&config.redis, &mut result);
        Self::validate_cache(&config.cache, &mut result);
        Self::validate_jobs(&config.jobs, &mut result);
        Self::validate_observability(&config.observability, &mut result);

        result.into_result()
    }

    fn validate_server(config: &crate::ServerConfig, result: &mut ValidationResult) {
        if config.rest_port == 0 {
            result.add_error(ConfigValidationError::InvalidPort {
                name: "rest_port".to_string(),
                value: config.rest_port,
            });
        }
        result.require_positive("server.request_timeout_secs", config.request_timeout_secs);
        if config.max_body_size == 0 {
            result.add_error(ConfigValidationError::ZeroCount {
                name: "server.max_body_size".to_string(),
            });
        }
    }

    fn validate_database(config: &crate::DatabaseConfig, result: &mut ValidationResult) {
        Self::validate_url("database", &config.url, &["postgres", "postgresql"], result);

        if config.min_connections > config.max_connections {
            result.add_error(ConfigValidationError::InvalidPoolSize {
                min: config.min_connections,
                max: config.max_connections,
            });
        }
        if config.max_connections == 0 {
            result.add_error(ConfigValidationError::ZeroCount {
                name: "database.max_connections".to_string(),
            });
        }
        if config.max_connections as usize > Self::MAX_POOL_SIZE {
            result.add_error(ConfigValidationError::PoolSizeTooLarge {
                name: "database.max_connections".to_string(),
                value: config.max_connections as usize,
                maximum: Self::MAX_POOL_SIZE,
            });
        }

        result.require_positive("database.connect_timeout_secs", config.connect_timeout_secs);
        result.require_positive("database.idle_timeout_secs", config.idle_timeout_secs);
    }

    fn validate_redis(config: &crate::RedisConfig, result: &mut ValidationResult) {
        if !config.enabled {
            return;
        }

        Self::validate_url("redis", &config.url, &["redis", "rediss"], result);

        if config.pool_size == 0 {
            result.add_error(ConfigValidationError::ZeroCount {
                name: "redis.pool_size".to_string(),
            });
        }
        if config.pool_size > Self::MAX_POOL_SIZE {
            result.add_error(ConfigValidationError::PoolSizeTooLarge {
                name: "redis.pool_size".to_string(),
                value: config.pool_size,
                maximum: Self::MAX_POOL_SIZE,
            });
        }
    }

    fn validate_cache(config: &crate::CacheConfig, result: &mut ValidationResult) {
        result.require_positive("cache.product_ttl_secs", config.product_ttl_secs);
        result.require_positive("cache.list_ttl_secs", config.list_ttl_secs);
        result.require_positive("cache.operation_timeout_ms", config.operation_timeout_ms);
    }

    fn validate_jobs(config: &crate::JobsConfig, result: &mut ValidationResult) {
        if config.key_prefix.trim().is_empty() {
            result.add_error(ConfigValidationError::EmptyName {
                name: "jobs.key_prefix".to_string(),
            });
        }
        if config.queue.trim().is_empty() {
            result.add_error(ConfigValidationError::EmptyName {
                name: "jobs.queue".to_string(),
            });
        }
        if config.concurrency == 0 {
            result.add_error(ConfigValidationError::ZeroCount {
                name: "jobs.concurrency".to_string(),
            });
        }
        if config.max_attempts == 0 {
            result.add_error(ConfigValidationError::ZeroCount {
                name: "jobs.max_attempts".to_string(),
            });
        }
        result.require_positive("jobs.poll_interval_ms", config.poll_interval_ms);
        result.require_positive("jobs.job_timeout_secs", config.job_timeout_secs);
        result.require_positive("jobs.heartbeat_interval_secs", config.heartbeat_interval_secs);
        result.require_positive("jobs.publish_timeout_ms", config.publish_timeout_ms);
    }

    fn validate_observability(config: &crate::ObservabilityConfig, result: &mut ValidationResult) {
        let level = config.log_level.to_lowercase();
        if !Self::VALID_LOG_LEVELS.contains(&level.as_str()) {
            result.add_error(ConfigValidationError::InvalidLogLevel {
                value: config.log_level.clone(),
            });
        }

        let format = config.log_format.to_lowercase();
        if !Self::VALID_LOG_FORMATS.contains(&format.as_str()) {
            result.add_error(ConfigValidationError::InvalidLogFormat {
                value: config.log_format.clone(),
            });
        }
    }

    fn validate_url(url_type: &str, value: &str, schemes: &[&str], result: &mut ValidationResult) {
        if value.is_empty() {
            result.add_error(ConfigValidationError::InvalidUrl {
                url_type: url_type.to_string(),
                message: "URL cannot be empty".to_string(),
            });
            return;
        }

        match Url::parse(value) {
            Ok(url) if schemes.contains(&url.scheme()) => {}
            Ok(url) => result.add_error(ConfigValidationError::InvalidUrl {
                url_type: url_type.to_string(),
                message: format!(
                    "unsupported scheme '{}' (expected one of: {})",
                    url.scheme(),
                    schemes.join(", ")
                ),
            }),
            Err(e) => result.add_error(ConfigValidationError::InvalidUrl {
                url_type: url_type.to_string(),
                message: e.to_string(),
            }),
        }
    }
}

/// Formats validation errors for display.
#[must_use]
pub fn format_validation_errors(errors: &[ConfigValidationError]) -> String {
    let mut output = String::from("Configuration validation failed:\n");
    for (i, error) in errors.iter().enumerate() {
        let _ = writeln!(output, "  {}. {}", i + 1, error);
    }
    output
}
