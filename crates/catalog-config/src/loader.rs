//! Configuration loader with layered sources.

use crate::{format_validation_errors, AppConfig, ConfigValidator};
use catalog_core::CatalogError;
use config::{Config, ConfigError, Environment, File};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Environment variable selecting the configuration environment.
pub const ENVIRONMENT_VAR: &str = "CATALOG_ENVIRONMENT";

/// Prefix for environment variable overrides (`CATALOG__DATABASE__URL`).
pub const ENV_PREFIX: &str = "CATALOG";

/// Configuration loader with runtime refresh support.
#[derive(Clone)]
pub struct ConfigLoader {
    config: Arc<RwLock<AppConfig>>,
    config_dir: String,
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    ///
    /// Configuration is loaded from multiple sources in order:
    /// 1. `config/default.toml` - Default values
    /// 2. `config/{environment}.toml` - Environment-specific overrides
    /// 3. `config/local.toml` - Local overrides
    /// 4. Environment variables with `CATALOG__` prefix
    pub fn new(config_dir: impl Into<String>) -> Result<Self, CatalogError> {
        let config_dir = config_dir.into();
        let config = Self::load_config(&config_dir)?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_dir,
        })
    }

    /// Loads configuration from the default location (`./config`).
    pub fn from_default_location() -> Result<Self, CatalogError> {
        Self::new("./config")
    }

    /// Returns the current configuration.
    pub async fn get(&self) -> AppConfig {
        self.config.read().await.clone()
    }

    /// Reloads the configuration from disk.
    pub async fn reload(&self) -> Result<(), CatalogError> {
        let new_config = Self::load_config(&self.config_dir)?;
        let mut config = self.config.write().await;
        *config = new_config;
        info!("Configuration reloaded successfully");
        Ok(())
    }

    /// Loads configuration from the specified directory.
    fn load_config(config_dir: &str) -> Result<AppConfig, CatalogError> {
        // Load .env file if present
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file found or error loading it: {}", e);
        }

        let environment =
            std::env::var(ENVIRONMENT_VAR).unwrap_or_else(|_| "development".to_string());

        info!("Loading configuration for environment: {}", environment);

        let mut builder = Config::builder();

        for name in ["default", environment.as_str(), "local"] {
            let path = format!("{config_dir}/{name}.toml");
            if Path::new(&path).exists() {
                debug!("Loading config from: {}", path);
                builder = builder.add_source(File::with_name(&path).required(false));
            }
        }

        builder = builder
            .set_override("app.environment", environment.clone())
            .map_err(config_error_to_catalog_error)?
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        let app_config: AppConfig = builder
            .build()
            .map_err(config_error_to_catalog_error)?
            .try_deserialize()
            .map_err(config_error_to_catalog_error)?;

        ConfigValidator::validate(&app_config)
            .map_err(|errors| CatalogError::Configuration(format_validation_errors(&errors)))?;

        Ok(app_config)
    }
}

fn config_error_to_catalog_error(err: ConfigError) -> CatalogError {
    CatalogError::Configuration(err.to_string())
}
