//! Tracing subscriber setup.

use catalog_config::ObservabilityConfig;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global subscriber.
///
/// `RUST_LOG` wins over `observability.log_level` when set.
pub fn init_logging(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.log_level)));

    let registry = tracing_subscriber::registry().with(filter);
    if config.is_json() {
        registry.with(fmt::layer().json().with_target(true)).init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }
}

fn default_directives(level: &str) -> String {
    format!("{level},sqlx=warn,tower_http={level}")
}
