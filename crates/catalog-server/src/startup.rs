//! Server startup utilities.

use catalog_config::{AppConfig, ConfigLoader, ObservabilityConfig, ServerConfig};
use tokio::signal;
use tracing::{error, info};

use crate::logging::init_logging;

/// Loads the configuration and installs logging.
///
/// A configuration error is fatal: it is logged with default settings and
/// the process exits with status 1.
pub async fn bootstrap() -> AppConfig {
    match ConfigLoader::from_default_location() {
        Ok(loader) => {
            let config = loader.get().await;
            init_logging(&config.observability);
            config
        }
        Err(e) => {
            init_logging(&ObservabilityConfig::default());
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    }
}

/// Prints the startup banner.
pub fn print_banner(process: &str, config: &AppConfig) {
    info!(r#"
    ____                 __           __     ______      __        __
   / __ \_________  ____/ /_  _______/ /_   / ____/___ _/ /_____ _/ /___  ____ _
  / /_/ / ___/ __ \/ __  / / / / ___/ __/  / /   / __ `/ __/ __ `/ / __ \/ __ `/
 / ____/ /  / /_/ / /_/ / /_/ / /__/ /_   / /___/ /_/ / /_/ /_/ / / /_/ / /_/ /
/_/   /_/   \____/\__,_/\__,_/\___/\__/   \____/\__,_/\__/\__,_/_/\____/\__, /
                                                                      /____/
    "#);
    info!("Starting {} v{}", process, config.app.version);
    info!("Environment: {}", config.app.environment);
}

/// Prints API endpoint information.
pub fn print_startup_info(server: &ServerConfig) {
    let separator = "=".repeat(60);
    let addr = server.rest_addr();
    info!("{}", separator);
    info!("REST API:  http://{}/api/v1/products", addr);
    info!("Health:    http://{}/health", addr);
    info!("Ready:     http://{}/ready", addr);
    info!("API Docs:  http://{}/swagger-ui", addr);
    info!("{}", separator);
}

/// Resolves on Ctrl+C or SIGTERM.
///
/// A signal source that cannot be installed is logged and never fires.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        () = terminate => {
            info!("Received terminate signal, initiating graceful shutdown...");
        }
    }
}
