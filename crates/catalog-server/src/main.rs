//! # Product Catalog API
//!
//! Serves the product endpoints and publishes image-processing tasks for the
//! `image-processor` binary.

use catalog_config::AppConfig;
use catalog_core::{CatalogError, CatalogResult};
use catalog_jobs::register_metrics;
use catalog_repository::DatabasePoolInterface;
use catalog_rest::{create_router, AppState};
use catalog_server::di::{build_module, readiness_checks, Connections};
use catalog_server::startup::{bootstrap, print_banner, print_startup_info, shutdown_signal};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = bootstrap().await;
    print_banner("catalog-api", &config);

    if let Err(e) = run(config).await {
        error!("Application error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> CatalogResult<()> {
    register_metrics();

    let connections = Connections::for_api(&config).await?;
    if config.database.run_migrations {
        connections.database.run_migrations().await?;
    }

    let module = build_module(&config, &connections);
    let state = readiness_checks(&config, &connections)
        .into_iter()
        .fold(AppState::from_module(module.as_ref()), AppState::with_health_check);

    let router = create_router(state, &config.server);

    let rest_addr = config.server.rest_addr();
    let listener = tokio::net::TcpListener::bind(&rest_addr)
        .await
        .map_err(|e| CatalogError::Internal(format!("Failed to bind REST: {e}")))?;
    print_startup_info(&config.server);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| CatalogError::Internal(format!("REST server error: {e}")))?;

    connections.database.close().await;
    info!("Server shutdown complete");
    Ok(())
}
