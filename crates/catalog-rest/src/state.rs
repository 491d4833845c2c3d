//! Application state for Axum handlers.

use catalog_core::HealthCheck;
use catalog_service::ProductService;
use shaku::HasComponent;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub product_service: Arc<dyn ProductService>,
    /// Dependencies probed by `/ready`.
    pub health_checks: Arc<Vec<Arc<dyn HealthCheck>>>,
}

impl AppState {
    /// Creates a new application state without readiness probes.
    pub fn new(product_service: Arc<dyn ProductService>) -> Self {
        Self {
            product_service,
            health_checks: Arc::new(Vec::new()),
        }
    }

    /// Resolves the services from a Shaku module.
    pub fn from_module<M>(module: &M) -> Self
    where
        M: HasComponent<dyn ProductService>,
    {
        Self::new(module.resolve())
    }

    /// Adds a dependency to the readiness probe.
    #[must_use]
    pub fn with_health_check(mut self, check: Arc<dyn HealthCheck>) -> Self {
        Arc::make_mut(&mut self.health_checks).push(check);
        self
    }
}
