//! # Catalog REST
//!
//! HTTP adapter for the product catalog using Axum.
//! Exposes product create/get/list, liveness and readiness probes and the
//! OpenAPI document.

pub mod controllers;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod responses;
pub mod router;
pub mod state;

pub use router::*;
pub use state::*;
