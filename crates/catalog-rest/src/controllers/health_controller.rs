//! Health check controller.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use utoipa::ToSchema;

/// Liveness response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status.
    pub status: String,
    /// Time of the check.
    pub timestamp: DateTime<Utc>,
}

/// Status of one dependency.
#[derive(Debug, Serialize, ToSchema)]
pub struct ComponentHealth {
    pub name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Readiness response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadinessResponse {
    /// `ready` unless some dependency is unhealthy.
    pub status: String,
    pub checks: Vec<ComponentHealth>,
    pub timestamp: DateTime<Utc>,
}

/// Creates the health router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
    })
}

/// Readiness probe.
///
/// A degraded dependency (the cache) still counts as ready.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "health",
    responses(
        (status = 200, description = "Service is ready", body = ReadinessResponse),
        (status = 503, description = "A required dependency is down", body = ReadinessResponse)
    )
)]
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let statuses = join_all(state.health_checks.iter().map(|check| check.check())).await;

    let ready = statuses.iter().all(|status| !status.is_unhealthy());
    let checks = state
        .health_checks
        .iter()
        .zip(statuses)
        .map(|(check, status)| ComponentHealth {
            name: check.name().to_string(),
            status: status.label().to_string(),
            message: status.message().map(ToString::to_string),
        })
        .collect();

    let code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        code,
        Json(ReadinessResponse {
            status: if ready { "ready" } else { "not_ready" }.to_string(),
            checks,
            timestamp: Utc::now(),
        }),
    )
}
