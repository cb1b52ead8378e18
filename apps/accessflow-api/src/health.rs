//! Health endpoint.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// "healthy", "degraded" or "shutting_down".
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    /// "connected", "unreachable", or null when running without a database.
    pub database: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Report service health.
///
/// Returns 503 while shutting down or when the database cannot be reached.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is degraded or shutting down", body = HealthResponse)
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = match &state.db {
        Some(pool) => match pool.ping().await {
            Ok(()) => Some("connected"),
            Err(e) => {
                tracing::warn!(error = %e, "Health check database ping failed");
                Some("unreachable")
            }
        },
        None => None,
    };

    let (status_code, status) = if state.is_shutting_down() {
        (StatusCode::SERVICE_UNAVAILABLE, "shutting_down")
    } else if database == Some("unreachable") {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    } else {
        (StatusCode::OK, "healthy")
    };

    (
        status_code,
        Json(HealthResponse {
            status: status.to_string(),
            version: state.version.to_string(),
            uptime_seconds: state.uptime_seconds(),
            database: database.map(str::to_string),
            timestamp: Utc::now(),
        }),
    )
}
