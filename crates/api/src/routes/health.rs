//! Health check endpoint.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use sea_orm::ConnectionTrait;
use serde::Serialize;
use tracing::error;

use crate::AppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Database reachability.
    pub database: &'static str,
    /// Service version.
    pub version: &'static str,
}

/// Health check handler.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (status, database) = match state.db.execute_unprepared("SELECT 1").await {
        Ok(_) => (StatusCode::OK, "up"),
        Err(e) => {
            error!(error = %e, "Database health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "down")
        }
    };

    (
        status,
        Json(HealthResponse {
            status: if status.is_success() {
                "healthy"
            } else {
                "degraded"
            },
            database,
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}

/// Creates health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
