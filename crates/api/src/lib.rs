//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - The platform admin plan change endpoints
//! - Tenant-scoped organization, grant and catalog routes under `/api`
//! - Session authentication middleware and the tenant context extractor
//! - Post-commit notification dispatch

pub mod error;
pub mod middleware;
pub mod notify;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use backoffice_core::entitlement::TierModuleMap;
use backoffice_shared::{JwtService, Notifier};

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for session tokens.
    pub jwt_service: Arc<JwtService>,
    /// Sink for plan change notifications.
    pub notifier: Arc<dyn Notifier>,
    /// Tier to module-type entitlements.
    pub tier_map: Arc<TierModuleMap>,
}

/// Creates the main application router.
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    routes::routes_with_state(state.clone())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
