//! API route definitions.

use axum::{Json, Router, extract::rejection::JsonRejection, middleware};

use crate::{AppState, error::ApiError, middleware::auth::auth_middleware};

pub mod catalog;
pub mod health;
pub mod organizations;
pub mod plan_changes;

/// Creates the router: public health check plus session-protected routes.
#[allow(clippy::needless_pass_by_value)]
pub fn routes_with_state(state: AppState) -> Router<AppState> {
    let tenant_routes = Router::new()
        .merge(organizations::routes())
        .merge(catalog::routes());

    let protected_routes = Router::new()
        .merge(plan_changes::routes())
        .nest("/api", tenant_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(health::routes())
        .merge(protected_routes)
}

/// Unwraps a JSON body, turning a malformed one into a 400.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::validation(rejection.body_text()))
}

/// Returns the value or a 400 naming the missing field.
fn required<T>(value: Option<T>, field: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::validation(format!("{field} is required")))
}
