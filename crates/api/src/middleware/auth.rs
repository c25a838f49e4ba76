//! Session authentication for protected routes.
//!
//! The session token is read from an `Authorization: Bearer` header or, for
//! browser clients, from the `session` cookie.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use crate::{AppState, error::ApiError};
use backoffice_core::tenant::{TenantContext, TenantError};
use backoffice_shared::{AppError, Claims, JwtError};

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session";

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Finds the session token, preferring the Authorization header.
fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_bearer_token)
        .map(ToString::to_string);

    bearer.or_else(|| {
        CookieJar::from_headers(headers)
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
    })
}

/// Validates the session token and stores its claims in request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = session_token(request.headers()) else {
        return ApiError(AppError::Unauthorized(
            "A session token is required".to_string(),
        ))
        .into_response();
    };

    match state.jwt_service.validate_token(&token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => {
            debug!(error = %e, "Rejected session token");
            let message = match e {
                JwtError::Expired => "Session has expired",
                _ => "Invalid or malformed session token",
            };
            ApiError(AppError::Unauthorized(message.to_string())).into_response()
        }
    }
}

/// Extractor for the authenticated tenant context.
///
/// ```ignore
/// async fn handler(AuthUser(ctx): AuthUser) -> impl IntoResponse {
///     let org = ctx.current_organization_id();
///     // ...
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub TenantContext);

impl AuthUser {
    /// Returns the tenant context.
    #[must_use]
    pub const fn context(&self) -> &TenantContext {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<Claims>()
            .ok_or(TenantError::Unauthenticated)?;
        Ok(Self(TenantContext::from_claims(claims)?))
    }
}
