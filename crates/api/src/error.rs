//! API error responses.
//!
//! Every failure leaves the API as `{ "success": false, "message": ... }`
//! with the status code of the underlying [`AppError`].

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde_json::json;
use tracing::{error, warn};

use backoffice_core::plan_change::PlanChangeError;
use backoffice_core::tenant::TenantError;
use backoffice_db::repositories::StoreError;
use backoffice_shared::AppError;

/// Wrapper turning [`AppError`] into an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    /// A 400 for malformed input.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self(AppError::Validation(message.into()))
    }

    /// The HTTP status of this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<PlanChangeError> for ApiError {
    fn from(err: PlanChangeError) -> Self {
        Self(err.into())
    }
}

impl From<TenantError> for ApiError {
    fn from(err: TenantError) -> Self {
        Self(err.into())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self(err.into())
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        Self(AppError::Database(err.to_string()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.0.is_server_error() {
            error!(error = %self.0, code = self.0.error_code(), "Request failed");
        } else if status == StatusCode::FORBIDDEN {
            warn!(error = %self.0, "Request forbidden");
        }

        (
            status,
            Json(json!({
                "success": false,
                "message": self.0.public_message(),
                "code": self.0.error_code(),
            })),
        )
            .into_response()
    }
}
