//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Access denied.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Operation not allowed in the entity's current state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Conflict (e.g., duplicate entry).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Validation(_) | Self::InvalidState(_) => 400,
            Self::Conflict(_) => 409,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidState(_) => "INVALID_STATE",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true for failures that are the server's fault.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Internal(_))
    }

    /// Message safe to show to API clients.
    ///
    /// Server errors never expose their detail.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::NotFound(msg)
            | Self::Validation(msg)
            | Self::InvalidState(msg)
            | Self::Conflict(msg) => msg.clone(),
            Self::Database(_) | Self::Internal(_) => {
                "An internal error occurred. Please try again later.".to_string()
            }
        }
    }
}

impl From<crate::jwt::JwtError> for AppError {
    fn from(err: crate::jwt::JwtError) -> Self {
        match err {
            crate::jwt::JwtError::Expired => Self::Unauthorized("Session has expired".to_string()),
            crate::jwt::JwtError::EncodingError(msg) => Self::Internal(msg),
            crate::jwt::JwtError::DecodingError(_) | crate::jwt::JwtError::Invalid => {
                Self::Unauthorized("Invalid session".to_string())
            }
        }
    }
}
