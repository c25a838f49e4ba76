//! Tenant scoping errors.

use backoffice_shared::AppError;
use backoffice_shared::auth::Role;
use backoffice_shared::types::OrganizationId;
use thiserror::Error;

/// Errors raised while scoping a request to a tenant.
#[derive(Debug, Error)]
pub enum TenantError {
    /// No usable session.
    #[error("Authentication required")]
    Unauthenticated,

    /// The request targets another organization.
    #[error("Access to organization {target} is not allowed")]
    Forbidden {
        /// Organization the request tried to reach.
        target: OrganizationId,
    },

    /// The session role is too weak for the operation.
    #[error("Role {role} is not allowed to {action}")]
    InsufficientRole {
        /// The session role.
        role: Role,
        /// What was attempted.
        action: &'static str,
    },
}

impl TenantError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthenticated => 401,
            Self::Forbidden { .. } | Self::InsufficientRole { .. } => 403,
        }
    }
}

impl From<TenantError> for AppError {
    fn from(err: TenantError) -> Self {
        match err {
            TenantError::Unauthenticated => Self::Unauthorized(err.to_string()),
            TenantError::Forbidden { .. } | TenantError::InsufficientRole { .. } => {
                Self::Forbidden(err.to_string())
            }
        }
    }
}
