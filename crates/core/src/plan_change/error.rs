//! Plan change error types.

use backoffice_shared::AppError;
use backoffice_shared::types::{OrganizationId, PlanId};
use thiserror::Error;

use crate::plan_change::types::OrganizationStatus;

/// Errors that can occur while changing an organization's plan.
#[derive(Debug, Error)]
pub enum PlanChangeError {
    /// Approve or reject called without an outstanding request.
    #[error("Organization {0} has no pending plan change request")]
    NoPendingRequest(OrganizationId),

    /// Approve called with a plan other than the requested one.
    #[error("Plan {provided} does not match the requested plan {requested}")]
    PlanMismatch {
        /// The plan that was requested.
        requested: PlanId,
        /// The plan supplied to approve.
        provided: PlanId,
    },

    /// The organization's status does not allow a plan change request.
    #[error("Cannot request a plan change while organization is {status}")]
    RequestNotAllowed {
        /// Current status.
        status: OrganizationStatus,
    },

    /// The organization is already on the requested plan.
    #[error("Organization is already on plan {0}")]
    AlreadyOnPlan(PlanId),

    /// The requested plan is not offered.
    #[error("Plan {0} is not active")]
    InactivePlan(PlanId),

    /// Organization not found.
    #[error("Organization {0} not found")]
    OrganizationNotFound(OrganizationId),

    /// Plan not found.
    #[error("Plan {0} not found")]
    PlanNotFound(PlanId),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl PlanChangeError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NoPendingRequest(_)
            | Self::PlanMismatch { .. }
            | Self::RequestNotAllowed { .. }
            | Self::AlreadyOnPlan(_)
            | Self::InactivePlan(_) => 400,

            Self::OrganizationNotFound(_) | Self::PlanNotFound(_) => 404,

            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NoPendingRequest(_) => "NO_PENDING_REQUEST",
            Self::PlanMismatch { .. } => "PLAN_MISMATCH",
            Self::RequestNotAllowed { .. } => "REQUEST_NOT_ALLOWED",
            Self::AlreadyOnPlan(_) => "ALREADY_ON_PLAN",
            Self::InactivePlan(_) => "INACTIVE_PLAN",
            Self::OrganizationNotFound(_) => "ORGANIZATION_NOT_FOUND",
            Self::PlanNotFound(_) => "PLAN_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<PlanChangeError> for AppError {
    fn from(err: PlanChangeError) -> Self {
        match err {
            PlanChangeError::OrganizationNotFound(_) | PlanChangeError::PlanNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            PlanChangeError::Database(msg) => Self::Database(msg),
            _ => Self::InvalidState(err.to_string()),
        }
    }
}
