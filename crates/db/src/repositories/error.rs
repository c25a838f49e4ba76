//! Store error type shared by the entitlement repositories.

use backoffice_shared::AppError;
use sea_orm::{DbErr, SqlErr};

/// Errors raised by store operations outside the plan change workflow.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A referenced row does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// The write would duplicate an existing row.
    #[error("{0}")]
    Conflict(String),

    /// The write is not allowed in the row's current state.
    #[error("{0}")]
    InvalidState(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl StoreError {
    /// Maps a unique-constraint violation to `Conflict`, anything else to `Database`.
    pub(crate) fn from_insert(err: DbErr, conflict: impl FnOnce() -> String) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Self::Conflict(conflict()),
            _ => Self::Database(err),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => Self::NotFound(format!("{what} not found")),
            StoreError::Conflict(msg) => Self::Conflict(msg),
            StoreError::InvalidState(msg) => Self::InvalidState(msg),
            StoreError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_mapping() {
        let not_found: AppError = StoreError::NotFound("Module".into()).into();
        assert_eq!(not_found.status_code(), 404);

        let conflict: AppError = StoreError::Conflict("already granted".into()).into();
        assert_eq!(conflict.status_code(), 409);

        let state: AppError = StoreError::InvalidState("pending".into()).into();
        assert_eq!(state.status_code(), 400);

        let db: AppError = StoreError::Database(DbErr::Custom("boom".into())).into();
        assert_eq!(db.status_code(), 500);
    }

    #[test]
    fn test_non_unique_insert_error_is_database() {
        let err = StoreError::from_insert(DbErr::Custom("boom".into()), || "dup".into());
        assert!(matches!(err, StoreError::Database(_)));
    }
}
