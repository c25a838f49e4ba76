use rstest::rstest;

use crate::error::AppError;
use crate::jwt::JwtError;

#[rstest]
#[case(AppError::Unauthorized("test".into()), 401, "UNAUTHORIZED")]
#[case(AppError::Forbidden("test".into()), 403, "FORBIDDEN")]
#[case(AppError::NotFound("test".into()), 404, "NOT_FOUND")]
#[case(AppError::Validation("test".into()), 400, "VALIDATION_ERROR")]
#[case(AppError::InvalidState("test".into()), 400, "INVALID_STATE")]
#[case(AppError::Conflict("test".into()), 409, "CONFLICT")]
#[case(AppError::Database("test".into()), 500, "DATABASE_ERROR")]
#[case(AppError::Internal("test".into()), 500, "INTERNAL_ERROR")]
fn test_app_error_mapping(#[case] err: AppError, #[case] status: u16, #[case] code: &str) {
    assert_eq!(err.status_code(), status);
    assert_eq!(err.error_code(), code);
    assert_eq!(err.is_server_error(), status == 500);
}

#[test]
fn test_app_error_display() {
    assert_eq!(
        format!("{}", AppError::Unauthorized("msg".into())),
        "Authentication failed: msg"
    );
    assert_eq!(
        format!("{}", AppError::Forbidden("msg".into())),
        "Access denied: msg"
    );
    assert_eq!(
        format!("{}", AppError::NotFound("msg".into())),
        "Not found: msg"
    );
    assert_eq!(
        format!("{}", AppError::InvalidState("msg".into())),
        "Invalid state: msg"
    );
    assert_eq!(
        format!("{}", AppError::Database("msg".into())),
        "Database error: msg"
    );
}

#[test]
fn test_public_message_hides_server_detail() {
    let err = AppError::Database("relation \"organizations\" does not exist".into());
    assert!(!err.public_message().contains("organizations"));

    let err = AppError::InvalidState("No pending plan change request".into());
    assert_eq!(err.public_message(), "No pending plan change request");
}

#[test]
fn test_jwt_error_conversion() {
    assert_eq!(AppError::from(JwtError::Expired).status_code(), 401);
    assert_eq!(AppError::from(JwtError::Invalid).status_code(), 401);
    assert_eq!(
        AppError::from(JwtError::EncodingError("boom".into())).status_code(),
        500
    );
}
