//! Error model tests

use axum::http::StatusCode;
use ict_inventory::error::AppError;

#[test]
fn test_error_status_codes() {
    assert_eq!(AppError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(AppError::Forbidden.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(AppError::NotFound.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(
        AppError::Validation(vec!["x".to_string()]).status_code(),
        StatusCode::UNPROCESSABLE_ENTITY
    );
    assert_eq!(
        AppError::BadRequest("invalid".to_string()).status_code(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        AppError::Database(sqlx::Error::RowNotFound).status_code(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        AppError::Storage("disk full".to_string()).status_code(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[test]
fn test_validation_error_carries_all_rule_violations() {
    let err = AppError::Validation(vec![
        "Serial number is required".to_string(),
        "Province is required".to_string(),
        "Acquisition Type is required".to_string(),
    ]);
    let text = err.to_string();
    assert!(text.contains("Serial number is required"));
    assert!(text.contains("Province is required"));
    assert!(text.contains("Acquisition Type is required"));
}

#[test]
fn test_user_messages_hide_internals() {
    let db = AppError::Database(sqlx::Error::PoolTimedOut);
    assert_eq!(db.user_message(), "Database error occurred");

    let storage = AppError::Storage("/var/lib/ict-inventory/uploads: permission denied".to_string());
    assert_eq!(storage.user_message(), "Storage error occurred");
    assert!(!storage.user_message().contains("/var/lib"));

    // Bad requests are user-caused; the message passes through.
    let bad = AppError::BadRequest("Unknown report type: everything".to_string());
    assert_eq!(bad.user_message(), "Unknown report type: everything");
}
