use axum::{http::StatusCode, response::IntoResponse};
use femfund::error::{AppError, FieldError};
use femfund::status::ApplicationStatus;
use http_body_util::BodyExt;
use sea_orm::DbErr;
use serde_json::Value;

// Test for AppError Display implementation
#[test]
fn test_app_error_display() {
    let error = AppError::NotFound("Funding option".to_string());
    assert_eq!(error.to_string(), "Funding option not found");

    let error = AppError::Unauthorized("missing bearer token".to_string());
    assert_eq!(error.to_string(), "Unauthorized: missing bearer token");

    let error = AppError::Forbidden("administrator role required".to_string());
    assert_eq!(error.to_string(), "Forbidden: administrator role required");

    let error = AppError::InvalidTransition {
        from: ApplicationStatus::Rejected,
        to: ApplicationStatus::Approved,
    };
    assert_eq!(
        error.to_string(),
        "Invalid status transition: rejected -> approved"
    );

    let error = AppError::Validation(vec![FieldError::new("amount", "Amount is required")]);
    assert_eq!(error.to_string(), "Validation failed for 1 field(s)");

    let error = AppError::InternalError("boom".to_string());
    assert_eq!(error.to_string(), "Internal Server Error: boom");
}

// Test for AppError IntoResponse implementation
#[tokio::test]
async fn test_app_error_into_response() {
    let error = AppError::NotFound("Application".to_string());
    let response = error.into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&body_bytes).unwrap();
    assert_eq!(body["error"], "Application not found");

    let error = AppError::Unauthorized("missing bearer token".to_string());
    let response = error.into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let error = AppError::Forbidden("you do not have access to this application".to_string());
    let response = error.into_response();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let error = AppError::InvalidTransition {
        from: ApplicationStatus::Funded,
        to: ApplicationStatus::Submitted,
    };
    let response = error.into_response();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&body_bytes).unwrap();
    assert_eq!(
        body["error"],
        "Invalid status transition: funded -> submitted"
    );
}

// Validation errors must list every offending field
#[tokio::test]
async fn test_validation_error_lists_fields() {
    let error = AppError::Validation(vec![
        FieldError::new("amount", "Amount is required"),
        FieldError::new("purpose", "Purpose is required"),
    ]);
    let response = error.into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&body_bytes).unwrap();
    let fields = body["fields"].as_array().unwrap();
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0]["field"], "amount");
    assert_eq!(fields[0]["message"], "Amount is required");
    assert_eq!(fields[1]["field"], "purpose");
}

// Persistence failures must not leak driver detail to the caller
#[tokio::test]
async fn test_database_error_is_generic() {
    let error = AppError::Database(DbErr::Custom("connection refused at 10.0.0.3".to_string()));
    let response = error.into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&body_bytes).unwrap();
    assert_eq!(body["error"], "Internal server error");
}
