use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use utoipa::ToSchema;

use crate::status::ApplicationStatus;

/// One offending field in a rejected request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug)]
pub enum AppError {
    /// Request body failed validation; carries every offending field.
    Validation(Vec<FieldError>),
    /// Unknown funding option, application, or resource id.
    NotFound(String),
    /// Missing or unverifiable bearer token.
    Unauthorized(String),
    /// Authenticated but not allowed, e.g. another user's application.
    Forbidden(String),
    /// Workflow rejected a backward or skipping status change.
    InvalidTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
    /// Persistence failure; surfaced generically, detail stays in the logs.
    Database(DbErr),
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(errors) => {
                write!(f, "Validation failed for {} field(s)", errors.len())
            }
            AppError::NotFound(what) => write!(f, "{} not found", what),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::InvalidTransition { from, to } => write!(
                f,
                "Invalid status transition: {} -> {}",
                from.as_str(),
                to.as_str()
            ),
            AppError::Database(err) => write!(f, "Database error: {}", err),
            AppError::InternalError(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Database(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": self.to_string(),
                    "fields": errors,
                }),
            ),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, json!({ "error": self.to_string() })),
            AppError::Unauthorized(_) => {
                (StatusCode::UNAUTHORIZED, json!({ "error": self.to_string() }))
            }
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, json!({ "error": self.to_string() })),
            AppError::InvalidTransition { .. } => {
                (StatusCode::CONFLICT, json!({ "error": self.to_string() }))
            }
            AppError::Database(err) => {
                // Do not leak driver internals to the caller.
                tracing::error!("database error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
            AppError::InternalError(msg) => {
                tracing::error!("internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
