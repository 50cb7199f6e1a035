//! Error handling for the bookshelf HTTP layer

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bookshelf_db::StoreError;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

pub const ERROR_ID_HEADER: &str = "x-error-id";

/// Body of every error response: `{"detail": ...}`.
///
/// `detail` is a plain message, except for validation failures where it is
/// the list of offending fields.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: serde_json::Value,
}

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation error: {message}")]
    Validation {
        details: Vec<serde_json::Value>,
        message: String,
    },

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create a validation error
    pub fn validation(details: Vec<serde_json::Value>, message: impl Into<String>) -> Self {
        Self::Validation {
            details,
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "validation_error",
            AppError::NotFound { .. } => "not_found",
            AppError::Internal(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn rejection(location: &str, kind: &str, message: String) -> Self {
        Self::validation(
            vec![json!({ "loc": [location], "msg": message, "type": kind })],
            format!("invalid request {location}"),
        )
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, .. } => AppError::not_found(format!("{entity} not found")),
            other => AppError::Internal(anyhow::Error::new(other)),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let kind = match &rejection {
            JsonRejection::JsonDataError(_) => "value_error",
            JsonRejection::JsonSyntaxError(_) => "json_invalid",
            JsonRejection::MissingJsonContentType(_) => "missing_content_type",
            _ => "body_unreadable",
        };
        Self::rejection("body", kind, rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::rejection("query", "value_error", rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::rejection("path", "value_error", rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::now_v7();
        let status = self.status();
        let error_code = self.code();

        match &self {
            AppError::Internal(err) => tracing::error!(
                error_id = %error_id,
                error_code = %error_code,
                status_code = %status.as_u16(),
                error = ?err,
                "Request error"
            ),
            other => tracing::warn!(
                error_id = %error_id,
                error_code = %error_code,
                status_code = %status.as_u16(),
                error = %other,
                "Request error"
            ),
        }

        let detail = match self {
            AppError::Validation { details, .. } => serde_json::Value::Array(details),
            AppError::NotFound { message } => serde_json::Value::String(message),
            // Internal details stay in the logs for release builds.
            AppError::Internal(e) => {
                if cfg!(debug_assertions) {
                    serde_json::Value::String(e.to_string())
                } else {
                    serde_json::Value::String("An internal server error occurred".to_string())
                }
            }
        };

        (
            status,
            [(ERROR_ID_HEADER, error_id.to_string())],
            Json(ErrorBody { detail }),
        )
            .into_response()
    }
}
