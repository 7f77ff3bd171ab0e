//! Error handling
//!
//! Every failure leaves the server as `{"detail", "error", "status"}`.
//! `detail` is human readable; `error` is a stable code.

use axum::{
    extract::{
        multipart::MultipartError,
        multipart::MultipartRejection,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use dream_core::{AnalysisError, ErrorKind};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    // Pipeline errors (bad upload / too short or flat to analyse)
    #[error(transparent)]
    Analysis(AnalysisError),

    // Request errors
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Rate limit of {limit}/min exceeded")]
    RateLimited { limit: u32 },
    /// Body, query or form the extractor could not decode
    #[error("{detail}")]
    Malformed {
        status: StatusCode,
        code: &'static str,
        detail: String,
    },

    // Capacity / upstream errors
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),
    #[error("Analysis queue is full")]
    QueueFull,
    #[error("Analysis timed out")]
    Timeout,

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(String),

    // Generic errors
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Analysis(err) => {
                let status = match (err, err.kind()) {
                    (AnalysisError::FileTooLarge { .. }, _) => StatusCode::PAYLOAD_TOO_LARGE,
                    (_, ErrorKind::Input) => StatusCode::BAD_REQUEST,
                    (_, ErrorKind::Computation) => StatusCode::UNPROCESSABLE_ENTITY,
                };
                (status, err.code(), err.to_string())
            }
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg.clone()),
            AppError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, "file_too_large", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            AppError::RateLimited { limit } => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                format!("Rate limit exceeded. Maximum {} requests per minute.", limit),
            ),
            AppError::Malformed { status, code, detail } => (*status, *code, detail.clone()),
            AppError::ModelUnavailable(_) => {
                tracing::error!("{}", self);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "model_unavailable",
                    "Prediction model is unavailable".to_string(),
                )
            }
            AppError::QueueFull => (
                StatusCode::SERVICE_UNAVAILABLE,
                "queue_full",
                "Analysis queue is full, please retry shortly".to_string(),
            ),
            AppError::Timeout => (
                StatusCode::GATEWAY_TIMEOUT,
                "timeout",
                "Analysis did not finish in time".to_string(),
            ),
            AppError::DatabaseError(_) => {
                tracing::error!("{}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "Database error occurred".to_string(),
                )
            }
            AppError::InternalError(_) => {
                tracing::error!("{}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, detail) = self.parts();

        let body = Json(json!({
            "detail": detail,
            "error": code,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        AppError::Analysis(err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge("Upload exceeds the maximum allowed size".to_string())
        } else {
            AppError::ValidationError(err.body_text())
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Malformed {
            status: rejection.status(),
            code: "invalid_json",
            detail: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Malformed {
            status: rejection.status(),
            code: "invalid_query",
            detail: rejection.body_text(),
        }
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::Malformed {
            status: rejection.status(),
            code: "invalid_multipart",
            detail: rejection.body_text(),
        }
    }
}
