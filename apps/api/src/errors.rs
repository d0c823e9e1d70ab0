use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::model::ModelError;
use crate::ocr::OcrError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Only fatal pipeline conditions live here. Recoverable extraction failures
/// are `Diagnostic` values, which are successful JSON responses, not errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("S3 error: {0}")]
    S3(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Ocr(e @ OcrError::JobFailed { .. }) => {
                tracing::error!("OCR job failed: {e}");
                (StatusCode::BAD_GATEWAY, "OCR_JOB_FAILED", e.to_string())
            }
            AppError::Ocr(e @ OcrError::TimedOut { .. }) => {
                tracing::error!("OCR job timed out: {e}");
                (StatusCode::GATEWAY_TIMEOUT, "OCR_JOB_TIMEOUT", e.to_string())
            }
            AppError::Ocr(e) => {
                tracing::error!("OCR service error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "OCR_SERVICE_ERROR",
                    "The OCR service returned an error".to_string(),
                )
            }
            AppError::Model(e) => {
                tracing::error!("Model error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "MODEL_UNAVAILABLE",
                    "The text-generation service is unavailable".to_string(),
                )
            }
            AppError::S3(msg) => {
                tracing::error!("S3 error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "S3_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
