use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::analyzer::AnalysisError;
use crate::intake::ImageIntakeError;

pub const MISSING_KEY_HINT: &str = concat!(
    "Please enter your API Key to start. ",
    "Get a free key at Google AI Studio (https://aistudio.google.com/)."
);

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

impl From<ImageIntakeError> for AppError {
    fn from(err: ImageIntakeError) -> Self {
        match err {
            ImageIntakeError::UnsupportedType(_) => AppError::UnsupportedMediaType(err.to_string()),
            ImageIntakeError::Empty | ImageIntakeError::Decode { .. } => {
                AppError::Validation(err.to_string())
            }
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return AppError::PayloadTooLarge(err.body_text());
        }
        AppError::Validation(format!("Invalid multipart body: {}", err.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut raw_output = None;
        let mut stage = None;
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnsupportedMediaType(msg) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_MEDIA_TYPE",
                msg.clone(),
            ),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                MISSING_KEY_HINT.to_string(),
            ),
            AppError::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                msg.clone(),
            ),
            AppError::Analysis(e) => {
                raw_output = e.raw_output().map(str::to_string);
                match e {
                    AnalysisError::BackendUnavailable(_) => {
                        tracing::error!("Backend unavailable: {e}");
                        (StatusCode::SERVICE_UNAVAILABLE, "BACKEND_UNAVAILABLE", e.to_string())
                    }
                    AnalysisError::ResponseUnparseable { reached, .. } => {
                        stage = Some(*reached);
                        tracing::error!("Analysis failed at stage {reached:?}: {e}");
                        (StatusCode::BAD_GATEWAY, "RESPONSE_UNPARSEABLE", e.to_string())
                    }
                }
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
                "raw_output": raw_output,
                "stage": stage
            }
        }));

        (status, body).into_response()
    }
}
