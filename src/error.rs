//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;

use crate::model::InferenceError;

pub type AppResult<T> = Result<T, AppError>;

/// Where clients can fetch a correctly shaped batch file
pub const TEMPLATE_HINT: &str = "/api/v1/sample/template";

#[derive(Debug)]
pub enum AppError {
    // Input errors
    InvalidInput(String),

    /// Batch table has the wrong shape; the response points at the template
    InvalidBatch(String),

    ValidationError(String),

    PayloadTooLarge(String),

    // Model errors
    InferenceFailed(String),

    // Generic errors
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            AppError::InvalidBatch(msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            AppError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg.as_str()),
            AppError::InferenceFailed(msg) => {
                tracing::error!("Inference error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Prediction failed")
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let mut body = json!({
            "error": error_message,
            "status": status.as_u16()
        });

        if matches!(self, AppError::InvalidBatch(_)) {
            body["template"] = json!(TEMPLATE_HINT);
        }

        (status, Json(body)).into_response()
    }
}

impl From<InferenceError> for AppError {
    fn from(err: InferenceError) -> Self {
        let batch_shape = matches!(
            &err,
            InferenceError::MissingColumn(_)
                | InferenceError::UnexpectedColumn(_)
                | InferenceError::MalformedTable(_)
        );

        if batch_shape {
            AppError::InvalidBatch(err.to_string())
        } else if err.is_input_error() {
            AppError::InvalidInput(err.to_string())
        } else {
            AppError::InferenceFailed(err.to_string())
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::InternalError(err.to_string())
    }
}
