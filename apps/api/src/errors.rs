#![allow(dead_code)]

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Wire shape is `{success: false, error, message?}`; `message` is omitted
/// when there is no detail beyond the category.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Image processing failed: {0}")]
    ImageProcessing(String),

    #[error("Model overloaded: {0}")]
    Overloaded(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::ImageProcessing(msg) => (
                StatusCode::BAD_REQUEST,
                "Image processing failed".to_string(),
                Some(msg.clone()),
            ),
            AppError::Overloaded(msg) => {
                tracing::error!("Model overloaded after retries: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Model overloaded".to_string(),
                    Some(msg.clone()),
                )
            }
            AppError::Generation(msg) => {
                tracing::error!("Generation failed: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Generation failed".to_string(),
                    Some(msg.clone()),
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    Some(e.to_string()),
                )
            }
        };

        let mut body = json!({
            "success": false,
            "error": error,
        });
        if let Some(message) = message {
            body["message"] = json!(message);
        }

        (status, Json(body)).into_response()
    }
}
