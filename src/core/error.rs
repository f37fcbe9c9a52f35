use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::shared::types::ApiResponse;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Expired: {0}")]
    Expired(String),

    #[error("Transition rejected: {0}")]
    TransitionRejected(String),

    #[error("No responsible role for category: {0}")]
    NoRoleForCategory(String),

    #[error("No officers available: {0}")]
    NoOfficersAvailable(String),

    #[error("Photo processing failed: {0}")]
    PhotoProcessingFailed(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                    None,
                )
            }
            AppError::NotFound(ref msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
            AppError::Validation(ref msg) => (
                StatusCode::BAD_REQUEST,
                msg.clone(),
                Some(vec![msg.clone()]),
            ),
            AppError::Expired(ref msg) => (StatusCode::GONE, msg.clone(), None),
            AppError::TransitionRejected(ref msg) => (StatusCode::CONFLICT, msg.clone(), None),
            // Assignment configuration gaps must alert operators through the
            // log while the citizen-visible flow fails like any other outage.
            AppError::NoRoleForCategory(ref msg) | AppError::NoOfficersAvailable(ref msg) => {
                tracing::error!("Assignment configuration gap: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Report assignment is currently unavailable".to_string(),
                    None,
                )
            }
            AppError::PhotoProcessingFailed(ref msg) => {
                tracing::error!("Photo processing failed: {}", msg);
                (StatusCode::BAD_GATEWAY, msg.clone(), None)
            }
            AppError::Storage(ref msg) => {
                tracing::error!("Storage error: {}", msg);
                (StatusCode::BAD_GATEWAY, msg.clone(), None)
            }
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let body = Json(ApiResponse::<()>::error(Some(message), errors));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
