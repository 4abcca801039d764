//! Custom error types for the API service

use approvals::ApprovalError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or invalid bearer token
    #[error("Unauthorized")]
    Unauthorized,

    /// Approval workflow error
    #[error(transparent)]
    Approval(#[from] ApprovalError),
}

impl ApiError {
    fn status_and_message(self) -> (StatusCode, String) {
        match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::Approval(err) => match err {
                ApprovalError::Unauthenticated => (
                    StatusCode::UNAUTHORIZED,
                    "Authentication required".to_string(),
                ),
                ApprovalError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
                ApprovalError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
                ApprovalError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
                ApprovalError::Conflict(msg) => (StatusCode::CONFLICT, msg),
                ApprovalError::Store(e) => {
                    error!("Approval store failure: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Database error".to_string(),
                    )
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = self.status_and_message();

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
