use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Hints returned with every rejected prediction request
pub const PREDICT_HINTS: [&str; 3] = [
    "Check the numbers",
    "Must be float",
    "It is recommended avoid all zeros in petition",
];

#[derive(Error, Debug)]
pub enum ApiError {
    /// Bad body, missing or unreadable model, non-finite feature
    #[error("result: invalid format ({0})")]
    InvalidPrediction(String),

    #[error("An error occurred: {0}")]
    Training(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InvalidPrediction(_) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "detail": {
                        "message": "result: invalid format",
                        "hints": PREDICT_HINTS,
                    }
                })),
            )
                .into_response(),
            ApiError::Training(_) | ApiError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": self.to_string() })),
            )
                .into_response(),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("blocking task failed: {err}"))
    }
}
