// SPDX-License-Identifier: MIT

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Missing OAuth client configuration: {0}")]
    Configuration(&'static str),

    #[error("User not authenticated with Google Calendar: {0}")]
    NotAuthenticated(String),

    #[error("Unknown or expired auth state")]
    InvalidState,

    #[error("Google API error: {0}")]
    GoogleApi(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Configuration(name) => {
                tracing::error!(missing = name, "OAuth client configuration incomplete");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "configuration_error",
                    None,
                )
            }
            AppError::NotAuthenticated(email) => (
                StatusCode::UNAUTHORIZED,
                "not_authenticated",
                Some(format!("No Google Calendar credentials for {}", email)),
            ),
            AppError::InvalidState => (
                StatusCode::BAD_REQUEST,
                "invalid_state",
                Some("Unknown or expired auth state".to_string()),
            ),
            AppError::GoogleApi(msg) => (
                StatusCode::BAD_GATEWAY,
                "google_api_error",
                Some(msg.clone()),
            ),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
