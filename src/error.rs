//! Error types and error handling for the application
//!
//! This module defines custom error types that can be converted to HTTP responses.
//! All errors implement `IntoResponse` to provide consistent error formatting.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Message returned for every authentication failure, whatever the cause
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid credentials";

/// Application-level error types
///
/// All errors that can occur in the application are represented by this enum.
/// Each variant implements automatic conversion to HTTP responses via `IntoResponse`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request body failed validation
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Bad password, unknown login id, or an invalid/expired token.
    /// Deliberately carries no detail.
    #[error("{}", INVALID_CREDENTIALS_MESSAGE)]
    InvalidCredentials,

    /// Measurement with the given ID was not found
    #[error("Log not found: {0}")]
    MeasurementNotFound(i64),

    /// Login id is already registered
    #[error("Login id already registered: {0}")]
    LoginIdTaken(String),

    /// Password hashing failed
    #[error("Password error: {0}")]
    Password(#[from] crate::auth::PasswordError),

    /// Token could not be issued
    #[error("Token error: {0}")]
    Token(#[from] crate::auth::TokenError),

    /// Internal server error (catch-all for unexpected errors)
    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::MeasurementNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::LoginIdTaken(_) => (StatusCode::CONFLICT, self.to_string()),
            AppError::Password(_) | AppError::Token(_) | AppError::Internal(_) => {
                tracing::error!(error = %self, "Request failed with internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
