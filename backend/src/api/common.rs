//! Error handling utilities for API responses.
//!
//! Provides the standard error response shape and the conversion between
//! service-layer errors and HTTP responses. Store failures are logged here;
//! everything user-correctable is passed through as the response message.

use crate::errors::ServiceError;
use axum::Json;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

/// Standard error body returned for every failed request
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message
    pub error: String,
}

/// Builds an error response with an explicit status and message.
pub fn error_response(
    status: StatusCode,
    message: impl Into<String>,
) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Converts ServiceError to the appropriate HTTP response.
///
/// Unknown-email and wrong-password failures share one message so callers
/// cannot probe which emails are registered.
pub fn service_error_to_http(error: ServiceError) -> (StatusCode, Json<ErrorResponse>) {
    let (status, message) = match error {
        ServiceError::Validation { message } => (StatusCode::BAD_REQUEST, message),
        ServiceError::DuplicateEmail => (
            StatusCode::CONFLICT,
            "Email is already registered".to_string(),
        ),
        ServiceError::InvalidCredentials => (
            StatusCode::UNAUTHORIZED,
            "Invalid email or password".to_string(),
        ),
        ServiceError::Unauthenticated => {
            (StatusCode::UNAUTHORIZED, "Invalid session".to_string())
        }
        ServiceError::SessionExpired => (
            StatusCode::UNAUTHORIZED,
            "Session expired. Please log in again.".to_string(),
        ),
        ServiceError::Timeout { operation } => {
            tracing::error!("Store operation timed out: {}", operation);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
        ServiceError::Database { source } => {
            tracing::error!("Database error: {}", source);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    };

    error_response(status, message)
}
