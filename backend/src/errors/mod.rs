//! Global application error types and handlers.
//!
//! This module defines custom error types that are used across the entire
//! backend application and provides mechanisms for consistent error handling
//! and response formatting.

use thiserror::Error;

/// Generic service error covering the account and session flows
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Email is already registered")]
    DuplicateEmail,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Session expired")]
    SessionExpired,

    #[error("Store operation timed out: {operation}")]
    Timeout { operation: String },

    #[error("Database error: {source}")]
    Database {
        #[from]
        source: anyhow::Error,
    },
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    // Helper constructors for common patterns

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::Timeout {
            operation: operation.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self::Database {
            source: anyhow::anyhow!(message),
        }
    }
}

impl From<sqlx::Error> for ServiceError {
    /// Maps store-level errors onto service errors.
    ///
    /// A unique-constraint violation surfaces as `DuplicateEmail`: the email
    /// index on `users` is the only place concurrent inserts can collide.
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return ServiceError::DuplicateEmail;
            }
        }
        ServiceError::Database { source: err.into() }
    }
}
