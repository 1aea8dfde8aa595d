//! Application error type

use super::codes::ErrorCode;
use thiserror::Error;

/// Application error with a structured error code
///
/// The message is what the session dispatcher writes into the failure
/// response; the code is what clients branch on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AppError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    // ==================== Convenience constructors ====================

    /// Unified login failure, used for both unknown user and wrong password
    pub fn invalid_credentials() -> Self {
        Self::new(ErrorCode::InvalidCredentials)
    }

    pub fn not_authenticated() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::PermissionDenied, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, message)
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::PersistenceFailure, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::MalformedRequest, message)
    }

    pub fn unsupported(request_type: &str) -> Self {
        Self::with_message(
            ErrorCode::UnsupportedRequest,
            format!("Unsupported request: {}", request_type),
        )
    }

    pub fn order_not_found(order_id: u64) -> Self {
        Self::with_message(
            ErrorCode::OrderNotFound,
            format!("Order not found: {}", order_id),
        )
    }

    /// Failures caused by the server rather than by the request
    pub fn is_server_error(&self) -> bool {
        matches!(
            self.code.category(),
            super::ErrorCategory::Persistence | super::ErrorCategory::System
        )
    }
}

pub type AppResult<T> = Result<T, AppError>;
