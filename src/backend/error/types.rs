/**
 * Backend Error Types
 *
 * This module defines the errors returned by HTTP handlers. Every variant
 * maps to a status code and a stable machine-readable error code.
 *
 * # Error Categories
 *
 * - `Unauthorized` - missing, invalid or revoked credentials
 * - `BadRequest` - request body failed validation
 * - `NotFound` - no route or resource for the request
 * - `Internal` / `Revocation` - server-side failures
 * - `HandlerError` - any other status chosen by a handler
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::auth::revocation::RevocationError;
use crate::backend::auth::sessions::TokenError;

/// Backend-specific error types
///
/// ```rust
/// use krawl::backend::error::BackendError;
/// use axum::http::StatusCode;
///
/// let err = BackendError::unauthorized("Authentication required");
/// assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),

    /// Handler error with an explicit status code
    #[error("Handler error: {message}")]
    HandlerError {
        status: StatusCode,
        message: String,
    },

    #[error(transparent)]
    Revocation(#[from] RevocationError),
}

impl BackendError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) | Self::Revocation(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::HandlerError { status, .. } => *status,
        }
    }

    /// Machine-readable error code for the response body
    pub fn error_code(&self) -> &'static str {
        match self.status_code() {
            StatusCode::UNAUTHORIZED => "UNAUTHORIZED",
            StatusCode::BAD_REQUEST => "VALIDATION_ERROR",
            StatusCode::NOT_FOUND => "RESOURCE_NOT_FOUND",
            StatusCode::FORBIDDEN => "FORBIDDEN",
            status if status.is_client_error() => "CLIENT_ERROR",
            _ => "INTERNAL_ERROR",
        }
    }

    /// Get the client-facing error message
    ///
    /// Server-side failures are reported generically; their cause is logged
    /// when the response is built.
    pub fn message(&self) -> String {
        match self {
            Self::Unauthorized(message)
            | Self::BadRequest(message)
            | Self::NotFound(message)
            | Self::HandlerError { message, .. } => message.clone(),
            Self::Internal(_) | Self::Revocation(_) => "An unexpected error occurred".to_string(),
        }
    }
}

impl From<TokenError> for BackendError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Internal(reason) => Self::Internal(reason),
            _ => Self::Unauthorized("Invalid or expired token".to_string()),
        }
    }
}
