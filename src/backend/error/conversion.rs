/**
 * Error Conversion
 *
 * All backend errors implement `IntoResponse`, so handlers and extractors can
 * return them directly.
 *
 * # Response Format
 *
 * ```json
 * {
 *   "error": "UNAUTHORIZED",
 *   "message": "Authentication required",
 *   "status": 401
 * }
 * ```
 */

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::backend::error::types::BackendError;

/// JSON body of every error response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    pub status: u16,
}

impl From<&BackendError> for ErrorBody {
    fn from(err: &BackendError) -> Self {
        Self {
            error: err.error_code(),
            message: err.message(),
            status: err.status_code().as_u16(),
        }
    }
}

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        (status, Json(ErrorBody::from(&self))).into_response()
    }
}
