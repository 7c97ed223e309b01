//! Error types for the console HTTP layer.
//!
//! [`HttpError`] is the single error type returned by handlers and
//! short-circuiting middleware. Its [`IntoResponse`] implementation
//! produces the JSON envelope `{"error": <message>, "status": <code>}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use console_core::CoreError;

/// Errors surfaced to HTTP clients.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// The request was malformed.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request body was not received in time.
    #[error("request timeout: {0}")]
    Timeout(String),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl HttpError {
    /// The status code this error maps to.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CoreError> for HttpError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { .. } => Self::NotFound(err.to_string()),
            CoreError::Service(_) | CoreError::Token(_) => Self::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::BadRequest(msg)
            | Self::NotFound(msg)
            | Self::Timeout(msg)
            | Self::Internal(msg) => msg,
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
