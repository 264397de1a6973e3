//! Error-to-HTTP response conversion.
//!
//! [`AppError`] renders [`vidstore_core::Error`] as a JSON `{"error": ..}`
//! body for the API; [`PageError`] renders the plain-text responses of the
//! player pages.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use vidstore_core::Error;

/// Build a JSON error response with the given status and message.
pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

/// Log an error at a level matching its severity.
fn log_error(status: StatusCode, err: &Error) {
    if status.is_server_error() {
        tracing::error!(status = %status, error = %err, "Server error in handler");
    } else {
        tracing::debug!(status = %status, error = %err, "Request rejected");
    }
}

/// Wrapper so we can implement `IntoResponse` for an external type.
#[derive(Debug)]
pub struct AppError(pub Error);

impl From<Error> for AppError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        log_error(status, &self.0);
        json_error(status, self.0.public_message())
    }
}

/// Failure of a player page request, answered with plain text.
#[derive(Debug)]
pub enum PageError {
    MissingId,
    NotFound,
    Internal(Error),
}

impl From<Error> for PageError {
    fn from(e: Error) -> Self {
        match e {
            Error::NotFound { .. } => PageError::NotFound,
            Error::Validation(_) => PageError::MissingId,
            other => PageError::Internal(other),
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            PageError::MissingId => (StatusCode::BAD_REQUEST, "Missing video id").into_response(),
            PageError::NotFound => (StatusCode::NOT_FOUND, "Video not found").into_response(),
            PageError::Internal(err) => {
                log_error(StatusCode::INTERNAL_SERVER_ERROR, &err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}
