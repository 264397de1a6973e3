//! Route handlers.

pub mod health;
pub mod player;
pub mod videos;

use axum::http::StatusCode;
use axum::response::Response;

use crate::error::json_error;

/// Fallback for unmatched `/api` paths.
pub async fn api_not_found() -> Response {
    json_error(StatusCode::NOT_FOUND, "not found")
}
