//! Health check handler.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::context::AppContext;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub backend: &'static str,
}

/// GET /health
///
/// Always answers 200; `ok` reports whether the store is reachable.
pub async fn health_check(State(ctx): State<AppContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: ctx.is_healthy().await,
        backend: ctx.store.backend(),
    })
}
