//! Player page handlers.
//!
//! The page is only served for ids that exist, so a shared link to an
//! unknown video fails fast instead of rendering an empty player.

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::context::{embedded_player, AppContext};
use crate::error::PageError;

#[derive(Debug, Default, Deserialize)]
pub struct PlayerQuery {
    pub id: Option<String>,
    pub format: Option<String>,
}

/// GET /video?id=
pub async fn player_by_query(
    State(ctx): State<AppContext>,
    Query(query): Query<PlayerQuery>,
) -> Result<Response, PageError> {
    render(&ctx, query.id.as_deref(), query.format.as_deref()).await
}

/// GET /video/{id} and GET /embed/{id}
pub async fn player_by_path(
    State(ctx): State<AppContext>,
    path: Result<Path<String>, PathRejection>,
    Query(query): Query<PlayerQuery>,
) -> Result<Response, PageError> {
    // An id that is not valid UTF-8 can never name a record.
    let Ok(Path(id)) = path else {
        return Err(PageError::NotFound);
    };
    render(&ctx, Some(&id), query.format.as_deref()).await
}

/// Fallback page when no static directory is served.
pub async fn embedded_shell() -> Html<&'static str> {
    Html(embedded_player())
}

async fn render(ctx: &AppContext, id: Option<&str>, format: Option<&str>) -> Result<Response, PageError> {
    let id = id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(PageError::MissingId)?;

    let record = ctx.find_video(id).await?.ok_or(PageError::NotFound)?;

    if format.is_some_and(|f| f.eq_ignore_ascii_case("json")) {
        return Ok(Json(record).into_response());
    }
    Ok(Html(ctx.player_shell().await).into_response())
}
