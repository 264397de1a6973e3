//! Video record API handlers.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use vidstore_core::{Error, NewVideo, VideoRecord};

use crate::context::AppContext;
use crate::error::{json_error, AppError};

/// Request body for creating a video record.
///
/// `servers` stays untyped here so that a missing, `null`, non-array, or
/// empty value is reported uniformly by [`NewVideo::new`].
#[derive(Debug, Deserialize)]
pub struct CreateVideoRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub servers: Option<Value>,
}

/// Response for a newly created record.
#[derive(Debug, Serialize)]
pub struct CreateVideoResponse {
    pub id: String,
    pub url: String,
}

/// Query for the legacy `GET /api/video?id=` form.
#[derive(Debug, Deserialize)]
pub struct VideoQuery {
    pub id: Option<String>,
}

/// POST /api/videos
pub async fn create_video(
    State(ctx): State<AppContext>,
    payload: Result<Json<CreateVideoRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return Ok(reject_body(rejection)),
    };

    let new = NewVideo::new(payload.title, payload.servers)?;
    let record = ctx.create_video(new).await?;

    tracing::info!(id = %record.id, backend = ctx.store.backend(), "Video created");

    let body = CreateVideoResponse {
        id: record.id.to_string(),
        url: ctx.player_url(record.id),
    };
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

/// GET /api/videos/{id}
///
/// An id that cannot be decoded from the path is reported as not found,
/// the same as any other malformed id.
pub async fn get_video(
    State(ctx): State<AppContext>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<VideoRecord>, AppError> {
    let Path(id) = path.map_err(|rejection| {
        tracing::debug!("Undecodable video id: {}", rejection.body_text());
        Error::not_found("video", "<undecodable>")
    })?;

    let record = ctx
        .find_video(&id)
        .await?
        .ok_or_else(|| Error::not_found("video", &id))?;
    Ok(Json(record))
}

/// GET /api/video?id=
pub async fn get_video_by_query(
    State(ctx): State<AppContext>,
    query: Result<Query<VideoQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            return Ok(json_error(
                StatusCode::BAD_REQUEST,
                format!("invalid query string: {}", rejection.body_text()),
            ))
        }
    };

    let id = query
        .id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| Error::validation("Missing id"))?;

    let record = ctx
        .find_video(&id)
        .await?
        .ok_or_else(|| Error::not_found("video", &id))?;
    Ok(Json(record).into_response())
}

/// GET /api/videos
pub async fn list_videos(State(ctx): State<AppContext>) -> Result<Response, AppError> {
    if !ctx.config.server.enable_listing {
        return Ok(super::api_not_found().await);
    }

    let mut records = ctx.list_videos().await?;
    records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    Ok(Json(records).into_response())
}

/// Fallback for `/api` paths hit with an unsupported method.
pub async fn method_not_allowed() -> Response {
    json_error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

/// Map a body that failed to extract to a JSON error response.
fn reject_body(rejection: JsonRejection) -> Response {
    let status = rejection.status();
    tracing::debug!(status = %status, "Rejected request body: {}", rejection.body_text());

    if status == StatusCode::PAYLOAD_TOO_LARGE {
        return json_error(status, "request body too large");
    }
    json_error(
        StatusCode::BAD_REQUEST,
        format!("invalid JSON body: {}", rejection.body_text()),
    )
}
