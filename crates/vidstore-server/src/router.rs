//! Axum router construction.
//!
//! Builds the application router with the API, player pages, middleware
//! layers, and static file serving.

use axum::extract::DefaultBodyLimit;
use axum::handler::HandlerWithoutStateExt;
use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::context::AppContext;
use crate::middleware::request_id::request_id_middleware;
use crate::routes;

/// Build the complete Axum router.
///
/// Paths outside `/api` and the player routes are served from the
/// configured static directory with `index.html` as the fallback, or by
/// the built-in player page when no static directory exists.
pub fn build_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route(
            "/videos",
            get(routes::videos::list_videos).post(routes::videos::create_video),
        )
        .route("/videos/{id}", get(routes::videos::get_video))
        .route("/video", get(routes::videos::get_video_by_query))
        .method_not_allowed_fallback(routes::videos::method_not_allowed)
        .fallback(routes::api_not_found);

    let mut app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/video", get(routes::player::player_by_query))
        .route("/video/{id}", get(routes::player::player_by_path))
        .route("/embed/{id}", get(routes::player::player_by_path))
        .nest("/api", api);

    let static_dir = ctx
        .config
        .server
        .static_dir
        .clone()
        .filter(|dir| dir.is_dir());

    app = match static_dir {
        Some(dir) => {
            tracing::info!("Serving static files from {}", dir.display());
            let index_path = dir.join("index.html");
            if index_path.is_file() {
                app.fallback_service(
                    ServeDir::new(&dir)
                        .append_index_html_on_directories(true)
                        .fallback(ServeFile::new(index_path)),
                )
            } else {
                tracing::info!(
                    "No index.html in {}; using the built-in player page",
                    dir.display()
                );
                app.fallback_service(
                    ServeDir::new(&dir)
                        .append_index_html_on_directories(false)
                        .fallback(routes::player::embedded_shell.into_service()),
                )
            }
        }
        None => app.fallback(routes::player::embedded_shell),
    };

    app.layer(DefaultBodyLimit::max(ctx.config.server.max_body_bytes))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}
