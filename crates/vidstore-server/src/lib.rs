//! vidstore-server: the HTTP façade over a record store.
//!
//! This crate exposes the JSON API for creating and fetching video records,
//! the player pages that shared links point to, and a health endpoint.
//! The store is opened by the caller and handed to [`start`], which closes
//! it again once the server has drained.

pub mod context;
pub mod error;
pub mod middleware;
pub mod router;
pub mod routes;

use std::future::Future;
use std::sync::Arc;

use tokio::net::TcpListener;
use vidstore_core::config::Config;
use vidstore_core::{Error, Result};
use vidstore_db::RecordStore;

use crate::context::AppContext;

/// Start the vidstore server.
///
/// Binds the configured address, serves until SIGINT or SIGTERM, then
/// closes the store.
pub async fn start(config: Config, store: Arc<dyn RecordStore>) -> Result<()> {
    for warning in config.validate() {
        tracing::warn!("Config warning: {warning}");
    }

    let host = config.server.host.clone();
    let port = config.server.port;
    let listener = TcpListener::bind((host.as_str(), port))
        .await
        .map_err(|e| Error::Internal(format!("Failed to bind to {host}:{port}: {e}")))?;

    let ctx = AppContext::new(config, store);
    serve(listener, ctx, shutdown_signal()).await
}

/// Serve on an already-bound listener until `shutdown` resolves.
///
/// In-flight requests are allowed to finish before the store is closed.
pub async fn serve<F>(listener: TcpListener, ctx: AppContext, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    let store = ctx.store.clone();
    let app = router::build_router(ctx);

    tracing::info!("Starting server on {addr} ({} backend)", store.backend());

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await;

    if let Err(e) = store.close().await {
        tracing::warn!("Failed to close record store: {e}");
    }
    served?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("Shutdown signal received");
}
