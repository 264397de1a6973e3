//! Application context shared across route handlers.
//!
//! [`AppContext`] is handed to every handler via Axum state. It owns the
//! record store handle and the resolved configuration, and routes every
//! store call through a bounded timeout.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use vidstore_core::config::Config;
use vidstore_core::{Error, NewVideo, Result, VideoId, VideoRecord};
use vidstore_db::RecordStore;

/// The player page used when no static directory provides one.
const EMBEDDED_PLAYER: &str = include_str!("../assets/player.html");

/// Central application state, cheap to clone.
#[derive(Clone)]
pub struct AppContext {
    pub store: Arc<dyn RecordStore>,
    pub config: Arc<Config>,
}

impl AppContext {
    pub fn new(config: Config, store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// Upper bound on any single store call.
    pub fn storage_timeout(&self) -> Duration {
        self.config.storage.timeout()
    }

    /// Await a store call, failing with [`Error::Timeout`] when it overruns.
    ///
    /// Expiry abandons the call rather than cancelling it. A create whose
    /// write has already been handed to a blocking thread or the database
    /// can still commit after the caller has seen the timeout, so a timed-out
    /// create may later appear in lookups and listings.
    pub async fn bounded<T, F>(&self, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let limit = self.storage_timeout();
        tokio::time::timeout(limit, call)
            .await
            .map_err(|_| Error::Timeout(limit))?
    }

    pub async fn create_video(&self, new: NewVideo) -> Result<VideoRecord> {
        self.bounded(self.store.create(new)).await
    }

    /// Look up a record by its textual id; malformed ids are simply absent.
    pub async fn find_video(&self, raw_id: &str) -> Result<Option<VideoRecord>> {
        self.bounded(self.store.get_by_str(raw_id)).await
    }

    pub async fn list_videos(&self) -> Result<Vec<VideoRecord>> {
        self.bounded(self.store.list()).await
    }

    /// Whether the backing medium answered a ping in time.
    pub async fn is_healthy(&self) -> bool {
        match self.bounded(self.store.ping()).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(backend = self.store.backend(), error = %e, "Health check failed");
                false
            }
        }
    }

    /// Shareable player link for a record.
    pub fn player_url(&self, id: VideoId) -> String {
        let base = self.config.server.public_url.trim_end_matches('/');
        format!("{base}/video?id={id}")
    }

    /// The player HTML shell.
    ///
    /// Prefers `index.html` from the configured static directory and falls
    /// back to the embedded page when it is absent or unreadable.
    pub async fn player_shell(&self) -> String {
        if let Some(dir) = &self.config.server.static_dir {
            let index = dir.join("index.html");
            match tokio::fs::read_to_string(&index).await {
                Ok(html) => return html,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!("Failed to read {}: {e}; using built-in player", index.display());
                }
            }
        }
        EMBEDDED_PLAYER.to_string()
    }
}

/// The built-in player page.
pub fn embedded_player() -> &'static str {
    EMBEDDED_PLAYER
}
