//! The [`RecordStore`] contract and backend selection.

use std::sync::Arc;

use async_trait::async_trait;
use vidstore_core::config::{Backend, StorageConfig};
use vidstore_core::{Error, NewVideo, Result, VideoId, VideoRecord};

use crate::json_file::JsonFileStore;
use crate::sqlite::SqliteStore;

/// Durable storage of [`VideoRecord`]s behind a backend-independent contract.
///
/// Records are immutable: there is no update or delete. A record becomes
/// visible to `get` and `list` only after `create` has returned `Ok`.
/// Implementations never retry on their own; a failed call surfaces as
/// [`Error::Storage`] and may be retried by the caller.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Short backend name used in logs and health output.
    fn backend(&self) -> &'static str;

    /// Persist a new record with a freshly generated id and timestamp.
    async fn create(&self, new: NewVideo) -> Result<VideoRecord>;

    /// Fetch a record by id. `Ok(None)` means the id was never issued.
    async fn get(&self, id: VideoId) -> Result<Option<VideoRecord>>;

    /// Fetch a record by its textual id.
    ///
    /// Malformed or empty ids are reported as absent rather than invalid,
    /// the same way for every backend.
    async fn get_by_str(&self, raw: &str) -> Result<Option<VideoRecord>> {
        match VideoId::parse_lenient(raw) {
            Some(id) => self.get(id).await,
            None => Ok(None),
        }
    }

    /// Every stored record. Order is unspecified.
    async fn list(&self) -> Result<Vec<VideoRecord>>;

    /// Check that the backing medium is reachable.
    async fn ping(&self) -> Result<()>;

    /// Release the backing medium. Called once on shutdown.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Open the backend selected by `config`.
///
/// Failures here are startup preconditions: unknown or missing backends,
/// unreadable files, and unreachable databases all abort startup.
pub async fn open_store(config: &StorageConfig) -> Result<Arc<dyn RecordStore>> {
    let store: Arc<dyn RecordStore> = match config.backend {
        Backend::Json => Arc::new(JsonFileStore::open(&config.data_file)?),
        Backend::Sqlite => {
            let path = config.sqlite_path.clone();
            let table = config.collection.clone();
            let store = tokio::task::spawn_blocking(move || SqliteStore::open(&path, &table))
                .await
                .map_err(|e| Error::Internal(format!("spawn_blocking join error: {e}")))??;
            Arc::new(store)
        }
        #[cfg(feature = "mongodb")]
        Backend::Mongodb => Arc::new(crate::mongo::MongoStore::connect(config).await?),
        #[cfg(not(feature = "mongodb"))]
        Backend::Mongodb => {
            return Err(Error::Config(
                "the mongodb backend is not compiled in; rebuild with `--features mongodb`".into(),
            ))
        }
    };

    tracing::info!(backend = store.backend(), "Record store opened");
    Ok(store)
}
