//! Record store backed by an SQLite table.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::Connection;
use vidstore_core::{Error, NewVideo, Result, VideoId, VideoRecord};

use crate::migrations::validate_table_name;
use crate::pool::{self, DbPool};
use crate::queries;
use crate::store::RecordStore;

/// A [`RecordStore`] persisting to one SQLite table through an r2d2 pool.
///
/// rusqlite is blocking, so every call runs on tokio's blocking pool.
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
    table: Arc<str>,
}

impl SqliteStore {
    /// Open (creating if needed) the database file at `path`.
    pub fn open(path: &Path, table: &str) -> Result<Self> {
        validate_table_name(table)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
                tracing::info!("Created database directory {}", parent.display());
            }
        }

        let existed = path.exists();
        let db_str = path.to_string_lossy();
        let pool = pool::init_pool(&db_str, table)?;
        if existed {
            tracing::info!("Database opened (existing) at {db_str}");
        } else {
            tracing::info!("Database created (new) at {db_str}");
        }

        Ok(Self::from_pool(pool, table))
    }

    /// An isolated in-memory database, mainly for tests.
    pub fn open_in_memory(table: &str) -> Result<Self> {
        validate_table_name(table)?;
        let pool = pool::init_memory_pool(table)?;
        Ok(Self::from_pool(pool, table))
    }

    /// Wrap an existing pool whose migrations have already run for `table`.
    pub fn from_pool(pool: DbPool, table: &str) -> Self {
        Self {
            pool,
            table: Arc::from(table),
        }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection, &str) -> Result<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        let table = self.table.clone();

        tokio::task::spawn_blocking(move || {
            let conn = pool::get_conn(&pool)?;
            f(&*conn, &*table)
        })
        .await
        .map_err(|e| Error::Internal(format!("spawn_blocking join error: {e}")))?
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn create(&self, new: NewVideo) -> Result<VideoRecord> {
        let record = new.into_record();
        let row = record.clone();
        self.blocking(move |conn, table| queries::insert_video(conn, table, &row))
            .await?;

        tracing::debug!(id = %record.id, "Video record inserted");
        Ok(record)
    }

    async fn get(&self, id: VideoId) -> Result<Option<VideoRecord>> {
        self.blocking(move |conn, table| queries::get_video(conn, table, id))
            .await
    }

    async fn list(&self) -> Result<Vec<VideoRecord>> {
        self.blocking(queries::list_videos).await
    }

    async fn ping(&self) -> Result<()> {
        self.blocking(|conn, table| queries::count_videos(conn, table).map(|_| ()))
            .await
    }

    async fn close(&self) -> Result<()> {
        self.blocking(|conn, _| {
            conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
                .map_err(Error::storage)
        })
        .await?;
        tracing::debug!("SQLite WAL checkpointed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn contract() {
        let store = SqliteStore::open_in_memory("videos").unwrap();
        crate::contract::exercise(&store).await;
    }

    #[tokio::test]
    async fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db/videos.db");

        let created = {
            let store = SqliteStore::open(&path, "videos").unwrap();
            let record = store
                .create(NewVideo::new(Some("Kept".into()), Some(json!([{"name": "S"}]))).unwrap())
                .await
                .unwrap();
            store.close().await.unwrap();
            record
        };

        let store = SqliteStore::open(&path, "videos").unwrap();
        assert_eq!(store.get(created.id).await.unwrap(), Some(created));
    }

    #[tokio::test]
    async fn custom_table_name() {
        let store = SqliteStore::open_in_memory("clips").unwrap();
        let record = store
            .create(NewVideo::new(None, Some(json!([1, 2, 3]))).unwrap())
            .await
            .unwrap();

        let conn = pool::get_conn(store.pool()).unwrap();
        assert_eq!(queries::count_videos(&conn, "clips").unwrap(), 1);
        assert_eq!(store.list().await.unwrap(), vec![record]);
    }

    #[test]
    fn invalid_table_name_is_config_error() {
        assert!(matches!(
            SqliteStore::open_in_memory("bad name"),
            Err(Error::Config(_))
        ));
    }
}
