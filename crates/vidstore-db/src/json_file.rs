//! Record store backed by a single JSON document on disk.
//!
//! The file holds one object keyed by record id:
//!
//! ```json
//! { "<id>": { "id": "<id>", "title": "...", "servers": [...], "createdAt": "..." } }
//! ```
//!
//! Every write re-reads the file, inserts the new record, and replaces the
//! file atomically (temp file in the same directory, then rename). Writers
//! in one process are serialized by an async mutex so no update is lost;
//! separate processes sharing one file are still last-writer-wins.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use vidstore_core::{Error, NewVideo, Result, VideoId, VideoRecord};

use crate::store::RecordStore;

type Snapshot = BTreeMap<String, VideoRecord>;

/// A [`RecordStore`] persisting to one JSON file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open (or initialize) the data file at `path`.
    ///
    /// Creates the parent directory and an empty `{}` document when the file
    /// does not exist. An existing file must parse, so corruption is caught
    /// at startup rather than on the first request.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
                tracing::info!("Created data directory {}", parent.display());
            }
        }

        if path.exists() {
            let bytes = std::fs::read(&path).map_err(Error::storage)?;
            let snapshot = decode(&path, &bytes)?;
            tracing::info!(
                "Data file opened (existing) at {} with {} records",
                path.display(),
                snapshot.len()
            );
        } else {
            write_atomic(&path, b"{}")?;
            tracing::info!("Data file created (new) at {}", path.display());
        }

        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    async fn read_snapshot(&self) -> Result<Snapshot> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => decode(&self.path, &bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Snapshot::new()),
            Err(e) => Err(Error::storage(format!(
                "failed to read {}: {e}",
                self.path.display()
            ))),
        }
    }

    async fn write_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        let json = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| Error::Internal(format!("failed to encode records: {e}")))?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || write_atomic(&path, &json))
            .await
            .map_err(|e| Error::Internal(format!("spawn_blocking join error: {e}")))?
    }
}

fn decode(path: &Path, bytes: &[u8]) -> Result<Snapshot> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Snapshot::new());
    }
    serde_json::from_slice(bytes)
        .map_err(|e| Error::storage(format!("corrupt data file {}: {e}", path.display())))
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(Error::storage)?;
    tmp.write_all(contents).map_err(Error::storage)?;
    tmp.as_file().sync_all().map_err(Error::storage)?;
    tmp.persist(path).map_err(|e| Error::storage(e.error))?;
    Ok(())
}

#[async_trait]
impl RecordStore for JsonFileStore {
    fn backend(&self) -> &'static str {
        "json"
    }

    async fn create(&self, new: NewVideo) -> Result<VideoRecord> {
        let _guard = self.write_lock.lock().await;

        let mut snapshot = self.read_snapshot().await?;
        let record = new.into_record();
        snapshot.insert(record.id.to_string(), record.clone());
        self.write_snapshot(&snapshot).await?;

        tracing::debug!(id = %record.id, total = snapshot.len(), "Video record written");
        Ok(record)
    }

    async fn get(&self, id: VideoId) -> Result<Option<VideoRecord>> {
        let mut snapshot = self.read_snapshot().await?;
        Ok(snapshot.remove(&id.to_string()))
    }

    async fn list(&self) -> Result<Vec<VideoRecord>> {
        let snapshot = self.read_snapshot().await?;
        let mut records: Vec<VideoRecord> = snapshot.into_values().collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(records)
    }

    async fn ping(&self) -> Result<()> {
        self.read_snapshot().await.map(|_| ())
    }
}
