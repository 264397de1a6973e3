//! Record store backed by a MongoDB collection.

use std::time::Duration;

use async_trait::async_trait;
use bson::{doc, Bson};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::options::FindOptions;
use mongodb::{Collection, Database, IndexModel};
use serde::{Deserialize, Serialize};
use vidstore_core::config::StorageConfig;
use vidstore_core::{Error, NewVideo, Result, VideoId, VideoRecord};

use crate::store::RecordStore;

/// Bound on connecting and preparing the collection at startup.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Stored shape of a record. `servers` is kept as native BSON so the
/// collection stays queryable from the mongo shell.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct VideoDocument {
    #[serde(rename = "_id")]
    id: String,
    title: String,
    servers: Vec<Bson>,
    #[serde(
        rename = "createdAt",
        with = "bson::serde_helpers::chrono_datetime_as_bson_datetime"
    )]
    created_at: DateTime<Utc>,
}

impl VideoDocument {
    fn from_record(record: &VideoRecord) -> Result<Self> {
        let servers = record
            .servers
            .iter()
            .map(bson::to_bson)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::Internal(format!("failed to encode servers: {e}")))?;

        Ok(Self {
            id: record.id.to_string(),
            title: record.title.clone(),
            servers,
            created_at: record.created_at,
        })
    }

    fn into_record(self) -> Result<VideoRecord> {
        let id = self
            .id
            .parse::<VideoId>()
            .map_err(|e| Error::storage(format!("document {:?} has a malformed _id: {e}", self.id)))?;

        Ok(VideoRecord {
            id,
            title: self.title,
            servers: self
                .servers
                .into_iter()
                .map(Bson::into_relaxed_extjson)
                .collect(),
            created_at: self.created_at,
        })
    }
}

/// A [`RecordStore`] persisting to one MongoDB collection.
///
/// The driver's client owns the connection pool; it is shared across all
/// requests through the store handle.
#[derive(Clone)]
pub struct MongoStore {
    database: Database,
    collection: Collection<VideoDocument>,
}

impl MongoStore {
    /// Connect using the URI, database, and collection from `config`.
    ///
    /// The database name falls back to the URI's default database when the
    /// configured name is empty. The server is pinged before returning so an
    /// unreachable database fails startup.
    pub async fn connect(config: &StorageConfig) -> Result<Self> {
        tracing::debug!("setting up mongo client");

        let client = tokio::time::timeout(CONNECT_TIMEOUT, mongodb::Client::with_uri_str(&config.uri))
            .await
            .map_err(|_| Error::Timeout(CONNECT_TIMEOUT))?
            .map_err(Error::storage)?;

        let database = if config.database.is_empty() {
            client
                .default_database()
                .ok_or_else(|| Error::Config("no database name configured or present in the URI".into()))?
        } else {
            client.database(&config.database)
        };

        let store = Self {
            collection: database.collection(&config.collection),
            database,
        };

        tokio::time::timeout(CONNECT_TIMEOUT, store.setup_collection())
            .await
            .map_err(|_| Error::Timeout(CONNECT_TIMEOUT))??;

        tracing::info!(
            database = %store.database.name(),
            collection = %config.collection,
            "Connected to MongoDB"
        );
        Ok(store)
    }

    async fn setup_collection(&self) -> Result<()> {
        self.ping().await?;

        tracing::debug!("setting up video collection");
        self.collection
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "createdAt": 1 })
                    .build(),
                None,
            )
            .await
            .map_err(Error::storage)?;

        Ok(())
    }
}

#[async_trait]
impl RecordStore for MongoStore {
    fn backend(&self) -> &'static str {
        "mongodb"
    }

    async fn create(&self, new: NewVideo) -> Result<VideoRecord> {
        let record = new.into_record();
        let document = VideoDocument::from_record(&record)?;

        self.collection
            .insert_one(&document, None)
            .await
            .map_err(Error::storage)?;

        tracing::debug!(id = %record.id, "Video document inserted");
        Ok(record)
    }

    async fn get(&self, id: VideoId) -> Result<Option<VideoRecord>> {
        let document = self
            .collection
            .find_one(doc! { "_id": id.to_string() }, None)
            .await
            .map_err(Error::storage)?;

        document.map(VideoDocument::into_record).transpose()
    }

    async fn list(&self) -> Result<Vec<VideoRecord>> {
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": 1 })
            .build();

        let documents: Vec<VideoDocument> = self
            .collection
            .find(None, options)
            .await
            .map_err(Error::storage)?
            .try_collect()
            .await
            .map_err(Error::storage)?;

        documents
            .into_iter()
            .map(VideoDocument::into_record)
            .collect()
    }

    async fn ping(&self) -> Result<()> {
        self.database
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(Error::storage)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn document_round_trip_keeps_servers() {
        let servers = json!([
            {"name": "Server1", "qualities": [{"res": "720p", "url": "https://example.com/a.mp4"}]},
            {"name": "Server2", "weight": 2, "ratio": 1.5, "enabled": true, "note": null}
        ]);
        let record = NewVideo::new(Some("Demo".into()), Some(servers.clone()))
            .unwrap()
            .into_record();

        let document = VideoDocument::from_record(&record).unwrap();
        assert_eq!(document.id, record.id.to_string());

        let bytes = bson::to_vec(&document).unwrap();
        let decoded: VideoDocument = bson::from_slice(&bytes).unwrap();
        let back = decoded.into_record().unwrap();

        assert_eq!(back, record);
        assert_eq!(serde_json::Value::Array(back.servers), servers);
    }

    #[test]
    fn malformed_id_is_storage_error() {
        let document = VideoDocument {
            id: "legacy-id".into(),
            title: "Old".into(),
            servers: vec![Bson::String("x".into())],
            created_at: Utc::now(),
        };
        assert!(matches!(document.into_record(), Err(Error::Storage { .. })));
    }
}
