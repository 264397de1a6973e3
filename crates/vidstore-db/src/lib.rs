//! vidstore-db: the record store and its persistence backends.
//!
//! All backends implement [`RecordStore`], and [`open_store`] is the single
//! place where a backend is chosen from configuration.
//!
//! # Modules
//!
//! - `store` - The [`RecordStore`] trait and backend selection
//! - `json_file` - A single JSON document on disk
//! - `pool` / `migrations` / `queries` / `sqlite` - SQLite via rusqlite and r2d2
//! - `mongo` - MongoDB collection (feature `mongodb`)
//!
//! # Example
//!
//! ```no_run
//! use vidstore_core::NewVideo;
//! use vidstore_db::{JsonFileStore, RecordStore};
//!
//! # async fn demo() -> vidstore_core::Result<()> {
//! let store = JsonFileStore::open("/tmp/videos_db.json")?;
//! let new = NewVideo::new(None, Some(serde_json::json!([{"name": "Server1"}])))?;
//! let record = store.create(new).await?;
//! assert!(store.get(record.id).await?.is_some());
//! # Ok(())
//! # }
//! ```

pub mod json_file;
pub mod migrations;
#[cfg(feature = "mongodb")]
pub mod mongo;
pub mod pool;
pub mod queries;
pub mod sqlite;
pub mod store;

#[cfg(test)]
mod contract;

pub use json_file::JsonFileStore;
#[cfg(feature = "mongodb")]
pub use mongo::MongoStore;
pub use sqlite::SqliteStore;
pub use store::{open_store, RecordStore};
