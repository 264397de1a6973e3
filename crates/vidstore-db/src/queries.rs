//! Video record queries for the SQLite backend.
//!
//! Every function takes the records table name, which must already have
//! passed [`crate::migrations::validate_table_name`].

use rusqlite::types::Type;
use rusqlite::Connection;
use vidstore_core::record::timestamp;
use vidstore_core::{Error, Result, VideoId, VideoRecord};

/// Insert a new record.
pub fn insert_video(conn: &Connection, table: &str, record: &VideoRecord) -> Result<()> {
    let servers_json = serde_json::to_string(&record.servers)
        .map_err(|e| Error::Internal(format!("failed to encode servers: {e}")))?;

    conn.execute(
        &format!("INSERT INTO {table} (id, title, servers, created_at) VALUES (?1, ?2, ?3, ?4)"),
        rusqlite::params![
            record.id.to_string(),
            record.title,
            servers_json,
            timestamp::format(&record.created_at),
        ],
    )
    .map_err(Error::storage)?;

    Ok(())
}

/// Get a record by ID.
pub fn get_video(conn: &Connection, table: &str, id: VideoId) -> Result<Option<VideoRecord>> {
    let result = conn.query_row(
        &format!("SELECT id, title, servers, created_at FROM {table} WHERE id = ?1"),
        [id.to_string()],
        video_from_row,
    );
    match result {
        Ok(record) => Ok(Some(record)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::storage(e)),
    }
}

/// List all records, oldest first.
pub fn list_videos(conn: &Connection, table: &str) -> Result<Vec<VideoRecord>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT id, title, servers, created_at FROM {table} ORDER BY created_at, rowid"
        ))
        .map_err(Error::storage)?;
    let rows = stmt
        .query_map([], video_from_row)
        .map_err(Error::storage)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(Error::storage)?;
    Ok(rows)
}

/// Count stored records.
pub fn count_videos(conn: &Connection, table: &str) -> Result<i64> {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
        .map_err(Error::storage)
}

/// Build a record from a row, surfacing undecodable columns as errors.
fn video_from_row(row: &rusqlite::Row) -> rusqlite::Result<VideoRecord> {
    let id: String = row.get(0)?;
    let servers: String = row.get(2)?;
    let created_at: String = row.get(3)?;

    Ok(VideoRecord {
        id: id.parse::<VideoId>().map_err(|e| conversion_failure(0, e))?,
        title: row.get(1)?,
        servers: serde_json::from_str(&servers).map_err(|e| conversion_failure(2, e))?,
        created_at: timestamp::parse(&created_at).map_err(|e| conversion_failure(3, e))?,
    })
}

fn conversion_failure<E>(idx: usize, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}
