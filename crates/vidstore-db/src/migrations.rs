//! Embedded SQL migrations and runner.
//!
//! The records table name is configurable, so migrations are templates with
//! a `{table}` placeholder. A `schema_migrations` table tracks which versions
//! have been applied to which table.

use rusqlite::Connection;
use vidstore_core::{Error, Result};

/// V1: the records table and its creation-time index.
const V1_VIDEOS: &str = r#"
CREATE TABLE {table} (
    id         TEXT PRIMARY KEY,
    title      TEXT NOT NULL,
    servers    TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX idx_{table}_created_at ON {table}(created_at);
"#;

/// Ordered list of (version, sql) pairs.
const MIGRATIONS: &[(i64, &str)] = &[(1, V1_VIDEOS)];

/// Reject table names that cannot be used as a bare SQL identifier.
pub fn validate_table_name(table: &str) -> Result<()> {
    let mut chars = table.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if !valid || table.len() > 64 || table.eq_ignore_ascii_case("schema_migrations") {
        return Err(Error::Config(format!(
            "invalid table name {table:?}: use letters, digits and underscores"
        )));
    }
    Ok(())
}

/// Run all pending migrations for `table` on `conn`.
///
/// Creates the `schema_migrations` tracking table if it does not exist,
/// then applies each outstanding migration inside a transaction.
pub fn run_migrations(conn: &Connection, table: &str) -> Result<()> {
    validate_table_name(table)?;

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            scope      TEXT NOT NULL,
            version    INTEGER NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope, version)
        )",
    )
    .map_err(|e| Error::storage(format!("Failed to create schema_migrations: {e}")))?;

    for &(version, sql) in MIGRATIONS {
        let already: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM schema_migrations WHERE scope = ?1 AND version = ?2",
                rusqlite::params![table, version],
                |row| row.get(0),
            )
            .map_err(Error::storage)?;

        if already {
            continue;
        }

        let tx = conn.unchecked_transaction().map_err(Error::storage)?;

        tx.execute_batch(&sql.replace("{table}", table))
            .map_err(|e| Error::storage(format!("Migration V{version} for {table} failed: {e}")))?;

        tx.execute(
            "INSERT INTO schema_migrations (scope, version) VALUES (?1, ?2)",
            rusqlite::params![table, version],
        )
        .map_err(Error::storage)?;

        tx.commit().map_err(Error::storage)?;
        tracing::debug!(table, version, "Applied migration");
    }

    Ok(())
}
