//! SQLite cache for tenex-tools

mod profiles;
mod schema;
mod snippets;
mod wot;

use crate::error::{Result, TenexError};
use rusqlite::Connection;
use std::path::Path;

pub use profiles::StoredProfile;
pub use schema::{create_schema, CURRENT_SCHEMA_VERSION};
pub use wot::InfluentialFollower;

/// SQLite database holding snippets, profiles and follow edges
#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create the database at `db_path`.
    ///
    /// Everything stored here can be re-fetched from relays, so a corrupt
    /// file is deleted and recreated instead of reported.
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| TenexError::io_operation("create database directory", parent, e))?;
        }

        match Self::open_internal(db_path) {
            Ok(db) => Ok(db),
            Err(e) if Self::is_corruption_error(&e) && db_path.exists() => {
                tracing::error!(
                    "Database corruption detected at {}: {}. Recreating...",
                    db_path.display(),
                    e
                );
                std::fs::remove_file(db_path).map_err(|delete_err| {
                    TenexError::Database(format!(
                        "failed to delete corrupted database: {} (original error: {})",
                        delete_err, e
                    ))
                })?;
                let _ = std::fs::remove_file(db_path.with_extension("db-wal"));
                let _ = std::fs::remove_file(db_path.with_extension("db-shm"));
                Self::open_internal(db_path)
            }
            Err(e) => Err(e),
        }
    }

    /// Fresh in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        create_schema(&conn).map_err(|e| crate::map_db_err!("create database schema", e))?;
        Ok(Database { conn })
    }

    fn open_internal(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path).map_err(|e| {
            TenexError::Database(format!(
                "failed to open database at {}: {}",
                db_path.display(),
                e
            ))
        })?;

        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| TenexError::Database(format!("failed to enable WAL mode: {}", e)))?;

        create_schema(&conn).map_err(|e| {
            TenexError::Database(format!("failed to create database schema: {}", e))
        })?;

        tracing::debug!(path = %db_path.display(), "database opened");
        Ok(Database { conn })
    }

    fn is_corruption_error(error: &TenexError) -> bool {
        match error {
            TenexError::Database(msg) => {
                let msg_lower = msg.to_lowercase();
                msg_lower.contains("malformed")
                    || msg_lower.contains("corrupt")
                    || msg_lower.contains("file is not a database")
            }
            _ => false,
        }
    }

    pub fn get_schema_version(&self) -> Result<i64> {
        self.conn
            .query_row(
                "SELECT value FROM meta WHERE key = 'schema_version'",
                [],
                |r| {
                    let s: String = r.get(0)?;
                    Ok(s.parse().unwrap_or(0))
                },
            )
            .map_err(|e| crate::map_db_err!("get schema version", e))
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        let _ = self.conn.pragma_update(None, "wal_checkpoint", "TRUNCATE");
    }
}

#[cfg(test)]
mod tests;
