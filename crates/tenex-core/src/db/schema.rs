//! SQLite database schema

use rusqlite::{Connection, Result};

pub const CURRENT_SCHEMA_VERSION: i32 = 1;

const SCHEMA_SQL: &str = r#"
-- Snippets seen on relays (kind 1337)
CREATE TABLE IF NOT EXISTS snippets (
    id TEXT PRIMARY KEY NOT NULL,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    code TEXT NOT NULL,
    language TEXT NOT NULL,
    pubkey TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    tags TEXT NOT NULL DEFAULT '[]'
);
CREATE INDEX IF NOT EXISTS idx_snippets_pubkey ON snippets (pubkey);
CREATE INDEX IF NOT EXISTS idx_snippets_language ON snippets (language);
CREATE INDEX IF NOT EXISTS idx_snippets_created_at ON snippets (created_at);

-- Kind-0 profiles: parsed JSON plus the raw event content
CREATE TABLE IF NOT EXISTS profiles (
    pubkey TEXT PRIMARY KEY,
    profile TEXT NOT NULL,
    data TEXT NOT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

-- Follow edges from kind-3 contact lists
CREATE TABLE IF NOT EXISTS wot (
    follower TEXT NOT NULL,
    followed TEXT NOT NULL,
    PRIMARY KEY (follower, followed)
);
CREATE INDEX IF NOT EXISTS idx_wot_followed ON wot (followed);

CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT
);
"#;

fn drop_all_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "DROP TABLE IF EXISTS snippets;
         DROP TABLE IF EXISTS profiles;
         DROP TABLE IF EXISTS wot;
         DROP TABLE IF EXISTS meta;",
    )
}

fn write_version(conn: &Connection) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO meta (key, value) VALUES ('schema_version', ?1)",
        [&CURRENT_SCHEMA_VERSION.to_string()],
    )?;
    Ok(())
}

/// Create tables, recreating them when the stored version is unknown.
pub fn create_schema(conn: &Connection) -> Result<()> {
    let current_version: Option<i32> = conn
        .query_row(
            "SELECT value FROM meta WHERE key = 'schema_version'",
            [],
            |r| r.get::<_, String>(0).map(|s| s.parse().unwrap_or(0)),
        )
        .ok();

    match current_version {
        None => {
            conn.execute_batch(SCHEMA_SQL)?;
            write_version(conn)?;
        }
        Some(v) if v == CURRENT_SCHEMA_VERSION => {}
        Some(v) => {
            drop_all_tables(conn)?;
            conn.execute_batch(SCHEMA_SQL)?;
            write_version(conn)?;
            tracing::info!(
                "Database schema updated from version {} to {}",
                v,
                CURRENT_SCHEMA_VERSION
            );
        }
    }

    Ok(())
}

#[cfg(test)]
pub fn force_set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO meta (key, value) VALUES ('schema_version', ?1)",
        [&version.to_string()],
    )?;
    Ok(())
}
