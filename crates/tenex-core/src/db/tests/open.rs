use crate::db::schema::force_set_schema_version;
use crate::db::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_database_open_creates_tables() {
    let dir = tempdir().unwrap();
    let db = Database::open(&dir.path().join("tenex.db")).unwrap();

    let count: i64 = db
        .conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table'",
            [],
            |row: &rusqlite::Row| row.get(0),
        )
        .unwrap();

    assert_eq!(count, 4);
    assert_eq!(
        db.get_schema_version().unwrap(),
        i64::from(CURRENT_SCHEMA_VERSION)
    );
}

#[test]
fn test_database_open_creates_parent_directory() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("cache").join("tenex.db");
    Database::open(&path).unwrap();
    assert!(path.exists());
}

#[test]
fn test_database_corrupt_file_is_recreated() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tenex.db");
    fs::write(&path, b"corrupted database file that is malformed").unwrap();

    let db = Database::open(&path).unwrap();
    assert_eq!(db.snippet_count().unwrap(), 0);
}

#[test]
fn test_data_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tenex.db");
    {
        let mut db = Database::open(&path).unwrap();
        db.add_follows("a", &["b".to_string()]).unwrap();
    }
    let db = Database::open(&path).unwrap();
    assert_eq!(db.following("a").unwrap(), vec!["b"]);
}

#[test]
fn test_unknown_schema_version_recreates_tables() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tenex.db");
    {
        let mut db = Database::open(&path).unwrap();
        db.add_follows("a", &["b".to_string()]).unwrap();
        force_set_schema_version(&db.conn, 99).unwrap();
    }
    let db = Database::open(&path).unwrap();
    assert!(db.following("a").unwrap().is_empty());
    assert_eq!(
        db.get_schema_version().unwrap(),
        i64::from(CURRENT_SCHEMA_VERSION)
    );
}
