//! Database setup for the flashcard application
//!
//! Handles SQLite connection setup and schema creation for local profiles,
//! decks and their cards, plus the timestamp encoding shared by the queries.

use chrono::{DateTime, SubsecRound, Utc};
use rusqlite::{Connection, Result};
use std::path::Path;

/// Opens (or creates) the database file and makes sure the schema exists
pub fn init_database(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    create_schema(&conn)?;
    Ok(conn)
}

/// Creates tables for profiles, decks and cards if they are missing
pub fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;

    // Local profiles that own decks
    conn.execute(
        "CREATE TABLE IF NOT EXISTS users (
            uid TEXT PRIMARY KEY,
            display_name TEXT NOT NULL UNIQUE,
            created_at INTEGER NOT NULL,
            last_sign_in_at INTEGER NOT NULL
        )",
        (),
    )?;

    // Decks are scoped by (app_id, owner_id)
    conn.execute(
        "CREATE TABLE IF NOT EXISTS decks (
            id TEXT PRIMARY KEY,
            app_id TEXT NOT NULL,
            owner_id TEXT NOT NULL,
            name TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            FOREIGN KEY (owner_id) REFERENCES users(uid)
        )",
        (),
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS decks_by_owner ON decks (app_id, owner_id, created_at)",
        (),
    )?;

    // Cards keep the order they were uploaded in
    conn.execute(
        "CREATE TABLE IF NOT EXISTS cards (
            deck_id TEXT NOT NULL,
            position INTEGER NOT NULL,
            question TEXT NOT NULL,
            answer TEXT NOT NULL,
            PRIMARY KEY (deck_id, position),
            FOREIGN KEY (deck_id) REFERENCES decks(id) ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

/// Current time at the precision the database stores
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

pub fn to_timestamp(time: DateTime<Utc>) -> i64 {
    time.timestamp()
}

pub fn from_timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_database_creates_tables() {
        let dir = TempDir::new().unwrap();
        let conn = init_database(&dir.path().join("test.sqlite3")).unwrap();

        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap();
        let tables = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .unwrap()
            .collect::<Result<Vec<String>>>()
            .unwrap();

        assert_eq!(tables, vec!["cards", "decks", "users"]);
    }

    #[test]
    fn test_create_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        create_schema(&conn).unwrap();
        create_schema(&conn).unwrap();
    }

    #[test]
    fn test_timestamp_roundtrip() {
        let time = now();
        assert_eq!(from_timestamp(to_timestamp(time)), time);
    }
}
