//! Local sign-in.
//!
//! A profile is looked up by display name and created on first use. Signing
//! in again refreshes `last_sign_in_at` and leaves everything else as is.

use super::db::{from_timestamp, now, to_timestamp};
use crate::models::UserProfile;
use log::info;
use rusqlite::{Connection, OptionalExtension, Row, params};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Display name cannot be empty.")]
    EmptyName,

    #[error("Profile store is unavailable")]
    Unavailable,

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Signs in as `display_name`, creating the profile if it does not exist yet
pub fn sign_in(conn: &Connection, display_name: &str) -> Result<UserProfile, AuthError> {
    let display_name = display_name.trim();
    if display_name.is_empty() {
        return Err(AuthError::EmptyName);
    }

    let signed_in_at = to_timestamp(now());
    let updated = conn.execute(
        "UPDATE users SET last_sign_in_at = ?1 WHERE display_name = ?2",
        params![signed_in_at, display_name],
    )?;

    if updated == 0 {
        let uid = Uuid::new_v4().to_string();
        conn.execute(
            "INSERT INTO users (uid, display_name, created_at, last_sign_in_at)
             VALUES (?1, ?2, ?3, ?3)",
            params![uid, display_name, signed_in_at],
        )?;
        info!("Created profile '{}' ({})", display_name, uid);
    }

    let profile = conn.query_row(
        "SELECT uid, display_name, created_at, last_sign_in_at FROM users WHERE display_name = ?1",
        params![display_name],
        profile_from_row,
    )?;

    info!("Signed in as '{}'", profile.display_name);
    Ok(profile)
}

/// Looks up a profile by uid
pub fn get_user(conn: &Connection, uid: &str) -> rusqlite::Result<Option<UserProfile>> {
    conn.query_row(
        "SELECT uid, display_name, created_at, last_sign_in_at FROM users WHERE uid = ?1",
        params![uid],
        profile_from_row,
    )
    .optional()
}

fn profile_from_row(row: &Row<'_>) -> rusqlite::Result<UserProfile> {
    Ok(UserProfile {
        uid: row.get(0)?,
        display_name: row.get(1)?,
        created_at: from_timestamp(row.get(2)?),
        last_sign_in_at: from_timestamp(row.get(3)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::db::create_schema;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn test_sign_in_creates_profile() {
        let conn = test_conn();
        let profile = sign_in(&conn, "  Ada ").unwrap();

        assert_eq!(profile.display_name, "Ada");
        assert!(!profile.uid.is_empty());
        assert_eq!(get_user(&conn, &profile.uid).unwrap(), Some(profile));
    }

    #[test]
    fn test_sign_in_again_returns_same_uid() {
        let conn = test_conn();
        let first = sign_in(&conn, "Ada").unwrap();
        let second = sign_in(&conn, "Ada").unwrap();

        assert_eq!(first.uid, second.uid);
        assert_eq!(first.created_at, second.created_at);

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_different_names_get_different_uids() {
        let conn = test_conn();
        let ada = sign_in(&conn, "Ada").unwrap();
        let alan = sign_in(&conn, "Alan").unwrap();
        assert_ne!(ada.uid, alan.uid);
    }

    #[test]
    fn test_sign_in_rejects_blank_name() {
        let conn = test_conn();
        assert!(matches!(sign_in(&conn, "   "), Err(AuthError::EmptyName)));
    }

    #[test]
    fn test_get_unknown_user() {
        let conn = test_conn();
        assert_eq!(get_user(&conn, "missing").unwrap(), None);
    }
}
