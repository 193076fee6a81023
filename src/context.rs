//! Application context.
//!
//! Built once at startup and passed by reference to whoever needs the
//! database, the deck store or the notification queue.

use crate::config::ResolvedConfig;
use crate::database::db;
use crate::database::store::SqliteDeckStore;
use crate::database::users::{self, AuthError};
use crate::models::UserProfile;
use crate::notify::Notifications;
use log::info;
use rusqlite::Connection;
use std::fs;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContextError {
    #[error("Could not create data directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not open database: {0}")]
    Database(#[from] rusqlite::Error),
}

pub struct AppContext {
    pub config: ResolvedConfig,
    pub notifications: Notifications,
    pub store: SqliteDeckStore,
    conn: Arc<Mutex<Connection>>,
}

impl AppContext {
    /// Opens the configured database and wires the deck store to the
    /// notification queue.
    pub fn initialize(config: ResolvedConfig) -> Result<Self, ContextError> {
        if let Some(parent) = config.database_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let conn = db::init_database(&config.database_path)?;
        info!("Using database {}", config.database_path.display());
        Ok(Self::with_connection(config, conn))
    }

    /// Builds a context around an already-open connection. The schema is
    /// assumed to exist.
    pub fn with_connection(config: ResolvedConfig, conn: Connection) -> Self {
        let conn = Arc::new(Mutex::new(conn));
        let notifications = Notifications::new();
        let store = SqliteDeckStore::new(
            Arc::clone(&conn),
            &config.app_id,
            Arc::new(notifications.clone()),
        );
        Self {
            config,
            notifications,
            store,
            conn,
        }
    }

    pub fn sign_in(&self, display_name: &str) -> Result<UserProfile, AuthError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| AuthError::Unavailable)?;
        users::sign_in(&conn, display_name)
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_secs(self.config.notification_seconds)
    }
}
