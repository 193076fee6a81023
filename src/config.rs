//! # Configuration
//!
//! Override hierarchy: defaults → config file → env vars.
//!
//! Config lives at `<config dir>/studybuddy/config.toml`. If missing on first
//! run, a commented-out default is generated so users can discover all
//! options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct StudyConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct StorageConfig {
    pub database_path: Option<PathBuf>,
    pub app_id: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UiConfig {
    pub notification_seconds: Option<u64>,
    pub window_width: Option<f32>,
    pub window_height: Option<f32>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_APP_ID: &str = "studybuddy-default";
pub const DEFAULT_DATABASE_FILE: &str = "studybuddy.sqlite3";
pub const DEFAULT_NOTIFICATION_SECONDS: u64 = 6;
pub const DEFAULT_WINDOW_SIZE: [f32; 2] = [520.0, 720.0];

pub const ENV_DATABASE: &str = "STUDYBUDDY_DATABASE";
pub const ENV_APP_ID: &str = "STUDYBUDDY_APP_ID";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub database_path: PathBuf,
    pub app_id: String,
    pub notification_seconds: u64,
    pub window_size: [f32; 2],
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `<config dir>/studybuddy/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("studybuddy").join("config.toml"))
}

/// Load config from the default location.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `StudyConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<StudyConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine config directory, using default config");
            return Ok(StudyConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(StudyConfig::default());
    }

    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<StudyConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: StudyConfig = toml::from_str(&contents)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

fn generate_default_config(path: &Path) {
    let default_content = r#"# StudyBuddy Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars.

# [storage]
# database_path = "/path/to/studybuddy.sqlite3"   # Or set STUDYBUDDY_DATABASE
# app_id = "studybuddy-default"                   # Or set STUDYBUDDY_APP_ID

# [ui]
# notification_seconds = 6
# window_width = 520.0
# window_height = 720.0
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("studybuddy").join(DEFAULT_DATABASE_FILE))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_FILE))
}

impl StudyConfig {
    /// Resolves against the process environment.
    pub fn resolve(self) -> ResolvedConfig {
        self.resolve_with(|key| std::env::var(key).ok())
    }

    /// Resolves with an explicit env lookup.
    pub fn resolve_with<F>(self, env: F) -> ResolvedConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let database_path = non_empty(ENV_DATABASE)
            .map(PathBuf::from)
            .or(self.storage.database_path)
            .unwrap_or_else(default_database_path);

        let app_id = non_empty(ENV_APP_ID)
            .or(self.storage.app_id)
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| DEFAULT_APP_ID.to_string());

        ResolvedConfig {
            database_path,
            app_id,
            notification_seconds: self
                .ui
                .notification_seconds
                .unwrap_or(DEFAULT_NOTIFICATION_SECONDS),
            window_size: [
                self.ui.window_width.unwrap_or(DEFAULT_WINDOW_SIZE[0]),
                self.ui.window_height.unwrap_or(DEFAULT_WINDOW_SIZE[1]),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults() {
        let resolved = StudyConfig::default().resolve_with(no_env);
        assert_eq!(resolved.app_id, DEFAULT_APP_ID);
        assert_eq!(resolved.notification_seconds, DEFAULT_NOTIFICATION_SECONDS);
        assert_eq!(resolved.window_size, DEFAULT_WINDOW_SIZE);
        assert!(resolved.database_path.ends_with(DEFAULT_DATABASE_FILE));
    }

    #[test]
    fn test_sparse_file() {
        let config: StudyConfig = toml::from_str(
            r#"
            [storage]
            app_id = "my-app"

            [ui]
            window_width = 800.0
            "#,
        )
        .unwrap();

        let resolved = config.resolve_with(no_env);
        assert_eq!(resolved.app_id, "my-app");
        assert_eq!(resolved.window_size, [800.0, DEFAULT_WINDOW_SIZE[1]]);
    }

    #[test]
    fn test_env_overrides_file() {
        let config: StudyConfig = toml::from_str(
            r#"
            [storage]
            database_path = "/from/file.sqlite3"
            app_id = "file-app"
            "#,
        )
        .unwrap();

        let env: HashMap<&str, &str> =
            HashMap::from([(ENV_DATABASE, "/from/env.sqlite3"), (ENV_APP_ID, " env-app ")]);
        let resolved = config.resolve_with(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(resolved.database_path, PathBuf::from("/from/env.sqlite3"));
        assert_eq!(resolved.app_id, "env-app");
    }

    #[test]
    fn test_blank_env_is_ignored() {
        let config: StudyConfig = toml::from_str("[storage]\napp_id = \"file-app\"").unwrap();
        let resolved = config.resolve_with(|_| Some("  ".to_string()));
        assert_eq!(resolved.app_id, "file-app");
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[ui]\nnotification_seconds = 2\n").unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.ui.notification_seconds, Some(2));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[ui\nnotification_seconds = ").unwrap();

        assert!(matches!(load_config_from(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_generated_default_parses() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        generate_default_config(&path);

        let config = load_config_from(&path).unwrap();
        assert!(config.storage.app_id.is_none());
    }
}
