//! Configuration resolution for gamedb.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/gamedb/settings.json)
//! 3. Environment variables
//! 4. CLI arguments (highest priority, applied by the caller)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Complete gamedb configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Appended to the base URL as a path segment (e.g. `en`).
    pub locale: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://mhw-db.com".to_string(),
            locale: None,
            request_timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Session and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Credentials with this many seconds or fewer left are discarded.
    pub safety_margin_secs: u64,
    pub auth_path: String,
    pub refresh_path: String,
    /// Persistence key; the token file name under the state directory.
    pub storage_key: String,
    /// State directory override (default `~/.gamedb`).
    pub storage_dir: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            safety_margin_secs: 15,
            auth_path: "/auth".to_string(),
            refresh_path: "/auth/refresh".to_string(),
            storage_key: "token".to_string(),
            storage_dir: None,
        }
    }
}

impl SessionConfig {
    pub const fn safety_margin(&self) -> Duration {
        Duration::from_secs(self.safety_margin_secs)
    }

    /// Directory holding persisted credentials.
    pub fn storage_dir(&self) -> Option<PathBuf> {
        self.storage_dir
            .clone()
            .or_else(|| dirs::home_dir().map(|h| h.join(".gamedb")))
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}

/// Load configuration with hierarchical resolution.
pub fn load_config() -> Result<Config> {
    let mut config = match global_config_path() {
        Some(path) if path.exists() => load_config_file(&path)?,
        _ => Config::default(),
    };
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Get the global config file path.
pub fn global_config_path() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .ok()
            .map(|h| PathBuf::from(h).join(".gamedb").join("settings.json"))
    }
    #[cfg(target_os = "macos")]
    {
        std::env::var("HOME")
            .ok()
            .map(|h| PathBuf::from(h).join("Library/Application Support/gamedb/settings.json"))
    }
    #[cfg(target_os = "linux")]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| std::env::var("HOME").ok().map(|h| PathBuf::from(h).join(".config")))
            .map(|p| p.join("gamedb").join("settings.json"))
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
    {
        None
    }
}

/// Read one config file. Missing sections take their defaults.
pub fn load_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

fn apply_env_overrides(config: &mut Config) {
    apply_overrides(config, |key| std::env::var(key).ok());
}

fn apply_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(val) = var("GAMEDB_BASE_URL") {
        config.api.base_url = val;
    }
    if let Some(val) = var("GAMEDB_LOCALE") {
        config.api.locale = Some(val).filter(|l| !l.is_empty());
    }
    if let Some(val) = var("GAMEDB_SAFETY_MARGIN_SECS") {
        if let Ok(n) = val.parse() {
            config.session.safety_margin_secs = n;
        } else {
            tracing::warn!(value = %val, "Ignoring non-numeric GAMEDB_SAFETY_MARGIN_SECS");
        }
    }
    if let Some(val) = var("GAMEDB_LOG_LEVEL") {
        config.logging.level = val;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_safety_margin_is_15s() {
        let config = Config::default();
        assert_eq!(config.session.safety_margin(), Duration::from_secs(15));
        assert_eq!(config.session.refresh_path, "/auth/refresh");
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"api": {"base_url": "http://localhost:8000", "locale": "fr"}}"#).unwrap();

        let config = load_config_file(&path).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.locale.as_deref(), Some("fr"));
        assert_eq!(config.api.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.session.safety_margin_secs, 15);
    }

    #[test]
    fn unreadable_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(load_config_file(&path), Err(Error::Config(_))));
    }

    #[test]
    fn missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let Err(Error::Config(message)) = load_config_file(&path) else {
            panic!("expected a config error");
        };
        assert!(message.contains("absent.json"), "{message}");
    }

    #[test]
    fn environment_overrides_file_values() {
        let vars: HashMap<&str, &str> = [
            ("GAMEDB_BASE_URL", "http://api.test"),
            ("GAMEDB_LOCALE", "de"),
            ("GAMEDB_SAFETY_MARGIN_SECS", "5"),
        ]
        .into_iter()
        .collect();
        let mut config = Config::default();
        apply_overrides(&mut config, |k| vars.get(k).map(ToString::to_string));

        assert_eq!(config.api.base_url, "http://api.test");
        assert_eq!(config.api.locale.as_deref(), Some("de"));
        assert_eq!(config.session.safety_margin_secs, 5);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn bad_margin_override_is_ignored() {
        let mut config = Config::default();
        apply_overrides(&mut config, |k| {
            (k == "GAMEDB_SAFETY_MARGIN_SECS").then(|| "soon".to_string())
        });
        assert_eq!(config.session.safety_margin_secs, 15);
    }

    #[test]
    fn explicit_storage_dir_wins() {
        let session = SessionConfig {
            storage_dir: Some(PathBuf::from("/tmp/gamedb-state")),
            ..SessionConfig::default()
        };
        assert_eq!(session.storage_dir(), Some(PathBuf::from("/tmp/gamedb-state")));
    }
}
