//! Session wiring for the CLI.
//!
//! The CLI keeps its credential in `~/.gamedb/<key>` and has no screens; its
//! "login surface" is a hint on stderr.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Context;

use gamedb_client::{ApiClient, ClientConfig, FileStorage, LoginSurface, Session, SessionConfig};
use gamedb_core::Config;

/// Points the user at `gamedb auth login` when the credential is dropped.
#[derive(Debug, Default)]
pub struct TerminalLoginHint;

impl LoginSurface for TerminalLoginHint {
    fn is_current(&self) -> bool {
        false
    }

    fn present(&self) {
        let _ = writeln!(
            io::stderr(),
            "Signed out. Run `gamedb auth login` to sign in again."
        );
    }
}

/// Build a session from resolved configuration.
pub fn open(config: &Config) -> anyhow::Result<Session> {
    let client = ApiClient::new(&ClientConfig::from(&config.api))
        .context("Failed to create API client")?;
    let dir = config
        .session
        .storage_dir()
        .context("Cannot determine home directory for credential storage")?;
    let storage = FileStorage::in_dir(&dir, &config.session.storage_key);
    tracing::debug!(path = %storage.path().display(), "Using credential file");

    Ok(Session::new(
        client,
        Arc::new(storage),
        Arc::new(TerminalLoginHint),
        SessionConfig::from(&config.session),
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use gamedb_client::SessionState;

    #[tokio::test]
    async fn open_uses_configured_storage_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.session.storage_dir = Some(dir.path().to_path_buf());
        config.api.base_url = "http://127.0.0.1:9".into();

        let session = open(&config).unwrap();
        std::fs::write(dir.path().join("token"), "garbage").unwrap();
        assert_eq!(session.initialize(), SessionState::Unauthenticated);
        assert!(!dir.path().join("token").exists());
    }

    #[test]
    fn bad_base_url_is_reported() {
        let mut config = Config::default();
        config.api.base_url = String::new();
        assert!(open(&config).is_err());
    }
}
