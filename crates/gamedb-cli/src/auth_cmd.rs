//! Auth subcommands: login, logout, status, refresh.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::{self, Write};

use gamedb_client::{Session, SessionState};
use gamedb_core::Token;

/// Auth subcommand actions.
#[derive(clap::Subcommand, Debug)]
pub enum AuthAction {
    /// Sign in and store the credential.
    Login {
        /// Username.
        #[arg(short, long)]
        username: String,
        /// Password.
        #[arg(short, long, env = "GAMEDB_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored credential.
    Logout,
    /// Show who is signed in and for how long.
    Status,
    /// Exchange the stored credential for a fresh one.
    Refresh,
}

/// Execute an auth subcommand.
pub async fn run(action: AuthAction, session: &Session) -> anyhow::Result<()> {
    let mut out = io::stdout();
    match action {
        AuthAction::Login { username, password } => {
            let state = session.login(&username, &password).await?;
            if state == SessionState::Unauthenticated {
                anyhow::bail!("Server issued a credential that expires too soon to use");
            }
            writeln!(out, "Logged in as {username}")?;
        }
        AuthAction::Logout => {
            session.initialize();
            session.logout();
            writeln!(out, "Logged out")?;
        }
        AuthAction::Status => {
            session.initialize();
            match session.token() {
                Some(token) => write_status(&mut out, &token)?,
                None => writeln!(out, "Not logged in")?,
            }
        }
        AuthAction::Refresh => {
            if session.initialize() == SessionState::Unauthenticated {
                anyhow::bail!("Not logged in. Use `gamedb auth login`");
            }
            session.refresh().await?;
            match session.token() {
                Some(token) => write_status(&mut out, &token)?,
                None => anyhow::bail!("Server issued a credential that expires too soon to use"),
            }
        }
    }
    session.dispose();
    Ok(())
}

fn write_status(out: &mut impl Write, token: &Token) -> io::Result<()> {
    writeln!(out, "Logged in as: {}", token.display_name())?;
    writeln!(out, "User ID: {}", token.subject())?;
    if !token.roles().is_empty() {
        writeln!(out, "Roles: {}", token.roles().join(", "))?;
    }
    writeln!(out, "Expires in: {}s", token.ttl().max(0))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use gamedb_core::token::now_secs;
    use jsonwebtoken::{EncodingKey, Header};

    fn token(ttl: i64, roles: &[&str]) -> Token {
        let claims = serde_json::json!({
            "sub": "42",
            "name": "Hunter",
            "exp": now_secs() + ttl,
            "roles": roles,
        });
        let raw = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        Token::decode(raw).unwrap()
    }

    #[test]
    fn status_lists_name_roles_and_ttl() {
        let mut out = Vec::new();
        write_status(&mut out, &token(600, &["editor"])).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Logged in as: Hunter\nUser ID: 42\nRoles: editor\n"));

        let ttl: i64 = text
            .lines()
            .find_map(|l| l.strip_prefix("Expires in: "))
            .and_then(|v| v.trim_end_matches('s').parse().ok())
            .unwrap();
        assert!((598..=600).contains(&ttl));
    }

    #[test]
    fn status_omits_empty_roles() {
        let mut out = Vec::new();
        write_status(&mut out, &token(600, &[])).unwrap();
        assert!(!String::from_utf8(out).unwrap().contains("Roles"));
    }
}
