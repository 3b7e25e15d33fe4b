//! Bearer credential decoding.
//!
//! The API issues compact three-part signed tokens. The client never verifies
//! the signature (the server does); it only reads the claims to drive role
//! gating and renewal timing. Nothing derived here is a security boundary.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::roles;

/// Errors produced while decoding a credential string.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid token format: expected 3 segments, got {0}")]
    Format(usize),

    #[error("invalid token payload encoding: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid token claims: {0}")]
    Claims(#[from] serde_json::Error),
}

/// Claims read from the payload segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user identifier).
    #[serde(default)]
    pub sub: String,
    /// Expiration (unix timestamp, seconds).
    pub exp: i64,
    /// Issued at (unix timestamp, seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "displayName")]
    pub name: Option<String>,
    /// Granted roles.
    #[serde(default)]
    pub roles: Vec<String>,
}

/// A decoded, immutable bearer credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    raw: String,
    claims: Claims,
}

impl Token {
    /// Decode a compact token string without verifying its signature.
    pub fn decode(raw: impl Into<String>) -> Result<Self, TokenError> {
        let raw = raw.into();
        let segments: Vec<&str> = raw.split('.').collect();
        if segments.len() != 3 {
            return Err(TokenError::Format(segments.len()));
        }

        let payload = URL_SAFE_NO_PAD.decode(segments[1].trim_end_matches('='))?;
        let claims = serde_json::from_slice(&payload)?;
        Ok(Self { raw, claims })
    }

    /// The raw compact string, as sent in the `Authorization` header.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub const fn claims(&self) -> &Claims {
        &self.claims
    }

    pub fn subject(&self) -> &str {
        &self.claims.sub
    }

    /// Human-readable name, falling back to the subject.
    pub fn display_name(&self) -> &str {
        self.claims.name.as_deref().unwrap_or(&self.claims.sub)
    }

    pub fn roles(&self) -> &[String] {
        &self.claims.roles
    }

    pub const fn expires_at(&self) -> i64 {
        self.claims.exp
    }

    /// Seconds left before expiry at `now` (negative once expired).
    pub const fn ttl_at(&self, now: i64) -> i64 {
        self.claims.exp - now
    }

    pub fn ttl(&self) -> i64 {
        self.ttl_at(now_secs())
    }

    pub const fn is_valid_at(&self, now: i64) -> bool {
        now < self.claims.exp
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(now_secs())
    }

    /// Whether the token outlives `margin`; anything at or below it would race
    /// the server's own expiry check.
    pub fn is_usable(&self, margin: Duration) -> bool {
        self.is_usable_at(now_secs(), margin)
    }

    pub fn is_usable_at(&self, now: i64, margin: Duration) -> bool {
        self.ttl_at(now) > duration_secs(margin)
    }

    /// Whether the token's roles grant `role`, following the role hierarchy.
    pub fn has_role(&self, role: &str) -> bool {
        roles::is_role_granted(role, &self.claims.roles)
    }
}

/// Current unix time in seconds.
pub fn now_secs() -> i64 {
    #[allow(clippy::cast_possible_wrap)]
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64;
    secs
}

pub(crate) fn duration_secs(d: Duration) -> i64 {
    i64::try_from(d.as_secs()).unwrap_or(i64::MAX)
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header};

    fn mint(claims: &serde_json::Value) -> String {
        jsonwebtoken::encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap()
    }

    #[test]
    fn decodes_claims_without_verification() {
        let raw = mint(&serde_json::json!({
            "sub": "42",
            "exp": 2_000_000_000_i64,
            "iat": 1_900_000_000_i64,
            "name": "Tester",
            "roles": ["editor"],
        }));
        let token = Token::decode(raw.clone()).unwrap();
        assert_eq!(token.as_str(), raw);
        assert_eq!(token.subject(), "42");
        assert_eq!(token.display_name(), "Tester");
        assert_eq!(token.expires_at(), 2_000_000_000);
        assert_eq!(token.claims().iat, Some(1_900_000_000));
        assert!(token.has_role("user"));
        assert!(!token.has_role("admin"));
    }

    #[test]
    fn display_name_falls_back_to_subject() {
        let token = Token::decode(mint(&serde_json::json!({"sub": "u1", "exp": 10}))).unwrap();
        assert_eq!(token.display_name(), "u1");
        assert!(token.roles().is_empty());
    }

    #[test]
    fn validity_is_strictly_before_expiry() {
        let token = Token::decode(mint(&serde_json::json!({"sub": "u", "exp": 1000}))).unwrap();
        for now in [0, 500, 998, 999] {
            assert!(token.is_valid_at(now), "valid at {now}");
        }
        for now in [1000, 1001, 5000] {
            assert!(!token.is_valid_at(now), "invalid at {now}");
        }
        assert_eq!(token.ttl_at(990), 10);
        assert_eq!(token.ttl_at(1010), -10);
    }

    #[test]
    fn usable_only_beyond_margin() {
        let margin = Duration::from_secs(15);
        let fresh = Token::decode(mint(&serde_json::json!({"exp": now_secs() + 3600}))).unwrap();
        let short = Token::decode(mint(&serde_json::json!({"exp": now_secs() + 10}))).unwrap();
        assert!(fresh.is_usable(margin));
        assert!(!short.is_usable(margin));
        assert!(short.is_valid());
    }

    #[test]
    fn margin_boundary_is_exclusive() {
        let margin = Duration::from_secs(15);
        let token = Token::decode(mint(&serde_json::json!({"exp": 1000}))).unwrap();
        // ttl 16, 15, 14
        assert!(token.is_usable_at(984, margin));
        assert!(!token.is_usable_at(985, margin));
        assert!(!token.is_usable_at(986, margin));
        assert!(token.is_usable_at(999, Duration::ZERO));
        assert!(!token.is_usable_at(1000, Duration::ZERO));
    }

    #[test]
    fn rejects_wrong_segment_count() {
        assert!(matches!(Token::decode("abc"), Err(TokenError::Format(1))));
        assert!(matches!(Token::decode("a.b.c.d"), Err(TokenError::Format(4))));
    }

    #[test]
    fn rejects_bad_payload() {
        assert!(matches!(
            Token::decode("aaa.!!!.ccc"),
            Err(TokenError::Base64(_))
        ));
        let not_json = URL_SAFE_NO_PAD.encode("not json");
        assert!(matches!(
            Token::decode(format!("aaa.{not_json}.ccc")),
            Err(TokenError::Claims(_))
        ));
    }

    #[test]
    fn tolerates_padded_payload() {
        let payload = base64::engine::general_purpose::URL_SAFE.encode(r#"{"exp":55}"#);
        assert!(payload.ends_with("=="));
        let token = Token::decode(format!("h.{payload}.s")).unwrap();
        assert_eq!(token.expires_at(), 55);
    }
}
