//! Client error taxonomy.

use gamedb_core::{DomainError, TokenError};
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Every way an API call can fail.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never got a conforming answer: network failure, non-JSON
    /// body, or an error status without an envelope.
    #[error("HTTP request failed: {message}")]
    Transport { status: Option<u16>, message: String },

    /// The server answered with an `{error}` envelope.
    #[error("API error {0}")]
    Domain(DomainError),

    /// The payload was JSON but not the expected shape.
    #[error("Unexpected response shape: {0}")]
    Decode(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Invalid token: {0}")]
    Token(#[from] TokenError),

    #[error("Credential storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Server-defined error code, for domain errors.
    pub fn code(&self) -> Option<&str> {
        self.domain().map(|e| e.code.as_str())
    }

    pub const fn domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(e) => Some(e),
            _ => None,
        }
    }

    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}
