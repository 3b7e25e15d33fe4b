//! Error types for gamedb core library.

use thiserror::Error;

/// Result type alias using gamedb Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for gamedb operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error: unreadable or unparsable settings, with the
    /// offending path in the message.
    #[error("Configuration error: {0}")]
    Config(String),
}
