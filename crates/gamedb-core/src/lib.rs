//! gamedb Core Library
//!
//! Shared, I/O-free functionality for gamedb components:
//! - Bearer credential decoding and the role hierarchy
//! - Projection and query-document construction
//! - The API error envelope
//! - The entity catalog (armor, weapons, skills, monsters, ...)
//! - Configuration resolution and tracing setup

pub mod config;
pub mod entity;
pub mod envelope;
pub mod error;
pub mod query;
pub mod roles;
pub mod token;
pub mod tracing_init;

pub use config::Config;
pub use envelope::{DomainError, ErrorEnvelope, FieldFailure};
pub use error::{Error, Result};
pub use query::{Filter, Projection};
pub use roles::is_role_granted;
pub use token::{Claims, Token, TokenError};
