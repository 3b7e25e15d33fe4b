//! gamedb CLI Library
//!
//! Sign in to the game-data API and manage its entities from the terminal.

pub mod auth_cmd;
pub mod entity_cmd;
pub mod session;
