//! gamedb API client
//!
//! Typed access to the game-data REST API:
//! - `ApiClient` issues requests, attaches the bearer credential and
//!   normalizes every response into `Result<T, ApiError>`
//! - `Session` owns the credential, persists it and keeps it renewed
//! - `Resource<E>` exposes uniform CRUD for each entity type

pub mod client;
pub mod error;
pub mod params;
pub mod resource;
pub mod schedule;
pub mod session;
pub mod storage;

pub use client::{ApiClient, ClientConfig};
pub use error::{ApiError, ApiResult};
pub use params::Params;
pub use resource::{LatestRequest, Resource};
pub use schedule::{ScheduledTask, TaskId};
pub use session::{LoginSurface, NoLoginSurface, Session, SessionConfig, SessionState};
pub use storage::{FileStorage, MemoryStorage, TokenStorage};
pub use tokio_util::sync::CancellationToken;
