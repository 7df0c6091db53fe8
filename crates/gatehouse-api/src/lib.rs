//! # gatehouse-api
//!
//! HTTP adapter for Gatehouse built on Axum.
//!
//! Maps the authentication gate onto form login, logout, cookies, and a
//! blanket access middleware evaluated before any handler runs.

pub mod cookies;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
