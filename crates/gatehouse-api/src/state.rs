//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use gatehouse_auth::AuthenticationGate;
use gatehouse_core::config::AppConfig;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Authentication gate owning the session registry and token manager
    pub gate: Arc<AuthenticationGate>,
}

impl AppState {
    /// Creates the state from its parts.
    pub fn new(config: Arc<AppConfig>, gate: Arc<AuthenticationGate>) -> Self {
        Self { config, gate }
    }
}
