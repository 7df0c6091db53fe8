//! Session registry configuration.

use serde::{Deserialize, Serialize};

use crate::types::SessionLimit;

/// Session registry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum concurrent sessions per principal. `0` means unlimited.
    #[serde(default = "default_maximum_sessions")]
    pub maximum_sessions: u32,
    /// Strategy applied when a principal is already at its session limit.
    #[serde(default)]
    pub overflow_strategy: OverflowStrategy,
    /// Idle timeout in minutes before a session is considered expired.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_minutes: u64,
    /// Cookie carrying the session identifier.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Interval of the background sweep in seconds. `0` disables the sweep;
    /// expiry is still enforced lazily on access.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
}

impl SessionConfig {
    /// The effective per-principal session limit.
    pub fn limit(&self) -> SessionLimit {
        SessionLimit::from(self.maximum_sessions)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            maximum_sessions: default_maximum_sessions(),
            overflow_strategy: OverflowStrategy::default(),
            idle_timeout_minutes: default_idle_timeout(),
            cookie_name: default_cookie_name(),
            sweep_interval_seconds: default_sweep_interval(),
        }
    }
}

/// Strategy applied when a principal tries to exceed its session limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowStrategy {
    /// Reject the new login attempt.
    Deny,
    /// Terminate the oldest existing session to make room; the newest login wins.
    #[default]
    KickOldest,
}

impl std::fmt::Display for OverflowStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverflowStrategy::Deny => write!(f, "deny"),
            OverflowStrategy::KickOldest => write!(f, "kick_oldest"),
        }
    }
}

fn default_maximum_sessions() -> u32 {
    1
}

fn default_idle_timeout() -> u64 {
    30
}

fn default_cookie_name() -> String {
    "JSESSIONID".to_string()
}

fn default_sweep_interval() -> u64 {
    300
}
