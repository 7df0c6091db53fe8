//! Remember-me token configuration.

use serde::{Deserialize, Serialize};

/// Remember-me (persistent login) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RememberMeConfig {
    /// Whether remember-me tokens are issued at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Token validity in seconds, fixed at issuance.
    #[serde(default = "default_token_validity")]
    pub token_validity_seconds: u64,
    /// Server-side key used to MAC the stored token secrets.
    #[serde(default = "default_key")]
    pub key: String,
    /// Form field that requests a persistent login.
    #[serde(default = "default_parameter")]
    pub parameter: String,
    /// Cookie carrying the token value.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Replace the token secret every time it re-establishes a session.
    #[serde(default = "default_true")]
    pub rotate_on_use: bool,
}

impl Default for RememberMeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            token_validity_seconds: default_token_validity(),
            key: default_key(),
            parameter: default_parameter(),
            cookie_name: default_cookie_name(),
            rotate_on_use: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_token_validity() -> u64 {
    21 * 24 * 60 * 60
}

fn default_key() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_parameter() -> String {
    "remember-me".to_string()
}

fn default_cookie_name() -> String {
    "remember-me".to_string()
}
