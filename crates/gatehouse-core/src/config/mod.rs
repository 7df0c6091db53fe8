//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. Every field has a default, so an empty file yields a working
//! configuration equivalent to the stock form-login setup.

pub mod access;
pub mod auth;
pub mod logging;
pub mod remember_me;
pub mod server;
pub mod session;

use serde::{Deserialize, Serialize};

pub use self::access::{AccessConfig, AccessRuleConfig};
pub use self::auth::{AuthConfig, UserSeed};
pub use self::logging::LoggingConfig;
pub use self::remember_me::RememberMeConfig;
pub use self::server::ServerConfig;
pub use self::session::{OverflowStrategy, SessionConfig};

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Form login, logout and redirect settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Session registry settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Remember-me token settings.
    #[serde(default)]
    pub remember_me: RememberMeConfig,
    /// Path access rules.
    #[serde(default)]
    pub access: AccessConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Accounts loaded into the in-memory credential store at startup.
    #[serde(default)]
    pub users: Vec<UserSeed>,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `GATEHOUSE_`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("GATEHOUSE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Parse configuration from a TOML string, without file or environment sources.
    pub fn from_toml(source: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_source_uses_defaults() {
        let config = AppConfig::from_toml("").expect("empty config");

        assert_eq!(config.session.maximum_sessions, 1);
        assert_eq!(config.session.cookie_name, "JSESSIONID");
        assert_eq!(config.remember_me.token_validity_seconds, 21 * 24 * 60 * 60);
        assert_eq!(config.remember_me.cookie_name, "remember-me");
        assert_eq!(config.auth.username_parameter, "sbat-username");
        assert_eq!(config.auth.logout_url, "/logout");
        assert!(config.access.public_paths.contains(&"/css/**".to_string()));
        assert!(config.users.is_empty());
    }

    #[test]
    fn test_overrides_are_applied() {
        let source = r#"
            [session]
            maximum_sessions = 3
            overflow_strategy = "deny"

            [remember_me]
            token_validity_seconds = 60
            rotate_on_use = false

            [[users]]
            username = "alice"
            password_hash = "$argon2id$stub"
            roles = ["USER"]
        "#;

        let config = AppConfig::from_toml(source).expect("parse");

        assert_eq!(config.session.maximum_sessions, 3);
        assert_eq!(config.session.overflow_strategy, OverflowStrategy::Deny);
        assert_eq!(config.remember_me.token_validity_seconds, 60);
        assert!(!config.remember_me.rotate_on_use);
        assert_eq!(config.users.len(), 1);
        assert_eq!(config.users[0].roles, vec!["USER".to_string()]);
    }
}
