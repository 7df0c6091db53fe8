//! Form login, logout, and credential seed configuration.

use serde::{Deserialize, Serialize};

/// Form login and logout configuration.
///
/// Field names and redirect targets are deployment values; the gate never
/// hard-codes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Path of the login page; the login form posts back to the same path.
    #[serde(default = "default_login_page")]
    pub login_page: String,
    /// Redirect target after a successful login.
    #[serde(default = "default_success_url")]
    pub default_success_url: String,
    /// Redirect target after a failed login.
    #[serde(default = "default_failure_url")]
    pub failure_url: String,
    /// Form field carrying the username.
    #[serde(default = "default_username_parameter")]
    pub username_parameter: String,
    /// Form field carrying the password.
    #[serde(default = "default_password_parameter")]
    pub password_parameter: String,
    /// Path that performs logout.
    #[serde(default = "default_logout_url")]
    pub logout_url: String,
    /// Redirect target after logout.
    #[serde(default = "default_logout_success_url")]
    pub logout_success_url: String,
    /// Redirect target when an authenticated principal lacks a required role.
    #[serde(default = "default_access_denied_page")]
    pub access_denied_page: String,
    /// Whether `Authorization: Basic` credentials are accepted per request.
    #[serde(default = "default_true")]
    pub http_basic: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            login_page: default_login_page(),
            default_success_url: default_success_url(),
            failure_url: default_failure_url(),
            username_parameter: default_username_parameter(),
            password_parameter: default_password_parameter(),
            logout_url: default_logout_url(),
            logout_success_url: default_logout_success_url(),
            access_denied_page: default_access_denied_page(),
            http_basic: true,
        }
    }
}

/// An account loaded into the in-memory credential store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSeed {
    /// Unique, case-sensitive username.
    pub username: String,
    /// PHC-formatted Argon2 hash (see the `hash-password` command).
    pub password_hash: String,
    /// Granted roles.
    #[serde(default)]
    pub roles: Vec<String>,
}

fn default_login_page() -> String {
    "/sbat/login".to_string()
}

fn default_success_url() -> String {
    "/sbat/index".to_string()
}

fn default_failure_url() -> String {
    "/sbat/error".to_string()
}

fn default_username_parameter() -> String {
    "sbat-username".to_string()
}

fn default_password_parameter() -> String {
    "sbat-password".to_string()
}

fn default_logout_url() -> String {
    "/logout".to_string()
}

fn default_logout_success_url() -> String {
    "/sbat/index".to_string()
}

fn default_access_denied_page() -> String {
    "/403".to_string()
}

fn default_true() -> bool {
    true
}
