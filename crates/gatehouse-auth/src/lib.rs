//! # gatehouse-auth
//!
//! Session-bounded authentication for Gatehouse.
//!
//! ## Modules
//!
//! - `gate` — login, logout, per-request authentication and access decisions
//! - `session` — session registry with per-principal limits and lazy expiry
//! - `remember_me` — long-lived, rotating persistent-login tokens
//! - `password` — Argon2id password verification
//! - `credential` — in-memory credential store
//! - `error` — authentication outcome errors

pub mod credential;
pub mod error;
pub mod gate;
pub mod password;
pub mod remember_me;
pub mod session;

pub use credential::InMemoryCredentialStore;
pub use error::AuthError;
pub use gate::{
    AccessDecision, AccessPolicy, AuthMethod, Authentication, AuthenticationGate, Credentials,
    LoginOutcome, PathPattern, Requirement,
};
pub use password::Argon2Hasher;
pub use remember_me::{RememberMeToken, RememberMeTokenManager, TokenExchange};
pub use session::{Admission, Session, SessionRegistry, SessionSweeper, SweepReport};
