//! Long-lived persistent-login tokens.
//!
//! A token value is `series:secret`. The series identifies a token lineage
//! and never changes; the secret is replaced every time the token is
//! exchanged for a new session (when rotation is on). Only a keyed digest of
//! the secret is stored, so a leaked token table cannot be replayed.

pub mod manager;
pub mod token;

pub use manager::RememberMeTokenManager;
pub use token::{RememberMeToken, TokenExchange};
