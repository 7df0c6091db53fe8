//! Secret comparison against a stored credential hash.

use async_trait::async_trait;

use crate::result::AppResult;

/// Compares a presented secret against a stored hash.
#[async_trait]
pub trait PasswordVerifier: Send + Sync + std::fmt::Debug {
    /// Returns `Ok(true)` if `presented` matches `credential_hash`, `Ok(false)` if not.
    ///
    /// Errors are reserved for malformed hashes or backend failures.
    async fn verify(&self, presented: &str, credential_hash: &str) -> AppResult<bool>;

    /// Perform a verification of comparable cost whose result is discarded.
    ///
    /// Called when the username is unknown, so that both credential failure
    /// paths take the same time.
    async fn verify_dummy(&self, presented: &str);
}
