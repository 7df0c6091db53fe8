//! Username to credential record lookup.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::Principal;

/// Resolves a username to its stored credential record.
///
/// Implementations may be backed by a database or a directory service and
/// are free to suspend; the gate awaits them before touching any session
/// state.
#[async_trait]
pub trait CredentialStore: Send + Sync + std::fmt::Debug {
    /// Look up a principal by exact, case-sensitive username.
    ///
    /// Returns `Ok(None)` when no such principal exists; errors are reserved
    /// for backend failures.
    async fn find_by_username(&self, username: &str) -> AppResult<Option<Principal>>;
}
