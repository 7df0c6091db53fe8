//! Authenticated identity as seen by the gate.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A user account resolved from the credential store.
///
/// The gate never mutates a principal; it is created and owned by the
/// credential store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Unique, case-sensitive username.
    pub username: String,
    /// Opaque credential hash, interpreted only by the password verifier.
    #[serde(skip_serializing, default)]
    pub credential_hash: String,
    /// Granted roles.
    pub roles: BTreeSet<String>,
}

impl Principal {
    /// Create a principal from its parts.
    pub fn new(
        username: impl Into<String>,
        credential_hash: impl Into<String>,
        roles: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            username: username.into(),
            credential_hash: credential_hash.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether the principal holds `role` (exact, case-sensitive match).
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}
