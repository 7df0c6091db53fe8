//! The session record.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use gatehouse_core::types::SessionId;

/// One active login, owned exclusively by the [`SessionRegistry`](super::SessionRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque identifier handed to the client.
    pub id: SessionId,
    /// Username of the bound principal.
    pub principal: String,
    /// When the session was admitted.
    pub created_at: DateTime<Utc>,
    /// Last time the session was used by a request.
    pub last_seen_at: DateTime<Utc>,
}

impl Session {
    /// Create a fresh session for `principal` with a random id.
    pub fn new(principal: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: SessionId::new(),
            principal: principal.into(),
            created_at: now,
            last_seen_at: now,
        }
    }

    /// Whether the session has been idle for longer than `idle_timeout`.
    ///
    /// A `None` timeout never expires.
    pub fn is_idle_expired(&self, now: DateTime<Utc>, idle_timeout: Option<Duration>) -> bool {
        match idle_timeout {
            Some(timeout) => now - self.last_seen_at > timeout,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_expiry_boundary() {
        let start = Utc::now();
        let session = Session::new("alice", start);
        let timeout = Some(Duration::minutes(30));

        assert!(!session.is_idle_expired(start + Duration::minutes(30), timeout));
        assert!(session.is_idle_expired(start + Duration::minutes(31), timeout));
        assert!(!session.is_idle_expired(start + Duration::days(365), None));
    }
}
