//! Session lifecycle events.

use serde::{Deserialize, Serialize};

use crate::types::SessionId;

/// Events related to the session lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// A session was admitted for a principal.
    Created {
        /// The session ID.
        session_id: SessionId,
        /// The principal's username.
        principal: String,
    },
    /// A session ended through logout or a forced invalidation.
    Destroyed {
        /// The session ID.
        session_id: SessionId,
        /// The principal's username.
        principal: String,
    },
    /// A session was removed to make room for a newer login of the same principal.
    Evicted {
        /// The evicted session ID.
        session_id: SessionId,
        /// The principal's username.
        principal: String,
        /// The session that replaced it.
        replaced_by: SessionId,
    },
    /// A session expired due to inactivity.
    Expired {
        /// The session ID.
        session_id: SessionId,
        /// The principal's username.
        principal: String,
    },
}

impl SessionEvent {
    /// The session this event refers to.
    pub fn session_id(&self) -> SessionId {
        match self {
            Self::Created { session_id, .. }
            | Self::Destroyed { session_id, .. }
            | Self::Evicted { session_id, .. }
            | Self::Expired { session_id, .. } => *session_id,
        }
    }
}
