//! Session registry: admission, lookup, and invalidation of sessions.
//!
//! All registry state sits behind a single `parking_lot::RwLock`. No method
//! awaits, so every mutation (including an admission that evicts older
//! sessions) is applied atomically and cannot be interrupted half-way by a
//! cancelled request.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use gatehouse_core::config::{OverflowStrategy, SessionConfig};
use gatehouse_core::events::{EventPublisher, SessionEvent};
use gatehouse_core::traits::Clock;
use gatehouse_core::types::{SessionId, SessionLimit};

use crate::error::AuthError;

use super::model::Session;

/// Result of admitting a new session.
#[derive(Debug, Clone)]
pub struct Admission {
    /// The newly created session.
    pub session: Session,
    /// Sessions of the same principal evicted to make room, oldest first.
    pub evicted: Vec<Session>,
}

#[derive(Debug, Default)]
struct RegistryState {
    sessions: HashMap<SessionId, Session>,
    /// Session ids per principal in admission order (oldest first).
    by_principal: HashMap<String, Vec<SessionId>>,
}

impl RegistryState {
    fn insert(&mut self, session: Session) {
        self.by_principal
            .entry(session.principal.clone())
            .or_default()
            .push(session.id);
        self.sessions.insert(session.id, session);
    }

    fn remove(&mut self, id: &SessionId) -> Option<Session> {
        let session = self.sessions.remove(id)?;
        if let Some(ids) = self.by_principal.get_mut(&session.principal) {
            ids.retain(|other| other != id);
            if ids.is_empty() {
                self.by_principal.remove(&session.principal);
            }
        }
        Some(session)
    }

    fn ids_for(&self, principal: &str) -> Vec<SessionId> {
        self.by_principal.get(principal).cloned().unwrap_or_default()
    }

    fn count_for(&self, principal: &str) -> usize {
        self.by_principal.get(principal).map_or(0, Vec::len)
    }

    /// The `n` oldest session ids of `principal`.
    fn oldest_for(&self, principal: &str, n: usize) -> Vec<SessionId> {
        self.by_principal
            .get(principal)
            .map(|ids| ids.iter().take(n).copied().collect())
            .unwrap_or_default()
    }
}

/// Tracks active sessions and enforces the per-principal session limit.
pub struct SessionRegistry {
    state: RwLock<RegistryState>,
    limit: SessionLimit,
    overflow: OverflowStrategy,
    idle_timeout: Option<Duration>,
    clock: Arc<dyn Clock>,
    events: EventPublisher,
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("limit", &self.limit)
            .field("overflow", &self.overflow)
            .field("idle_timeout", &self.idle_timeout)
            .field("sessions", &self.state.read().sessions.len())
            .finish()
    }
}

impl SessionRegistry {
    /// Creates a registry from configuration.
    pub fn new(config: &SessionConfig, clock: Arc<dyn Clock>, events: EventPublisher) -> Self {
        let idle_timeout = match config.idle_timeout_minutes {
            0 => None,
            minutes => Some(Duration::minutes(minutes as i64)),
        };

        Self {
            state: RwLock::new(RegistryState::default()),
            limit: config.limit(),
            overflow: config.overflow_strategy,
            idle_timeout,
            clock,
            events,
        }
    }

    /// The configured per-principal limit.
    pub fn limit(&self) -> SessionLimit {
        self.limit
    }

    /// The event publisher session lifecycle events go to.
    pub fn events(&self) -> &EventPublisher {
        &self.events
    }

    /// Admits a new session for `principal`.
    ///
    /// Idle-expired sessions of the principal are purged first. If the
    /// principal is still at its limit, the overflow strategy decides:
    /// `KickOldest` evicts the oldest sessions until there is room,
    /// `Deny` rejects the admission with [`AuthError::SessionLimitReached`].
    pub fn admit(&self, principal: &str) -> Result<Admission, AuthError> {
        let now = self.clock.now();
        let session = Session::new(principal, now);
        let mut expired = Vec::new();
        let mut evicted = Vec::new();

        let outcome = {
            let mut state = self.state.write();

            for id in state.ids_for(principal) {
                let is_expired = state
                    .sessions
                    .get(&id)
                    .is_some_and(|s| s.is_idle_expired(now, self.idle_timeout));
                if is_expired {
                    expired.extend(state.remove(&id));
                }
            }

            let held = state.count_for(principal);
            if !self.limit.has_room_for(held) && self.overflow == OverflowStrategy::Deny {
                Err(AuthError::SessionLimitReached(
                    self.limit.maximum().unwrap_or_default(),
                ))
            } else {
                let surplus = self.limit.overflow_after_admit(held);
                for oldest in state.oldest_for(principal, surplus) {
                    evicted.extend(state.remove(&oldest));
                }
                state.insert(session.clone());
                Ok(())
            }
        };

        self.publish_expired(&expired);

        if let Err(e) = outcome {
            warn!(principal = %principal, "Session admission denied: limit reached");
            return Err(e);
        }

        for old in &evicted {
            info!(
                session_id = %old.id,
                principal = %old.principal,
                replaced_by = %session.id,
                "Evicted session for newer login"
            );
            self.events.publish(SessionEvent::Evicted {
                session_id: old.id,
                principal: old.principal.clone(),
                replaced_by: session.id,
            });
        }

        info!(session_id = %session.id, principal = %principal, "Session admitted");
        self.events.publish(SessionEvent::Created {
            session_id: session.id,
            principal: session.principal.clone(),
        });

        Ok(Admission { session, evicted })
    }

    /// Looks up a live session. An idle-expired session is removed and
    /// reported absent.
    pub fn lookup(&self, id: &SessionId) -> Option<Session> {
        let now = self.clock.now();
        {
            let state = self.state.read();
            match state.sessions.get(id) {
                None => return None,
                Some(s) if !s.is_idle_expired(now, self.idle_timeout) => return Some(s.clone()),
                Some(_) => {}
            }
        }
        self.expire(id, now);
        None
    }

    /// Looks up a live session and marks it as used now.
    pub fn touch(&self, id: &SessionId) -> Option<Session> {
        let now = self.clock.now();
        let expired = {
            let mut state = self.state.write();
            let session = state.sessions.get_mut(id)?;
            if session.is_idle_expired(now, self.idle_timeout) {
                state.remove(id)
            } else {
                session.last_seen_at = now;
                return Some(session.clone());
            }
        };
        self.publish_expired(expired.as_slice());
        None
    }

    /// Removes a session. A no-op if it is absent.
    pub fn invalidate(&self, id: &SessionId) -> Option<Session> {
        let removed = self.state.write().remove(id);
        match &removed {
            Some(session) => {
                info!(session_id = %id, principal = %session.principal, "Session invalidated");
                self.events.publish(SessionEvent::Destroyed {
                    session_id: session.id,
                    principal: session.principal.clone(),
                });
            }
            None => debug!(session_id = %id, "Invalidate on absent session ignored"),
        }
        removed
    }

    /// Removes every session of `principal`, e.g. after a credential change.
    pub fn invalidate_all_for_principal(&self, principal: &str) -> Vec<Session> {
        let removed: Vec<Session> = {
            let mut state = self.state.write();
            state
                .ids_for(principal)
                .iter()
                .filter_map(|id| state.remove(id))
                .collect()
        };

        if !removed.is_empty() {
            info!(
                principal = %principal,
                count = removed.len(),
                "Invalidated all sessions for principal"
            );
        }
        for session in &removed {
            self.events.publish(SessionEvent::Destroyed {
                session_id: session.id,
                principal: session.principal.clone(),
            });
        }
        removed
    }

    /// Live sessions of `principal`, oldest first.
    pub fn sessions_for(&self, principal: &str) -> Vec<Session> {
        let now = self.clock.now();
        let state = self.state.read();
        state
            .ids_for(principal)
            .iter()
            .filter_map(|id| state.sessions.get(id))
            .filter(|s| !s.is_idle_expired(now, self.idle_timeout))
            .cloned()
            .collect()
    }

    /// Principals holding at least one live session.
    pub fn principals(&self) -> Vec<String> {
        let now = self.clock.now();
        let state = self.state.read();
        let mut principals: Vec<String> = state
            .by_principal
            .iter()
            .filter(|(_, ids)| {
                ids.iter().any(|id| {
                    state
                        .sessions
                        .get(id)
                        .is_some_and(|s| !s.is_idle_expired(now, self.idle_timeout))
                })
            })
            .map(|(name, _)| name.clone())
            .collect();
        principals.sort();
        principals
    }

    /// Number of stored sessions, including ones not yet lazily expired.
    pub fn len(&self) -> usize {
        self.state.read().sessions.len()
    }

    /// Whether no sessions are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every idle-expired session. Returns how many were removed.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let expired: Vec<Session> = {
            let mut state = self.state.write();
            let ids: Vec<SessionId> = state
                .sessions
                .values()
                .filter(|s| s.is_idle_expired(now, self.idle_timeout))
                .map(|s| s.id)
                .collect();
            ids.iter().filter_map(|id| state.remove(id)).collect()
        };
        self.publish_expired(&expired);
        expired.len()
    }

    fn expire(&self, id: &SessionId, now: DateTime<Utc>) {
        let removed = {
            let mut state = self.state.write();
            let still_expired = state
                .sessions
                .get(id)
                .is_some_and(|s| s.is_idle_expired(now, self.idle_timeout));
            if still_expired { state.remove(id) } else { None }
        };
        self.publish_expired(removed.as_slice());
    }

    fn publish_expired(&self, expired: &[Session]) {
        for session in expired {
            debug!(session_id = %session.id, principal = %session.principal, "Session expired");
            self.events.publish(SessionEvent::Expired {
                session_id: session.id,
                principal: session.principal.clone(),
            });
        }
    }
}
