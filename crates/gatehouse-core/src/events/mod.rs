//! Domain events emitted by the authentication gate.
//!
//! Events are fanned out on a `tokio::sync::broadcast` channel. Publishing
//! never blocks and never fails the operation that produced the event; a
//! publisher with no subscribers simply drops them.

pub mod session;

use tokio::sync::broadcast;
use tracing::trace;

pub use session::SessionEvent;

/// Default channel capacity; lagging subscribers lose the oldest events.
const DEFAULT_CAPACITY: usize = 256;

/// Broadcasts [`SessionEvent`]s to any number of subscribers.
#[derive(Debug, Clone)]
pub struct EventPublisher {
    sender: broadcast::Sender<SessionEvent>,
}

impl EventPublisher {
    /// Create a publisher with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a publisher with an explicit channel capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to current subscribers.
    pub fn publish(&self, event: SessionEvent) {
        if self.sender.send(event).is_err() {
            trace!("Session event dropped, no subscribers");
        }
    }

    /// Subscribe to events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SessionId;

    #[tokio::test]
    async fn test_subscriber_receives_published_event() {
        let publisher = EventPublisher::new();
        let mut rx = publisher.subscribe();
        let session_id = SessionId::new();

        publisher.publish(SessionEvent::Created {
            session_id,
            principal: "alice".to_string(),
        });

        match rx.recv().await.expect("event") {
            SessionEvent::Created { session_id: id, principal } => {
                assert_eq!(id, session_id);
                assert_eq!(principal, "alice");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let publisher = EventPublisher::new();
        publisher.publish(SessionEvent::Expired {
            session_id: SessionId::new(),
            principal: "bob".to_string(),
        });
    }
}
