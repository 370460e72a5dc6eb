use tokio::sync::broadcast;

use crate::dto::sse::ServerEvent;

/// SSE-specific sub-state carved out from [`AppState`](super::AppState).
pub struct SseState {
    public: SseHub,
    admin: SseHub,
}

impl SseState {
    /// Build the SSE sub-tree with per-stream channel capacities.
    pub fn new(public_capacity: usize, admin_capacity: usize) -> Self {
        Self {
            public: SseHub::new(public_capacity),
            admin: SseHub::new(admin_capacity),
        }
    }

    /// Hub fanning out board snapshots and clock ticks to viewers.
    pub fn public(&self) -> &SseHub {
        &self.public
    }

    /// Hub carrying operator-only notifications.
    pub fn admin(&self) -> &SseHub {
        &self.admin
    }
}

/// Simple broadcast hub wrapper used by the SSE services.
pub struct SseHub {
    sender: broadcast::Sender<ServerEvent>,
}

impl SseHub {
    /// Construct a new hub backed by a Tokio broadcast channel with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a new subscriber that will receive subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    /// Send an event to all current subscribers, ignoring delivery errors.
    pub fn broadcast(&self, event: ServerEvent) {
        let _ = self.sender.send(event);
    }

    /// Number of connected subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn broadcast_reaches_every_subscriber() {
        let hub = SseHub::new(4);
        let mut first = hub.subscribe();
        let mut second = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 2);

        hub.broadcast(ServerEvent::json(Some("clock.tick".to_string()), &[1, 2]).unwrap());

        assert_eq!(first.recv().await.unwrap().data, "[1,2]");
        assert_eq!(second.recv().await.unwrap().event.as_deref(), Some("clock.tick"));
    }

    #[test]
    fn broadcast_without_subscribers_is_silent() {
        let state = SseState::new(2, 2);
        state
            .public()
            .broadcast(ServerEvent::json(None::<String>, &"hello").unwrap());
        assert_eq!(state.admin().subscriber_count(), 0);
    }
}
