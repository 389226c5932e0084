//! In-process event bus backed by a tokio broadcast channel.

use tokio::sync::broadcast;
use tracing::trace;

use super::DomainEvent;

/// Fan-out publisher for [`DomainEvent`]s.
///
/// Publishing never fails: with no subscribers the event is dropped, and
/// slow subscribers observe `RecvError::Lagged`.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Create a bus that buffers up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: DomainEvent) {
        let kind = event.payload.name();
        let delivered = self.sender.send(event).unwrap_or(0);
        trace!(kind, delivered, "Published permission event");
    }

    /// Subscribe to events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
