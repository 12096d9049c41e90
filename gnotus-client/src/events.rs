//! In-process notifications between views

use tokio::sync::broadcast;
use tracing::debug;

/// Events broadcast to any mounted view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientEvent {
    /// The document tree changed shape; outline views must refetch now
    /// rather than wait for their own TTL window.
    OutlineChanged,
}

/// Broadcast bus for client events.
///
/// Receivers that lag simply miss events; every event here is a hint to
/// refetch, so a lost one is recovered by the next TTL expiry.
pub struct EventBus {
    tx: broadcast::Sender<ClientEvent>,
}

impl EventBus {
    /// Create a bus with a small replay buffer
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self { tx }
    }

    /// Subscribe to future events
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all current subscribers
    pub fn emit(&self, event: ClientEvent) {
        // An error only means nobody is listening
        if self.tx.send(event).is_err() {
            debug!(?event, "event emitted with no subscribers");
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn emit_reaches_subscriber() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        bus.emit(ClientEvent::OutlineChanged);
        assert_eq!(rx.recv().await.unwrap(), ClientEvent::OutlineChanged);
    }

    #[test]
    fn emit_without_subscribers_is_fine() {
        let bus = EventBus::new();
        bus.emit(ClientEvent::OutlineChanged);
    }
}
