// ── Push event channel ──
//
// In-process seam for server push notifications. The socket transport
// (out of scope here) emits into the channel; stores subscribe for the
// events they handle. Missed events are acceptable -- every push effect
// in the core is a best-effort in-memory flag flip.

use tokio::sync::broadcast;

use crate::model::Guid;

const PUSH_CHANNEL_SIZE: usize = 64;

/// Events delivered over the push channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushEvent {
    /// A conversation received a message; flip its unread marker.
    TouchConversation { guid: Guid },
}

/// Fan-out channel for push events.
#[derive(Debug)]
pub struct PushChannel {
    tx: broadcast::Sender<PushEvent>,
}

impl Default for PushChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl PushChannel {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(PUSH_CHANNEL_SIZE);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PushEvent> {
        self.tx.subscribe()
    }

    /// Emit an event. Dropped silently when nobody is listening.
    pub fn emit(&self, event: PushEvent) {
        let _ = self.tx.send(event);
    }
}
