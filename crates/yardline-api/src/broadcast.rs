//! Publish/subscribe channel for panel updates.
//!
//! Every accepted mutation publishes the new full panel. Subscribers that
//! are not connected at publish time miss it and are expected to fetch
//! the full state when they (re)connect.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::broadcast;
use yardline_types::PanelState;

/// Capacity of the update channel.
///
/// A subscriber that falls further behind than this receives
/// [`broadcast::error::RecvError::Lagged`] and should re-read the full
/// state instead of replaying.
const BROADCAST_CAPACITY: usize = 64;

/// Kind of message pushed to a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelEvent {
    /// Full state sent right after connecting or on request.
    InitialState,
    /// Full state after a mutation.
    StateUpdated,
}

/// Envelope for every frame sent over the `WebSocket`.
#[derive(Debug, Serialize)]
pub struct PanelMessage<'a> {
    /// Message kind.
    pub event: PanelEvent,
    /// The full panel.
    pub state: &'a PanelState,
}

/// Fan-out of panel snapshots to all current subscribers.
#[derive(Debug, Clone)]
pub struct PanelBroadcaster {
    tx: broadcast::Sender<Arc<PanelState>>,
}

impl PanelBroadcaster {
    /// Create a broadcaster with no subscribers.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self { tx }
    }

    /// Publish a snapshot. Returns how many subscribers were reached
    /// (zero when nobody is listening, which is not an error).
    pub fn publish(&self, panel: &PanelState) -> usize {
        self.tx.send(Arc::new(panel.clone())).unwrap_or(0)
    }

    /// Subscribe to future snapshots.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<PanelState>> {
        self.tx.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for PanelBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_published_state() {
        let broadcaster = PanelBroadcaster::new();
        assert_eq!(broadcaster.publish(&PanelState::default()), 0);

        let mut rx = broadcaster.subscribe();
        let mut panel = PanelState::default();
        panel.pointer = None;
        assert_eq!(broadcaster.publish(&panel), 1);
        assert_eq!(rx.recv().await.unwrap().pointer, None);
    }

    #[test]
    fn message_uses_snake_case_event_names() {
        let panel = PanelState::default();
        let json = serde_json::to_value(PanelMessage {
            event: PanelEvent::StateUpdated,
            state: &panel,
        })
        .unwrap();
        assert_eq!(json["event"], "state_updated");
        assert_eq!(json["state"]["pointer"], 1);
    }
}
