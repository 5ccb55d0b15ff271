//! Content event definitions and the broadcast bus carrying them.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::Collection;

/// What happened to a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
    Reordered,
    Cleared,
    SettingsUpdated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentEvent {
    /// `None` for settings changes.
    pub collection: Option<Collection>,
    pub change: ChangeKind,
    pub id: Option<Uuid>,
}

impl ContentEvent {
    pub fn record(collection: Collection, change: ChangeKind, id: Uuid) -> Self {
        Self {
            collection: Some(collection),
            change,
            id: Some(id),
        }
    }

    pub fn collection(collection: Collection, change: ChangeKind) -> Self {
        Self {
            collection: Some(collection),
            change,
            id: None,
        }
    }

    pub fn settings() -> Self {
        Self {
            collection: None,
            change: ChangeKind::SettingsUpdated,
            id: None,
        }
    }
}

const BUS_CAPACITY: usize = 256;

/// Fan-out of content events to any number of subscribers.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ContentEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BUS_CAPACITY);
        Self { sender }
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn publish(&self, event: ContentEvent) {
        tracing::debug!(
            collection = ?event.collection,
            change = ?event.change,
            id = ?event.id,
            "Content changed"
        );
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ContentEvent> {
        self.sender.subscribe()
    }
}

/// Next event for a subscriber, or `None` once the bus is gone. A receiver
/// that fell behind skips what it missed and continues from the oldest
/// event still buffered.
pub async fn next_event(rx: &mut broadcast::Receiver<ContentEvent>) -> Option<ContentEvent> {
    let mut skipped = 0u64;

    loop {
        match rx.recv().await {
            Ok(event) => {
                if skipped > 0 {
                    tracing::warn!(skipped, "Content subscriber lagged; continuing from latest event");
                }
                return Some(event);
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                skipped = skipped.saturating_add(n);
                tracing::debug!(skipped = n, total_skipped = skipped, "Content subscriber lagged");
            }
            Err(broadcast::error::RecvError::Closed) => return None,
        }
    }
}
