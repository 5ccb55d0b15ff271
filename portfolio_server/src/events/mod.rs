//! Content change notifications.
//!
//! Every successful mutation publishes a `ContentEvent`; subscribers
//! (the WebSocket feed, admin drafts) re-fetch what changed.

pub mod content;

pub use content::{next_event, ChangeKind, ContentEvent, EventBus};
