//! Portfolio services: typed business logic over the content store.

pub mod content_service;
pub mod project_service;
pub mod settings_service;
pub mod upload_service;

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::events::EventBus;
use crate::models::ValidationError;
use crate::store::{ContentStore, MemoryStore, ReorderError, StoreError};
use upload_service::UploadError;

/// A connected content backend: the store plus its change feed.
#[derive(Clone)]
pub struct ContentBackend {
    pub store: Arc<dyn ContentStore>,
    pub events: EventBus,
    /// Held by record writes from their checks through the store call.
    /// Covers writers in this process only.
    writes: Arc<Mutex<()>>,
}

impl ContentBackend {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self {
            store,
            events: EventBus::new(),
            writes: Arc::new(Mutex::new(())),
        }
    }

    pub(crate) async fn write_guard(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.writes.lock().await
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Reorder(#[from] ReorderError),
    #[error("{0}")]
    Upload(#[from] UploadError),
    #[error("malformed payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("file storage failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage failure: {0}")]
    Store(StoreError),
}

impl From<StoreError> for ContentError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => ContentError::NotFound(err.to_string()),
            StoreError::Conflict(message) => ContentError::Conflict(message),
            StoreError::InvalidReorder(reorder) => ContentError::Reorder(reorder),
            other => ContentError::Store(other),
        }
    }
}
