//! Content store: the typed client interface to the content database.
//!
//! `PgStore` is the production backend (PostgreSQL via diesel-async);
//! `MemoryStore` keeps everything in-process for tests and database-less runs.

pub mod memory;
pub mod pg;
pub mod reorder;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::document::SettingsRow;
use crate::models::{Collection, Document, NewDocument, NewStoredFile, OrderAssignment, StoredFile};

pub use memory::MemoryStore;
pub use pg::PgStore;
pub use reorder::{validate_reorder, ReorderError};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{collection} record {id} not found")]
    NotFound { collection: Collection, id: Uuid },
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("invalid reorder: {0}")]
    InvalidReorder(#[from] ReorderError),
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("connection pool error: {0}")]
    Pool(String),
    #[error("corrupt stored data: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Typed request/response surface of the content database.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// All documents of a collection, by `order` then creation time.
    async fn list(&self, collection: Collection) -> StoreResult<Vec<Document>>;

    async fn get(&self, collection: Collection, id: Uuid) -> StoreResult<Option<Document>>;

    async fn insert(&self, collection: Collection, doc: NewDocument) -> StoreResult<Document>;

    /// Overwrite a document's order and data. Fails with `NotFound`.
    async fn replace(&self, collection: Collection, id: Uuid, doc: NewDocument) -> StoreResult<Document>;

    /// Returns whether a document was removed.
    async fn remove(&self, collection: Collection, id: Uuid) -> StoreResult<bool>;

    /// Apply a full reorder atomically: every order or none.
    async fn reorder(&self, collection: Collection, assignments: &[OrderAssignment]) -> StoreResult<()>;

    async fn count(&self, collection: Collection) -> StoreResult<i64>;

    /// Delete every document of a collection, returning how many went.
    async fn clear(&self, collection: Collection) -> StoreResult<u64>;

    async fn find_settings(&self, key: &str) -> StoreResult<Option<SettingsRow>>;

    async fn upsert_settings(&self, key: &str, data: serde_json::Value) -> StoreResult<SettingsRow>;

    /// Record an uploaded file. Fails with `Conflict` if the id is taken.
    async fn insert_file(&self, file: NewStoredFile) -> StoreResult<StoredFile>;

    async fn find_file(&self, id: Uuid) -> StoreResult<Option<StoredFile>>;

    async fn count_files(&self) -> StoreResult<i64>;
}
