//! In-process content store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{validate_reorder, ContentStore, StoreError, StoreResult};
use crate::models::document::SettingsRow;
use crate::models::{Collection, Document, NewDocument, NewStoredFile, OrderAssignment, StoredFile};

#[derive(Default)]
struct Inner {
    /// Documents per collection, in insertion order.
    documents: HashMap<Collection, Vec<Document>>,
    settings: HashMap<String, SettingsRow>,
    files: HashMap<Uuid, StoredFile>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn list(&self, collection: Collection) -> StoreResult<Vec<Document>> {
        let inner = self.inner.read().await;
        let mut docs = inner.documents.get(&collection).cloned().unwrap_or_default();
        // stable sort keeps insertion order for equal orders
        docs.sort_by_key(|d| d.order);
        Ok(docs)
    }

    async fn get(&self, collection: Collection, id: Uuid) -> StoreResult<Option<Document>> {
        let inner = self.inner.read().await;
        Ok(inner
            .documents
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id))
            .cloned())
    }

    async fn insert(&self, collection: Collection, doc: NewDocument) -> StoreResult<Document> {
        let now = Utc::now();
        let document = Document {
            id: Uuid::new_v4(),
            collection,
            order: doc.order,
            data: doc.data,
            created_at: now,
            updated_at: now,
        };
        let mut inner = self.inner.write().await;
        inner
            .documents
            .entry(collection)
            .or_default()
            .push(document.clone());
        Ok(document)
    }

    async fn replace(&self, collection: Collection, id: Uuid, doc: NewDocument) -> StoreResult<Document> {
        let mut inner = self.inner.write().await;
        let existing = inner
            .documents
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
            .ok_or(StoreError::NotFound { collection, id })?;
        existing.order = doc.order;
        existing.data = doc.data;
        existing.updated_at = Utc::now();
        Ok(existing.clone())
    }

    async fn remove(&self, collection: Collection, id: Uuid) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let Some(docs) = inner.documents.get_mut(&collection) else {
            return Ok(false);
        };
        let before = docs.len();
        docs.retain(|d| d.id != id);
        Ok(docs.len() != before)
    }

    async fn reorder(&self, collection: Collection, assignments: &[OrderAssignment]) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let docs = inner.documents.entry(collection).or_default();
        let existing: Vec<Uuid> = docs.iter().map(|d| d.id).collect();
        validate_reorder(&existing, assignments)?;

        let now = Utc::now();
        for assignment in assignments {
            if let Some(doc) = docs.iter_mut().find(|d| d.id == assignment.id) {
                doc.order = assignment.order;
                doc.updated_at = now;
            }
        }
        Ok(())
    }

    async fn count(&self, collection: Collection) -> StoreResult<i64> {
        let inner = self.inner.read().await;
        Ok(inner.documents.get(&collection).map_or(0, |d| d.len() as i64))
    }

    async fn clear(&self, collection: Collection) -> StoreResult<u64> {
        let mut inner = self.inner.write().await;
        Ok(inner
            .documents
            .remove(&collection)
            .map_or(0, |d| d.len() as u64))
    }

    async fn find_settings(&self, key: &str) -> StoreResult<Option<SettingsRow>> {
        let inner = self.inner.read().await;
        Ok(inner.settings.get(key).cloned())
    }

    async fn upsert_settings(&self, key: &str, data: serde_json::Value) -> StoreResult<SettingsRow> {
        let now = Utc::now();
        let mut inner = self.inner.write().await;
        let row = inner
            .settings
            .entry(key.to_string())
            .and_modify(|row| {
                row.data = data.clone();
                row.write_date = now;
            })
            .or_insert_with(|| SettingsRow {
                key: key.to_string(),
                data: data.clone(),
                create_date: now,
                write_date: now,
            });
        Ok(row.clone())
    }

    async fn insert_file(&self, file: NewStoredFile) -> StoreResult<StoredFile> {
        let mut inner = self.inner.write().await;
        if inner.files.contains_key(&file.id) {
            return Err(StoreError::Conflict(format!(
                "upload target {} was already used",
                file.id
            )));
        }
        let stored = StoredFile {
            id: file.id,
            content_type: file.content_type,
            size_bytes: file.size_bytes,
            sha256: file.sha256,
            file_name: file.file_name,
            create_date: Utc::now(),
        };
        inner.files.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_file(&self, id: Uuid) -> StoreResult<Option<StoredFile>> {
        let inner = self.inner.read().await;
        Ok(inner.files.get(&id).cloned())
    }

    async fn count_files(&self) -> StoreResult<i64> {
        let inner = self.inner.read().await;
        Ok(inner.files.len() as i64)
    }
}
