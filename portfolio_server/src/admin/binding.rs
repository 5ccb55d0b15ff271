//! The mutation surface an entity editor is bound to.

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::models::Collection;
use crate::services::{content_service, ContentBackend};

/// List/create/update/delete on JSON records of one collection.
#[async_trait]
pub trait EntityBinding: Send + Sync {
    async fn list(&self, collection: Collection) -> anyhow::Result<Vec<Value>>;

    /// Returns the stored record, including its new `id`.
    async fn create(&self, collection: Collection, fields: Value) -> anyhow::Result<Value>;

    async fn update(&self, collection: Collection, id: Uuid, fields: Value) -> anyhow::Result<Value>;

    async fn delete(&self, collection: Collection, id: Uuid) -> anyhow::Result<()>;
}

/// Binding straight onto an in-process backend.
#[derive(Clone)]
pub struct LocalBinding {
    backend: ContentBackend,
}

impl LocalBinding {
    pub fn new(backend: ContentBackend) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl EntityBinding for LocalBinding {
    async fn list(&self, collection: Collection) -> anyhow::Result<Vec<Value>> {
        Ok(content_service::list_json(&self.backend, collection).await?)
    }

    async fn create(&self, collection: Collection, fields: Value) -> anyhow::Result<Value> {
        Ok(content_service::create_json(&self.backend, collection, fields).await?)
    }

    async fn update(&self, collection: Collection, id: Uuid, fields: Value) -> anyhow::Result<Value> {
        Ok(content_service::update_json(&self.backend, collection, id, fields).await?)
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> anyhow::Result<()> {
        Ok(content_service::delete_json(&self.backend, collection, id).await?)
    }
}
