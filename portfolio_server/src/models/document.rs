//! content_documents: the storage shape shared by every collection.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Collection;
use crate::schema::{content_documents, site_settings};

/// A stored document: the `order` column plus the entity's remaining fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub collection: Collection,
    pub order: i32,
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields of a document about to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDocument {
    pub order: i32,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = content_documents)]
pub struct DocumentRow {
    pub id: Uuid,
    pub collection: String,
    pub sort_order: i32,
    pub data: serde_json::Value,
    pub create_date: DateTime<Utc>,
    pub write_date: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = content_documents)]
pub struct NewDocumentRow {
    pub id: Uuid,
    pub collection: String,
    pub sort_order: i32,
    pub data: serde_json::Value,
}

impl DocumentRow {
    pub fn into_document(self) -> Result<Document, String> {
        Ok(Document {
            id: self.id,
            collection: self.collection.parse()?,
            order: self.sort_order,
            data: self.data,
            created_at: self.create_date,
            updated_at: self.write_date,
        })
    }
}

/// The singleton settings row, keyed by a fixed logical key.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = site_settings)]
pub struct SettingsRow {
    pub key: String,
    pub data: serde_json::Value,
    pub create_date: DateTime<Utc>,
    pub write_date: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = site_settings)]
pub struct NewSettingsRow {
    pub key: String,
    pub data: serde_json::Value,
}
