//! Portfolio content models: typed entities stored as ordered documents.

pub mod about;
pub mod certificate;
pub mod document;
pub mod experience;
pub mod file;
pub mod language;
pub mod project;
pub mod provider;
pub mod settings;
pub mod technology;

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use about::{AboutCategory, AboutItem};
pub use certificate::Certificate;
pub use document::{Document, NewDocument};
pub use experience::Experience;
pub use file::{NewStoredFile, StoredFile};
pub use language::{Language, ProficiencyLevel};
pub use project::{Project, ProjectStatus};
pub use provider::Provider;
pub use settings::{SiteSettings, SETTINGS_KEY};
pub use technology::{TechCategory, Technology};

static KEY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9_-]*$").expect("static regex"));
static URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(https?://|/)\S+$").expect("static regex"));

/// A content collection (one table of the content schema).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Experiences,
    Projects,
    Languages,
    Technologies,
    Providers,
    Certificates,
    AboutCategories,
    AboutItems,
}

impl Collection {
    pub const ALL: [Collection; 8] = [
        Collection::Providers,
        Collection::AboutCategories,
        Collection::Certificates,
        Collection::AboutItems,
        Collection::Experiences,
        Collection::Projects,
        Collection::Languages,
        Collection::Technologies,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Experiences => "experiences",
            Collection::Projects => "projects",
            Collection::Languages => "languages",
            Collection::Technologies => "technologies",
            Collection::Providers => "providers",
            Collection::Certificates => "certificates",
            Collection::AboutCategories => "about_categories",
            Collection::AboutItems => "about_items",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Collection::ALL
            .into_iter()
            .find(|c| c.as_str() == s || c.as_str().replace('_', "-") == s)
            .ok_or_else(|| format!("unknown collection: {s}"))
    }
}

/// A required field was missing or a field held a malformed value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn required(field: &str) -> Self {
        Self::new(field, "is required")
    }
}

/// A typed content entity.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: Collection;

    fn order(&self) -> i32;

    fn set_order(&mut self, order: i32);

    /// Required-field and format checks, run before any write.
    fn validate(&self) -> Result<(), ValidationError>;

    /// Records this entity points at, checked to exist before writes.
    fn references(&self) -> Vec<(Collection, Uuid)> {
        Vec::new()
    }
}

/// A stored entity: its identity plus its fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<T> {
    pub id: Uuid,
    #[serde(flatten)]
    pub fields: T,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<T: Entity> Record<T> {
    /// Decode a stored document, restoring the `order` column into the fields.
    pub fn from_document(doc: Document) -> Result<Self, serde_json::Error> {
        let mut data = match doc.data {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        data.insert("order".to_string(), doc.order.into());
        let fields: T = serde_json::from_value(serde_json::Value::Object(data))?;
        Ok(Self {
            id: doc.id,
            fields,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        })
    }
}

/// Split typed fields into the store's `(order, data)` shape.
pub fn to_new_document<T: Entity>(fields: &T) -> Result<NewDocument, serde_json::Error> {
    let mut data = match serde_json::to_value(fields)? {
        serde_json::Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    data.remove("order");
    data.remove("id");
    Ok(NewDocument {
        order: fields.order(),
        data: serde_json::Value::Object(data),
    })
}

/// One entry of a bulk reorder payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAssignment {
    pub id: Uuid,
    pub order: i32,
}

// ── Field checks shared by the entity validators ──

pub(crate) fn require(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(())
}

pub(crate) fn require_key(field: &str, value: &str) -> Result<(), ValidationError> {
    require(field, value)?;
    if !KEY_REGEX.is_match(value) {
        return Err(ValidationError::new(
            field,
            "must be lowercase letters, digits, '-' or '_'",
        ));
    }
    Ok(())
}

pub(crate) fn check_url(field: &str, value: Option<&str>) -> Result<(), ValidationError> {
    match value {
        Some(v) if !v.is_empty() && !URL_REGEX.is_match(v) => {
            Err(ValidationError::new(field, "must be an http(s) URL or absolute path"))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_parses_path_segments() {
        assert_eq!("projects".parse::<Collection>(), Ok(Collection::Projects));
        assert_eq!(
            "about-items".parse::<Collection>(),
            Ok(Collection::AboutItems)
        );
        assert!("widgets".parse::<Collection>().is_err());
    }

    #[test]
    fn key_and_url_checks() {
        assert!(require_key("key", "aws-certs").is_ok());
        assert!(require_key("key", "AWS").is_err());
        assert!(check_url("url", Some("https://example.com/x")).is_ok());
        assert!(check_url("url", Some("/files/abc")).is_ok());
        assert!(check_url("url", Some("ftp:/nope")).is_err());
        assert!(check_url("url", None).is_ok());
    }

    #[test]
    fn document_round_trip_keeps_order_out_of_data() {
        let project = Project {
            title: "Site".into(),
            description: "Portfolio".into(),
            status: ProjectStatus::Completed,
            order: 4,
            ..Default::default()
        };
        let doc = to_new_document(&project).unwrap();
        assert_eq!(doc.order, 4);
        assert!(doc.data.get("order").is_none());

        let stored = Document {
            id: Uuid::new_v4(),
            collection: Collection::Projects,
            order: doc.order,
            data: doc.data,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let record = Record::<Project>::from_document(stored).unwrap();
        assert_eq!(record.fields, project);
    }
}
