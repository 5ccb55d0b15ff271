//! Content summary for the admin dashboard.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::Collection;
use crate::services::{settings_service, ContentBackend, ContentError};

/// Record counts per collection, plus stored files and settings presence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSummary {
    pub collections: BTreeMap<Collection, i64>,
    pub files: i64,
    pub settings: bool,
}

impl ContentSummary {
    pub fn count(&self, collection: Collection) -> i64 {
        self.collections.get(&collection).copied().unwrap_or(0)
    }

    pub fn total_records(&self) -> i64 {
        self.collections.values().sum()
    }
}

pub async fn content_summary(backend: &ContentBackend) -> Result<ContentSummary, ContentError> {
    let mut collections = BTreeMap::new();
    for collection in Collection::ALL {
        collections.insert(collection, backend.store.count(collection).await?);
    }
    let files = backend.store.count_files().await?;
    let settings = settings_service::get_settings(backend).await?.is_some();

    Ok(ContentSummary {
        collections,
        files,
        settings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Language;
    use crate::services::content_service;

    #[tokio::test]
    async fn empty_backend_has_zero_counts() {
        let backend = ContentBackend::in_memory();
        let summary = content_summary(&backend).await.unwrap();

        assert_eq!(summary.collections.len(), Collection::ALL.len());
        assert_eq!(summary.total_records(), 0);
        assert_eq!(summary.files, 0);
        assert!(!summary.settings);
    }

    #[tokio::test]
    async fn counts_follow_created_records() {
        let backend = ContentBackend::in_memory();
        for name in ["English", "Spanish"] {
            content_service::create(
                &backend,
                Language {
                    name: name.into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        }

        let summary = content_summary(&backend).await.unwrap();
        assert_eq!(summary.count(Collection::Languages), 2);
        assert_eq!(summary.count(Collection::Projects), 0);
        assert_eq!(summary.total_records(), 2);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["collections"]["languages"], 2);
    }
}
