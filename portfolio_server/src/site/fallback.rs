//! Fallback content resolution.
//!
//! A site list is answered from one of three sources: live data from a
//! ready backend, nothing yet while the backend connects, or the bundled
//! fallback content when no backend is configured and fallback is enabled.

use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::snapshot::Snapshot;
use crate::models::{AboutItem, Certificate, Collection, Entity, Record};
use crate::seeder::{parse_seed, SeedDocument};

static FALLBACK_JSON: &str = include_str!("fallback.json");

static FALLBACK: LazyLock<Snapshot> = LazyLock::new(|| match parse_seed(FALLBACK_JSON) {
    Ok(doc) => build_snapshot(doc),
    Err(e) => {
        tracing::error!(error = %e, "Bundled fallback content is invalid, serving none");
        Snapshot::default()
    }
});

/// Where a list's data comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentSource<T> {
    Live(Vec<T>),
    Pending,
    Unconfigured,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListState<T> {
    pub items: Vec<T>,
    pub loading: bool,
    /// Items are bundled fallback content.
    pub fallback: bool,
}

impl<T> ListState<T> {
    fn new(items: Vec<T>, loading: bool, fallback: bool) -> Self {
        Self {
            items,
            loading,
            fallback,
        }
    }
}

/// Apply the source precedence. `fallback` is only evaluated when used.
pub fn resolve_list<T>(
    source: ContentSource<T>,
    use_fallback: bool,
    fallback: impl FnOnce() -> Vec<T>,
) -> ListState<T> {
    match source {
        ContentSource::Live(items) => ListState::new(items, false, false),
        ContentSource::Pending => ListState::new(Vec::new(), true, false),
        ContentSource::Unconfigured if use_fallback => ListState::new(fallback(), false, true),
        ContentSource::Unconfigured => ListState::new(Vec::new(), false, false),
    }
}

/// The bundled fallback content.
pub fn fallback_snapshot() -> &'static Snapshot {
    &FALLBACK
}

/// Stable id for the `index`-th fallback record of `collection`.
pub fn fallback_id(collection: Collection, index: usize) -> Uuid {
    let section = Collection::ALL
        .iter()
        .position(|c| *c == collection)
        .unwrap_or_default() as u128
        + 1;
    Uuid::from_u128((section << 64) | (index as u128 + 1))
}

fn records<T: Entity>(items: Vec<T>) -> Vec<Record<T>> {
    let epoch = DateTime::<Utc>::default();
    let mut records: Vec<Record<T>> = items
        .into_iter()
        .enumerate()
        .map(|(index, mut fields)| {
            if fields.order() <= 0 {
                fields.set_order(index as i32 + 1);
            }
            Record {
                id: fallback_id(T::COLLECTION, index),
                fields,
                created_at: epoch,
                updated_at: epoch,
            }
        })
        .collect();
    records.sort_by_key(|r| r.fields.order());
    records
}

fn build_snapshot(doc: SeedDocument) -> Snapshot {
    let provider_ids: HashMap<String, Uuid> = doc
        .providers
        .iter()
        .enumerate()
        .map(|(i, p)| (p.key.clone(), fallback_id(Collection::Providers, i)))
        .collect();
    let category_ids: HashMap<String, Uuid> = doc
        .about_categories
        .iter()
        .enumerate()
        .map(|(i, c)| (c.key.clone(), fallback_id(Collection::AboutCategories, i)))
        .collect();

    let certificates = doc
        .certificates
        .into_iter()
        .map(|seed| Certificate {
            provider_id: provider_ids.get(&seed.provider).copied().unwrap_or_default(),
            ..seed.certificate
        })
        .collect();
    let about_items = doc
        .about_items
        .into_iter()
        .map(|seed| AboutItem {
            category_id: category_ids.get(&seed.category).copied().unwrap_or_default(),
            ..seed.item
        })
        .collect();

    Snapshot {
        experiences: records(doc.experiences),
        projects: records(doc.projects),
        languages: records(doc.languages),
        technologies: records(doc.technologies),
        providers: records(doc.providers),
        certificates: records(certificates),
        about_categories: records(doc.about_categories),
        about_items: records(about_items),
        settings: doc.settings,
    }
}
