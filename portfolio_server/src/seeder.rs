//! Content seeder: validates a JSON seed document and imports it.
//!
//! A seed document has one array per collection plus an optional
//! `settings` object. Certificates name their provider and about-items
//! their category by natural `key`; parents are inserted first and the
//! keys resolved to ids before the children go in.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::events::{ChangeKind, ContentEvent};
use crate::models::{
    AboutCategory, AboutItem, Certificate, Collection, Entity, Experience, Language, Project,
    Provider, SiteSettings, Technology, ValidationError, SETTINGS_KEY,
};
use crate::services::{content_service, settings_service, ContentBackend, ContentError};

const SETTINGS_SECTION: &str = "settings";

/// A certificate as written in a seed file: the provider is given by key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedCertificate {
    pub provider: String,
    #[serde(flatten)]
    pub certificate: Certificate,
}

/// An about-item as written in a seed file: the category is given by key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedAboutItem {
    pub category: String,
    #[serde(flatten)]
    pub item: AboutItem,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedDocument {
    pub settings: Option<SiteSettings>,
    pub providers: Vec<Provider>,
    pub about_categories: Vec<AboutCategory>,
    pub certificates: Vec<SeedCertificate>,
    pub about_items: Vec<SeedAboutItem>,
    pub experiences: Vec<Experience>,
    pub projects: Vec<Project>,
    pub languages: Vec<Language>,
    pub technologies: Vec<Technology>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SeedMode {
    /// Refuse to run when any record already exists.
    #[default]
    Default,
    /// Delete every record first.
    Reset,
    /// Add to whatever is already stored.
    Append,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedOptions {
    pub mode: SeedMode,
    pub validate_only: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeedReport {
    pub validated_only: bool,
    pub cleared: u64,
    pub inserted: BTreeMap<Collection, usize>,
    pub settings: bool,
}

impl SeedReport {
    pub fn total_inserted(&self) -> usize {
        self.inserted.values().sum()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("seed file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("seed file has {} problem(s):\n  {}", .0.len(), .0.join("\n  "))]
    Invalid(Vec<String>),
    #[error("database already holds {0} record(s); pass --reset to replace them or --force to append")]
    NotEmpty(i64),
    #[error(transparent)]
    Content(#[from] ContentError),
}

// ── Parsing ──

/// Parse and check a seed document, collecting every problem found.
///
/// Runs in two passes: section shapes first, then each item. Problems are
/// reported as `section[index]: message`.
pub fn parse_seed(text: &str) -> Result<SeedDocument, SeedError> {
    let root: Value = serde_json::from_str(text)?;
    let Value::Object(sections) = root else {
        return Err(SeedError::Invalid(vec![
            "document: expected a JSON object".to_string(),
        ]));
    };

    let mut problems = Vec::new();
    for (name, value) in &sections {
        if name == SETTINGS_SECTION {
            if !(value.is_object() || value.is_null()) {
                problems.push(format!("{name}: expected an object"));
            }
        } else if Collection::ALL.iter().any(|c| c.as_str() == name) {
            if !value.is_array() {
                problems.push(format!("{name}: expected an array"));
            }
        } else {
            problems.push(format!("{name}: unknown section"));
        }
    }
    if !problems.is_empty() {
        return Err(SeedError::Invalid(problems));
    }

    let settings = match sections.get(SETTINGS_SECTION) {
        Some(value) if value.is_object() => {
            match serde_json::from_value::<SiteSettings>(value.clone()) {
                Ok(settings) => {
                    if let Err(e) = settings.validate() {
                        problems.push(format!("{SETTINGS_SECTION}: {e}"));
                    }
                    Some(settings)
                }
                Err(e) => {
                    problems.push(format!("{SETTINGS_SECTION}: {e}"));
                    None
                }
            }
        }
        _ => None,
    };

    let doc = SeedDocument {
        settings,
        providers: parse_items(&sections, Collection::Providers, Provider::validate, &mut problems),
        about_categories: parse_items(
            &sections,
            Collection::AboutCategories,
            AboutCategory::validate,
            &mut problems,
        ),
        certificates: parse_items(
            &sections,
            Collection::Certificates,
            |c: &SeedCertificate| {
                require_seed_key("provider", &c.provider)?;
                c.certificate.check_fields()
            },
            &mut problems,
        ),
        about_items: parse_items(
            &sections,
            Collection::AboutItems,
            |i: &SeedAboutItem| {
                require_seed_key("category", &i.category)?;
                i.item.check_fields()
            },
            &mut problems,
        ),
        experiences: parse_items(&sections, Collection::Experiences, Experience::validate, &mut problems),
        projects: parse_items(&sections, Collection::Projects, Project::validate, &mut problems),
        languages: parse_items(&sections, Collection::Languages, Language::validate, &mut problems),
        technologies: parse_items(&sections, Collection::Technologies, Technology::validate, &mut problems),
    };

    duplicate_keys(Collection::Providers, doc.providers.iter().map(|p| p.key.as_str()), &mut problems);
    duplicate_keys(
        Collection::AboutCategories,
        doc.about_categories.iter().map(|c| c.key.as_str()),
        &mut problems,
    );

    if problems.is_empty() {
        Ok(doc)
    } else {
        Err(SeedError::Invalid(problems))
    }
}

fn parse_items<T: DeserializeOwned>(
    sections: &serde_json::Map<String, Value>,
    collection: Collection,
    check: impl Fn(&T) -> Result<(), ValidationError>,
    problems: &mut Vec<String>,
) -> Vec<T> {
    let Some(Value::Array(items)) = sections.get(collection.as_str()) else {
        return Vec::new();
    };

    let mut parsed = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match serde_json::from_value::<T>(item.clone()) {
            Ok(value) => {
                if let Err(e) = check(&value) {
                    problems.push(format!("{collection}[{index}]: {e}"));
                }
                parsed.push(value);
            }
            Err(e) => problems.push(format!("{collection}[{index}]: {e}")),
        }
    }
    parsed
}

fn require_seed_key(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(())
}

fn duplicate_keys<'a>(
    collection: Collection,
    keys: impl Iterator<Item = &'a str>,
    problems: &mut Vec<String>,
) {
    let mut seen = HashSet::new();
    for (index, key) in keys.enumerate() {
        if !seen.insert(key) {
            problems.push(format!("{collection}[{index}]: duplicate key '{key}'"));
        }
    }
}

// ── Import ──

/// Validate references and import `doc` according to `options`.
pub async fn run_seed(
    backend: &ContentBackend,
    doc: &SeedDocument,
    options: SeedOptions,
) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport {
        validated_only: options.validate_only,
        ..Default::default()
    };

    let (mut provider_ids, mut category_ids) = if options.mode == SeedMode::Append {
        existing_keys(backend).await?
    } else {
        (HashMap::new(), HashMap::new())
    };
    check_references(doc, &provider_ids, &category_ids)?;

    if options.validate_only {
        tracing::info!("Seed document is valid, nothing written");
        return Ok(report);
    }

    let existing = count_existing(backend).await?;
    match options.mode {
        SeedMode::Default if existing > 0 => return Err(SeedError::NotEmpty(existing)),
        SeedMode::Reset => {
            for collection in Collection::ALL.into_iter().rev() {
                let removed = backend
                    .store
                    .clear(collection)
                    .await
                    .map_err(ContentError::from)?;
                if removed > 0 {
                    backend
                        .events
                        .publish(ContentEvent::collection(collection, ChangeKind::Cleared));
                }
                report.cleared += removed;
            }
            tracing::warn!(removed = report.cleared, "Existing content cleared");
        }
        _ => {}
    }

    let mode = options.mode;

    let ids = insert_all(backend, doc.providers.clone(), mode, &mut report).await?;
    provider_ids.extend(doc.providers.iter().map(|p| p.key.clone()).zip(ids));

    let ids = insert_all(backend, doc.about_categories.clone(), mode, &mut report).await?;
    category_ids.extend(doc.about_categories.iter().map(|c| c.key.clone()).zip(ids));

    let certificates = doc
        .certificates
        .iter()
        .map(|seed| Certificate {
            provider_id: provider_ids.get(&seed.provider).copied().unwrap_or_default(),
            ..seed.certificate.clone()
        })
        .collect();
    insert_all(backend, certificates, mode, &mut report).await?;

    let items = doc
        .about_items
        .iter()
        .map(|seed| AboutItem {
            category_id: category_ids.get(&seed.category).copied().unwrap_or_default(),
            ..seed.item.clone()
        })
        .collect();
    insert_all(backend, items, mode, &mut report).await?;

    insert_all(backend, doc.experiences.clone(), mode, &mut report).await?;
    insert_all(backend, doc.projects.clone(), mode, &mut report).await?;
    insert_all(backend, doc.languages.clone(), mode, &mut report).await?;
    insert_all(backend, doc.technologies.clone(), mode, &mut report).await?;

    if let Some(settings) = &doc.settings {
        settings_service::upsert_settings(backend, settings.clone()).await?;
        report.settings = true;
    }

    tracing::info!(
        inserted = report.total_inserted(),
        cleared = report.cleared,
        settings = report.settings,
        "Seed complete"
    );
    Ok(report)
}

async fn existing_keys(
    backend: &ContentBackend,
) -> Result<(HashMap<String, Uuid>, HashMap<String, Uuid>), SeedError> {
    let providers = content_service::list::<Provider>(backend)
        .await?
        .into_iter()
        .map(|r| (r.fields.key, r.id))
        .collect();
    let categories = content_service::list::<AboutCategory>(backend)
        .await?
        .into_iter()
        .map(|r| (r.fields.key, r.id))
        .collect();
    Ok((providers, categories))
}

fn check_references(
    doc: &SeedDocument,
    stored_providers: &HashMap<String, Uuid>,
    stored_categories: &HashMap<String, Uuid>,
) -> Result<(), SeedError> {
    let mut problems = Vec::new();

    for (index, provider) in doc.providers.iter().enumerate() {
        if stored_providers.contains_key(&provider.key) {
            problems.push(format!("providers[{index}]: key '{}' already exists", provider.key));
        }
    }
    for (index, category) in doc.about_categories.iter().enumerate() {
        if stored_categories.contains_key(&category.key) {
            problems.push(format!(
                "about_categories[{index}]: key '{}' already exists",
                category.key
            ));
        }
    }

    let provider_keys: HashSet<&str> = doc.providers.iter().map(|p| p.key.as_str()).collect();
    for (index, cert) in doc.certificates.iter().enumerate() {
        let key = cert.provider.as_str();
        if !provider_keys.contains(key) && !stored_providers.contains_key(key) {
            problems.push(format!("certificates[{index}]: unknown provider '{key}'"));
        }
    }

    let category_keys: HashSet<&str> = doc.about_categories.iter().map(|c| c.key.as_str()).collect();
    for (index, item) in doc.about_items.iter().enumerate() {
        let key = item.category.as_str();
        if !category_keys.contains(key) && !stored_categories.contains_key(key) {
            problems.push(format!("about_items[{index}]: unknown category '{key}'"));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(SeedError::Invalid(problems))
    }
}

/// Stored records plus the settings row, if saved.
async fn count_existing(backend: &ContentBackend) -> Result<i64, SeedError> {
    let settings = backend
        .store
        .find_settings(SETTINGS_KEY)
        .await
        .map_err(ContentError::from)?;
    let mut total = i64::from(settings.is_some());
    for collection in Collection::ALL {
        total += backend
            .store
            .count(collection)
            .await
            .map_err(ContentError::from)?;
    }
    Ok(total)
}

/// Insert items in file order. Omitted orders follow file position, or go to
/// the end of the collection when appending.
async fn insert_all<T: Entity>(
    backend: &ContentBackend,
    items: Vec<T>,
    mode: SeedMode,
    report: &mut SeedReport,
) -> Result<Vec<Uuid>, SeedError> {
    let mut ids = Vec::with_capacity(items.len());
    for (index, mut item) in items.into_iter().enumerate() {
        if item.order() <= 0 && mode != SeedMode::Append {
            item.set_order(index as i32 + 1);
        }
        ids.push(content_service::create(backend, item).await?.id);
    }
    if !ids.is_empty() {
        tracing::info!(collection = %T::COLLECTION, count = ids.len(), "Seeded");
    }
    *report.inserted.entry(T::COLLECTION).or_default() += ids.len();
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> String {
        json!({
            "settings": { "name": "Ada Example", "headline": "Engineer" },
            "providers": [{ "key": "cncf", "name": "CNCF" }],
            "certificates": [
                { "provider": "cncf", "title": "CKA", "issue_date": "2023-05" }
            ],
            "about_categories": [{ "key": "values", "title": "Values" }],
            "about_items": [{ "category": "values", "title": "Craft" }],
            "projects": [
                { "title": "One", "description": "first", "status": "completed" },
                { "title": "Two", "description": "second", "status": "planned" }
            ]
        })
        .to_string()
    }

    fn problems(err: SeedError) -> Vec<String> {
        match err {
            SeedError::Invalid(problems) => problems,
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn shape_errors_are_reported_per_section() {
        let err = parse_seed(r#"{"projects": {}, "widgets": [], "settings": []}"#).unwrap_err();
        let mut found = problems(err);
        found.sort();
        assert_eq!(
            found,
            [
                "projects: expected an array",
                "settings: expected an object",
                "widgets: unknown section"
            ]
        );
    }

    #[test]
    fn item_errors_carry_section_and_index() {
        let text = json!({
            "projects": [
                { "title": "Ok", "description": "d", "status": "completed" },
                { "title": "", "description": "d", "status": "completed" }
            ],
            "languages": [{ "name": "Elvish", "level": "legendary" }]
        })
        .to_string();
        let found = problems(parse_seed(&text).unwrap_err());
        assert_eq!(found.len(), 2);
        assert!(found.contains(&"projects[1]: title: is required".to_string()));
        assert!(found.iter().any(|p| p.starts_with("languages[0]: unknown variant")));
    }

    #[test]
    fn duplicate_provider_keys_are_rejected() {
        let text = json!({
            "providers": [{ "key": "aws", "name": "AWS" }, { "key": "aws", "name": "Amazon" }]
        })
        .to_string();
        let found = problems(parse_seed(&text).unwrap_err());
        assert_eq!(found, ["providers[1]: duplicate key 'aws'"]);
    }

    #[tokio::test]
    async fn default_mode_seeds_and_links_parents() {
        let backend = ContentBackend::in_memory();
        let doc = parse_seed(&sample()).unwrap();
        let report = run_seed(&backend, &doc, SeedOptions::default()).await.unwrap();

        assert_eq!(report.total_inserted(), 6);
        assert!(report.settings);

        let provider = &content_service::list::<Provider>(&backend).await.unwrap()[0];
        let cert = &content_service::list::<Certificate>(&backend).await.unwrap()[0];
        assert_eq!(cert.fields.provider_id, provider.id);

        let projects = content_service::list::<Project>(&backend).await.unwrap();
        let orders: Vec<i32> = projects.iter().map(|p| p.fields.order).collect();
        assert_eq!(orders, [1, 2]);
    }

    #[tokio::test]
    async fn default_mode_refuses_populated_store() {
        let backend = ContentBackend::in_memory();
        let doc = parse_seed(&sample()).unwrap();
        run_seed(&backend, &doc, SeedOptions::default()).await.unwrap();

        let err = run_seed(&backend, &doc, SeedOptions::default()).await.unwrap_err();
        assert!(matches!(err, SeedError::NotEmpty(7)));
    }

    #[tokio::test]
    async fn default_mode_refuses_store_holding_only_settings() {
        let backend = ContentBackend::in_memory();
        let settings = SiteSettings {
            name: "Kept Name".into(),
            headline: "Kept".into(),
            ..Default::default()
        };
        settings_service::upsert_settings(&backend, settings).await.unwrap();

        let doc = parse_seed(&sample()).unwrap();
        let err = run_seed(&backend, &doc, SeedOptions::default()).await.unwrap_err();
        assert!(matches!(err, SeedError::NotEmpty(1)));

        let kept = settings_service::get_settings(&backend).await.unwrap().unwrap();
        assert_eq!(kept.name, "Kept Name");
    }

    #[tokio::test]
    async fn reset_mode_replaces_content() {
        let backend = ContentBackend::in_memory();
        let doc = parse_seed(&sample()).unwrap();
        run_seed(&backend, &doc, SeedOptions::default()).await.unwrap();

        let options = SeedOptions {
            mode: SeedMode::Reset,
            validate_only: false,
        };
        let report = run_seed(&backend, &doc, options).await.unwrap();
        assert_eq!(report.cleared, 6);
        assert_eq!(backend.store.count(Collection::Projects).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn append_mode_resolves_stored_keys_and_appends_orders() {
        let backend = ContentBackend::in_memory();
        run_seed(&backend, &parse_seed(&sample()).unwrap(), SeedOptions::default())
            .await
            .unwrap();

        let extra = json!({
            "certificates": [{ "provider": "cncf", "title": "CKAD", "issue_date": "2024-01" }],
            "projects": [{ "title": "Three", "description": "third", "status": "in_progress" }]
        })
        .to_string();
        let options = SeedOptions {
            mode: SeedMode::Append,
            validate_only: false,
        };
        run_seed(&backend, &parse_seed(&extra).unwrap(), options).await.unwrap();

        let projects = content_service::list::<Project>(&backend).await.unwrap();
        assert_eq!(projects.last().unwrap().fields.title, "Three");
        assert_eq!(projects.last().unwrap().fields.order, 3);
        assert_eq!(backend.store.count(Collection::Certificates).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn validate_only_writes_nothing_but_checks_references() {
        let backend = ContentBackend::in_memory();
        let options = SeedOptions {
            mode: SeedMode::Default,
            validate_only: true,
        };
        let report = run_seed(&backend, &parse_seed(&sample()).unwrap(), options).await.unwrap();
        assert!(report.validated_only);
        assert_eq!(backend.store.count(Collection::Providers).await.unwrap(), 0);

        let dangling = json!({
            "certificates": [{ "provider": "nobody", "title": "X", "issue_date": "2020" }]
        })
        .to_string();
        let err = run_seed(&backend, &parse_seed(&dangling).unwrap(), options)
            .await
            .unwrap_err();
        assert_eq!(problems(err), ["certificates[0]: unknown provider 'nobody'"]);
    }
}
