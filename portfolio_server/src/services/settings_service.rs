//! The singleton site settings record.

use super::{ContentBackend, ContentError};
use crate::events::ContentEvent;
use crate::models::{SiteSettings, SETTINGS_KEY};

/// Load the settings, if they were ever saved.
pub async fn get_settings(backend: &ContentBackend) -> Result<Option<SiteSettings>, ContentError> {
    match backend.store.find_settings(SETTINGS_KEY).await? {
        Some(row) => Ok(Some(serde_json::from_value(row.data)?)),
        None => Ok(None),
    }
}

/// Insert or overwrite the settings. Repeating a call never adds a record.
pub async fn upsert_settings(
    backend: &ContentBackend,
    settings: SiteSettings,
) -> Result<SiteSettings, ContentError> {
    settings.validate()?;
    let row = backend
        .store
        .upsert_settings(SETTINGS_KEY, serde_json::to_value(&settings)?)
        .await?;

    crate::metrics::mutation("site_settings", "upsert");
    backend.events.publish(ContentEvent::settings());
    tracing::info!(key = %row.key, "Site settings saved");

    Ok(serde_json::from_value(row.data)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> SiteSettings {
        SiteSettings {
            name: "Ada Example".into(),
            headline: "Backend engineer".into(),
            email: Some("ada@example.com".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn upsert_twice_keeps_one_record() {
        let backend = ContentBackend::in_memory();
        assert_eq!(get_settings(&backend).await.unwrap(), None);

        upsert_settings(&backend, settings()).await.unwrap();
        upsert_settings(&backend, settings()).await.unwrap();

        assert_eq!(get_settings(&backend).await.unwrap(), Some(settings()));
        let row = backend.store.find_settings(SETTINGS_KEY).await.unwrap().unwrap();
        assert_eq!(row.key, SETTINGS_KEY);
    }

    #[tokio::test]
    async fn invalid_settings_are_not_stored() {
        let backend = ContentBackend::in_memory();
        let mut bad = settings();
        bad.email = Some("not-an-email".into());
        let err = upsert_settings(&backend, bad).await.unwrap_err();
        assert!(matches!(err, ContentError::Validation(ref v) if v.field == "email"));
        assert_eq!(get_settings(&backend).await.unwrap(), None);
    }
}
