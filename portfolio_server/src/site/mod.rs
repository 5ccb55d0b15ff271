//! Public read side: backend status, fallback resolution and view models.

pub mod backend;
pub mod fallback;
pub mod snapshot;
pub mod views;

use serde::Serialize;
use strum_macros::{Display, EnumString, IntoStaticStr, VariantNames};

use crate::models::Collection;
use crate::services::{settings_service, ContentError};

pub use backend::BackendStatus;
pub use fallback::{fallback_snapshot, resolve_list, ContentSource, ListState};
pub use snapshot::Snapshot;
pub use views::ProfileView;

/// A list section of the public site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, IntoStaticStr, VariantNames)]
#[strum(serialize_all = "snake_case")]
pub enum Section {
    Projects,
    Experiences,
    Languages,
    Skills,
    Certificates,
    About,
}

impl Section {
    /// Collections the section renders from.
    pub fn collections(self) -> &'static [Collection] {
        match self {
            Section::Projects => &[Collection::Projects],
            Section::Experiences => &[Collection::Experiences],
            Section::Languages => &[Collection::Languages],
            Section::Skills => &[Collection::Technologies],
            Section::Certificates => &[Collection::Providers, Collection::Certificates],
            Section::About => &[Collection::AboutCategories, Collection::AboutItems],
        }
    }
}

/// Resolve one section through `render`, from live data or the fallback.
pub async fn read_section<T>(
    status: &BackendStatus,
    use_fallback: bool,
    section: Section,
    render: fn(&Snapshot) -> Vec<T>,
) -> Result<ListState<T>, ContentError> {
    let source = match status {
        BackendStatus::Ready(backend) => {
            ContentSource::Live(render(&Snapshot::load(backend, section.collections()).await?))
        }
        BackendStatus::Connecting => ContentSource::Pending,
        BackendStatus::Unconfigured => ContentSource::Unconfigured,
    };

    let state = resolve_list(source, use_fallback, || render(fallback_snapshot()));
    if state.fallback {
        crate::metrics::fallback_served(section.into());
    }
    Ok(state)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileState {
    pub profile: Option<ProfileView>,
    pub loading: bool,
    pub fallback: bool,
}

/// The hero profile, resolved with the same precedence as list sections.
pub async fn read_profile(status: &BackendStatus, use_fallback: bool) -> Result<ProfileState, ContentError> {
    let source = match status {
        BackendStatus::Ready(backend) => {
            ContentSource::Live(settings_service::get_settings(backend).await?.into_iter().collect())
        }
        BackendStatus::Connecting => ContentSource::Pending,
        BackendStatus::Unconfigured => ContentSource::Unconfigured,
    };

    let state = resolve_list(source, use_fallback, || {
        fallback_snapshot().settings.clone().into_iter().collect()
    });
    if state.fallback {
        crate::metrics::fallback_served("profile");
    }
    Ok(ProfileState {
        profile: state.items.first().map(views::profile_view),
        loading: state.loading,
        fallback: state.fallback,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Project, ProjectStatus};
    use crate::services::{content_service, ContentBackend};

    #[tokio::test]
    async fn unconfigured_sections_follow_fallback_flag() {
        let status = BackendStatus::Unconfigured;
        let on = read_section(&status, true, Section::Projects, views::project_views)
            .await
            .unwrap();
        assert!(on.fallback);
        assert_eq!(on.items.len(), fallback_snapshot().projects.len());

        let off = read_section(&status, false, Section::Projects, views::project_views)
            .await
            .unwrap();
        assert!(off.items.is_empty());
        assert!(!off.loading);
    }

    #[tokio::test]
    async fn connecting_reports_loading() {
        let state = read_section(&BackendStatus::Connecting, true, Section::Skills, views::skill_groups)
            .await
            .unwrap();
        assert!(state.loading);
        assert!(state.items.is_empty());

        let profile = read_profile(&BackendStatus::Connecting, true).await.unwrap();
        assert!(profile.loading);
        assert_eq!(profile.profile, None);
    }

    #[tokio::test]
    async fn ready_backend_serves_live_data() {
        let backend = ContentBackend::in_memory();
        content_service::create(
            &backend,
            Project {
                title: "Live".into(),
                description: "d".into(),
                status: ProjectStatus::InProgress,
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let status = BackendStatus::Ready(backend);
        let state = read_section(&status, true, Section::Projects, views::project_views)
            .await
            .unwrap();
        assert!(!state.fallback);
        assert_eq!(state.items[0].title, "Live");
        assert_eq!(state.items[0].status_label, "In progress");

        let profile = read_profile(&status, true).await.unwrap();
        assert_eq!(profile.profile, None);
        assert!(!profile.fallback);
    }

    #[test]
    fn sections_parse_from_path() {
        assert_eq!("skills".parse::<Section>().unwrap(), Section::Skills);
        assert!("widgets".parse::<Section>().is_err());
    }
}
