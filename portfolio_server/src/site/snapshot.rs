//! Typed copies of the collections a site section renders from.

use uuid::Uuid;

use crate::models::{
    AboutCategory, AboutItem, Certificate, Collection, Experience, Language, Project, Provider,
    Record, SiteSettings, Technology,
};
use crate::services::{content_service, ContentBackend, ContentError};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub experiences: Vec<Record<Experience>>,
    pub projects: Vec<Record<Project>>,
    pub languages: Vec<Record<Language>>,
    pub technologies: Vec<Record<Technology>>,
    pub providers: Vec<Record<Provider>>,
    pub certificates: Vec<Record<Certificate>>,
    pub about_categories: Vec<Record<AboutCategory>>,
    pub about_items: Vec<Record<AboutItem>>,
    pub settings: Option<SiteSettings>,
}

impl Snapshot {
    /// Load only the listed collections; the rest stay empty.
    pub async fn load(backend: &ContentBackend, collections: &[Collection]) -> Result<Self, ContentError> {
        let mut snapshot = Snapshot::default();
        for collection in collections {
            match collection {
                Collection::Experiences => snapshot.experiences = content_service::list(backend).await?,
                Collection::Projects => snapshot.projects = content_service::list(backend).await?,
                Collection::Languages => snapshot.languages = content_service::list(backend).await?,
                Collection::Technologies => snapshot.technologies = content_service::list(backend).await?,
                Collection::Providers => snapshot.providers = content_service::list(backend).await?,
                Collection::Certificates => snapshot.certificates = content_service::list(backend).await?,
                Collection::AboutCategories => {
                    snapshot.about_categories = content_service::list(backend).await?
                }
                Collection::AboutItems => snapshot.about_items = content_service::list(backend).await?,
            }
        }
        Ok(snapshot)
    }

    pub fn provider(&self, id: Uuid) -> Option<&Record<Provider>> {
        self.providers.iter().find(|p| p.id == id)
    }
}
