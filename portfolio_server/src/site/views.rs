//! Display models for the public site, mapped from stored records.

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use super::snapshot::Snapshot;
use crate::models::{ProficiencyLevel, ProjectStatus, SiteSettings, TechCategory};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub long_description: Option<String>,
    pub status: ProjectStatus,
    pub status_label: &'static str,
    pub tech_stack: Vec<String>,
    pub features: Vec<String>,
    pub image_url: Option<String>,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperienceView {
    pub id: Uuid,
    pub company: String,
    pub role: String,
    pub location: Option<String>,
    /// e.g. `Jan 2021 - Present`
    pub period: String,
    pub current: bool,
    pub description: Option<String>,
    pub highlights: Vec<String>,
    pub technologies: Vec<String>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillView {
    pub id: Uuid,
    pub name: String,
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillGroup {
    pub category: TechCategory,
    pub label: &'static str,
    pub items: Vec<SkillView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageView {
    pub id: Uuid,
    pub name: String,
    pub level: ProficiencyLevel,
    pub percent: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CertificateView {
    pub id: Uuid,
    pub title: String,
    pub provider: Option<String>,
    pub provider_logo_url: Option<String>,
    pub issue_date: String,
    pub credential_id: Option<String>,
    pub credential_url: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AboutItemView {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AboutSection {
    pub key: String,
    pub title: String,
    pub items: Vec<AboutItemView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SocialLink {
    pub label: &'static str,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileView {
    pub name: String,
    pub headline: String,
    pub bio: Option<String>,
    pub email: Option<String>,
    pub location: Option<String>,
    pub avatar_url: Option<String>,
    pub resume_url: Option<String>,
    pub links: Vec<SocialLink>,
}

pub fn project_views(snapshot: &Snapshot) -> Vec<ProjectView> {
    snapshot
        .projects
        .iter()
        .map(|r| {
            let p = &r.fields;
            ProjectView {
                id: r.id,
                title: p.title.clone(),
                description: p.description.clone(),
                long_description: p.long_description.clone(),
                status: p.status,
                status_label: p.status.label(),
                tech_stack: p.tech_stack.clone(),
                features: p.features.clone(),
                image_url: p.image_url.clone(),
                github_url: p.github_url.clone(),
                live_url: p.live_url.clone(),
            }
        })
        .collect()
}

pub fn experience_views(snapshot: &Snapshot) -> Vec<ExperienceView> {
    snapshot
        .experiences
        .iter()
        .map(|r| {
            let e = &r.fields;
            let end = e.end_date.as_deref().filter(|d| !d.trim().is_empty());
            ExperienceView {
                id: r.id,
                company: e.company.clone(),
                role: e.role.clone(),
                location: e.location.clone(),
                period: period_label(&e.start_date, end),
                current: end.is_none(),
                description: e.description.clone(),
                highlights: e.highlights.clone(),
                technologies: e.technologies.clone(),
                logo_url: e.logo_url.clone(),
            }
        })
        .collect()
}

/// Technologies grouped by category, in fixed category order. Empty
/// categories are left out.
pub fn skill_groups(snapshot: &Snapshot) -> Vec<SkillGroup> {
    TechCategory::ALL
        .into_iter()
        .filter_map(|category| {
            let items: Vec<SkillView> = snapshot
                .technologies
                .iter()
                .filter(|t| t.fields.category == category)
                .map(|t| SkillView {
                    id: t.id,
                    name: t.fields.name.clone(),
                    icon_url: t.fields.icon_url.clone(),
                })
                .collect();
            (!items.is_empty()).then(|| SkillGroup {
                category,
                label: category.label(),
                items,
            })
        })
        .collect()
}

pub fn language_views(snapshot: &Snapshot) -> Vec<LanguageView> {
    snapshot
        .languages
        .iter()
        .map(|r| LanguageView {
            id: r.id,
            name: r.fields.name.clone(),
            level: r.fields.level,
            percent: r.fields.level.percent(),
        })
        .collect()
}

pub fn certificate_views(snapshot: &Snapshot) -> Vec<CertificateView> {
    snapshot
        .certificates
        .iter()
        .map(|r| {
            let c = &r.fields;
            let provider = snapshot.provider(c.provider_id);
            CertificateView {
                id: r.id,
                title: c.title.clone(),
                provider: provider.map(|p| p.fields.name.clone()),
                provider_logo_url: provider.and_then(|p| p.fields.logo_url.clone()),
                issue_date: c.issue_date.clone(),
                credential_id: c.credential_id.clone(),
                credential_url: c.credential_url.clone(),
                image_url: c.image_url.clone(),
            }
        })
        .collect()
}

/// About items nested under their categories, both in display order.
pub fn about_sections(snapshot: &Snapshot) -> Vec<AboutSection> {
    snapshot
        .about_categories
        .iter()
        .map(|category| AboutSection {
            key: category.fields.key.clone(),
            title: category.fields.title.clone(),
            items: snapshot
                .about_items
                .iter()
                .filter(|item| item.fields.category_id == category.id)
                .map(|item| AboutItemView {
                    id: item.id,
                    title: item.fields.title.clone(),
                    description: item.fields.description.clone(),
                    icon: item.fields.icon.clone(),
                })
                .collect(),
        })
        .collect()
}

pub fn profile_view(settings: &SiteSettings) -> ProfileView {
    let links = [
        ("GitHub", &settings.github_url),
        ("LinkedIn", &settings.linkedin_url),
    ]
    .into_iter()
    .filter_map(|(label, url)| {
        url.as_ref()
            .filter(|u| !u.is_empty())
            .map(|u| SocialLink {
                label,
                url: u.clone(),
            })
    })
    .collect();

    ProfileView {
        name: settings.name.clone(),
        headline: settings.headline.clone(),
        bio: settings.bio.clone(),
        email: settings.email.clone(),
        location: settings.location.clone(),
        avatar_url: settings.avatar_url.clone(),
        resume_url: settings.resume_url.clone(),
        links,
    }
}

/// `Jan 2021 - Present`, or `Jun 2018 - Dec 2020` when an end is given.
pub fn period_label(start: &str, end: Option<&str>) -> String {
    let end = end.map_or_else(|| "Present".to_string(), month_label);
    format!("{} - {end}", month_label(start))
}

/// `2021-01` or `2021-01-15` as `Jan 2021`. Anything else is kept verbatim.
fn month_label(date: &str) -> String {
    let date = date.trim();
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{date}-01"), "%Y-%m-%d"))
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_else(|_| date.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::fallback::fallback_snapshot;

    #[test]
    fn period_labels() {
        assert_eq!(period_label("2021-01", None), "Jan 2021 - Present");
        assert_eq!(period_label("2018-06-01", Some("2020-12")), "Jun 2018 - Dec 2020");
        assert_eq!(period_label("Spring 2019", None), "Spring 2019 - Present");
    }

    #[test]
    fn skills_follow_category_order() {
        let groups = skill_groups(fallback_snapshot());
        let categories: Vec<TechCategory> = groups.iter().map(|g| g.category).collect();
        let mut sorted = categories.clone();
        sorted.sort();
        assert_eq!(categories, sorted);
        assert!(groups.iter().all(|g| !g.items.is_empty()));
    }

    #[test]
    fn certificates_join_provider_names() {
        let views = certificate_views(fallback_snapshot());
        assert!(views.iter().all(|v| v.provider.is_some()));
    }

    #[test]
    fn about_items_nest_under_categories() {
        let sections = about_sections(fallback_snapshot());
        let total: usize = sections.iter().map(|s| s.items.len()).sum();
        assert_eq!(total, fallback_snapshot().about_items.len());
    }

    #[test]
    fn experiences_without_end_are_current() {
        let views = experience_views(fallback_snapshot());
        assert!(views.iter().any(|v| v.current && v.period.ends_with("Present")));
    }

    #[test]
    fn profile_links_skip_empty_urls() {
        let settings = SiteSettings {
            name: "A".into(),
            headline: "B".into(),
            github_url: Some("https://github.com/a".into()),
            linkedin_url: Some(String::new()),
            ..Default::default()
        };
        let view = profile_view(&settings);
        assert_eq!(view.links.len(), 1);
        assert_eq!(view.links[0].label, "GitHub");
    }
}
