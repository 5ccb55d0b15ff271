//! Editor configuration for every content collection.

use strum::VariantNames;

use super::editor::EditorConfig;
use super::fields::{FieldKind, FieldSpec, MediaFieldSpec};
use crate::models::{Collection, ProficiencyLevel, ProjectStatus, TechCategory};
use crate::services::upload_service::UploadKind;

const ORDER: FieldSpec = FieldSpec::new("order", "Order", FieldKind::Number);

fn media(name: &'static str, label: &'static str, kind: UploadKind) -> MediaFieldSpec {
    MediaFieldSpec { name, label, kind }
}

pub fn editor_config(collection: Collection) -> EditorConfig {
    match collection {
        Collection::Experiences => EditorConfig {
            collection,
            title: "Experience",
            summary_field: "company",
            fields: vec![
                FieldSpec::new("company", "Company", FieldKind::Text).required(),
                FieldSpec::new("role", "Role", FieldKind::Text).required(),
                FieldSpec::new("location", "Location", FieldKind::Text),
                FieldSpec::new("start_date", "Start date (YYYY-MM)", FieldKind::Text).required(),
                FieldSpec::new("end_date", "End date (blank if current)", FieldKind::Text),
                FieldSpec::new("description", "Description", FieldKind::TextArea),
                FieldSpec::new("highlights", "Highlights (one per line)", FieldKind::Lines),
                FieldSpec::new("technologies", "Technologies (comma separated)", FieldKind::Csv),
                ORDER,
            ],
            media: vec![media("logo_url", "Company logo", UploadKind::Logo)],
            reorderable: false,
        },
        Collection::Projects => EditorConfig {
            collection,
            title: "Projects",
            summary_field: "title",
            fields: vec![
                FieldSpec::new("title", "Title", FieldKind::Text).required(),
                FieldSpec::new("description", "Short description", FieldKind::TextArea).required(),
                FieldSpec::new("long_description", "Long description", FieldKind::TextArea),
                FieldSpec::new("status", "Status", FieldKind::Select(ProjectStatus::VARIANTS)).required(),
                FieldSpec::new("tech_stack", "Tech stack (comma separated)", FieldKind::Csv),
                FieldSpec::new("features", "Features (one per line)", FieldKind::Lines),
                FieldSpec::new("github_url", "GitHub URL", FieldKind::Text),
                FieldSpec::new("live_url", "Live URL", FieldKind::Text),
            ],
            media: vec![media("image_url", "Cover image", UploadKind::Image)],
            reorderable: true,
        },
        Collection::Languages => EditorConfig {
            collection,
            title: "Languages",
            summary_field: "name",
            fields: vec![
                FieldSpec::new("name", "Language", FieldKind::Text).required(),
                FieldSpec::new("level", "Level", FieldKind::Select(ProficiencyLevel::VARIANTS)).required(),
                ORDER,
            ],
            media: Vec::new(),
            reorderable: false,
        },
        Collection::Technologies => EditorConfig {
            collection,
            title: "Technologies",
            summary_field: "name",
            fields: vec![
                FieldSpec::new("name", "Name", FieldKind::Text).required(),
                FieldSpec::new("category", "Category", FieldKind::Select(TechCategory::VARIANTS)).required(),
                ORDER,
            ],
            media: vec![media("icon_url", "Icon", UploadKind::Logo)],
            reorderable: false,
        },
        Collection::Providers => EditorConfig {
            collection,
            title: "Certificate providers",
            summary_field: "name",
            fields: vec![
                FieldSpec::new("key", "Key", FieldKind::Text).required(),
                FieldSpec::new("name", "Name", FieldKind::Text).required(),
                FieldSpec::new("website", "Website", FieldKind::Text),
                ORDER,
            ],
            media: vec![media("logo_url", "Logo", UploadKind::Logo)],
            reorderable: false,
        },
        Collection::Certificates => EditorConfig {
            collection,
            title: "Certificates",
            summary_field: "title",
            fields: vec![
                FieldSpec::new("title", "Title", FieldKind::Text).required(),
                FieldSpec::new("provider_id", "Provider", FieldKind::Reference(Collection::Providers))
                    .required(),
                FieldSpec::new("issue_date", "Issued (YYYY-MM)", FieldKind::Text).required(),
                FieldSpec::new("credential_id", "Credential ID", FieldKind::Text),
                FieldSpec::new("credential_url", "Credential URL", FieldKind::Text),
                ORDER,
            ],
            media: vec![media("image_url", "Badge image", UploadKind::Image)],
            reorderable: false,
        },
        Collection::AboutCategories => EditorConfig {
            collection,
            title: "About categories",
            summary_field: "title",
            fields: vec![
                FieldSpec::new("key", "Key", FieldKind::Text).required(),
                FieldSpec::new("title", "Title", FieldKind::Text).required(),
                ORDER,
            ],
            media: Vec::new(),
            reorderable: false,
        },
        Collection::AboutItems => EditorConfig {
            collection,
            title: "About items",
            summary_field: "title",
            fields: vec![
                FieldSpec::new(
                    "category_id",
                    "Category",
                    FieldKind::Reference(Collection::AboutCategories),
                )
                .required(),
                FieldSpec::new("title", "Title", FieldKind::Text).required(),
                FieldSpec::new("description", "Description", FieldKind::TextArea),
                FieldSpec::new("icon", "Icon name", FieldKind::Text),
                ORDER,
            ],
            media: Vec::new(),
            reorderable: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_field_is_a_configured_field() {
        for collection in Collection::ALL {
            let config = editor_config(collection);
            assert_eq!(config.collection, collection);
            assert!(
                config.field(config.summary_field).is_some(),
                "{collection}: summary field missing"
            );
        }
    }

    #[test]
    fn only_projects_reorder_by_drag() {
        let reorderable: Vec<Collection> = Collection::ALL
            .into_iter()
            .filter(|c| editor_config(*c).reorderable)
            .collect();
        assert_eq!(reorderable, [Collection::Projects]);
        assert!(editor_config(Collection::Projects).field("order").is_none());
    }

    #[test]
    fn select_options_come_from_the_models() {
        let config = editor_config(Collection::Languages);
        let level = config.field("level").unwrap();
        assert_eq!(
            level.kind,
            FieldKind::Select(&["native", "fluent", "advanced", "intermediate", "beginner"])
        );
    }
}
