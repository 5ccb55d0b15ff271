//! projects: portfolio work items, the only collection with bulk reorder.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, VariantNames};

use super::{check_url, require, Collection, Entity, ValidationError};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, Display, VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Completed,
    InProgress,
    Planned,
}

impl ProjectStatus {
    pub fn label(self) -> &'static str {
        match self {
            ProjectStatus::Completed => "Completed",
            ProjectStatus::InProgress => "In progress",
            ProjectStatus::Planned => "Planned",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    pub description: String,
    pub long_description: Option<String>,
    pub status: ProjectStatus,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    pub image_url: Option<String>,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    #[serde(default)]
    pub order: i32,
}

impl Entity for Project {
    const COLLECTION: Collection = Collection::Projects;

    fn order(&self) -> i32 {
        self.order
    }

    fn set_order(&mut self, order: i32) {
        self.order = order;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require("title", &self.title)?;
        require("description", &self.description)?;
        check_url("image_url", self.image_url.as_deref())?;
        check_url("github_url", self.github_url.as_deref())?;
        check_url("live_url", self.live_url.as_deref())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::VariantNames;

    #[test]
    fn status_options_match_wire_names() {
        assert_eq!(
            ProjectStatus::VARIANTS,
            &["completed", "in_progress", "planned"]
        );
        assert_eq!(
            "in_progress".parse::<ProjectStatus>().unwrap(),
            ProjectStatus::InProgress
        );
        let json = serde_json::to_value(ProjectStatus::InProgress).unwrap();
        assert_eq!(json, "in_progress");
    }

    #[test]
    fn missing_title_is_rejected() {
        let project = Project {
            description: "x".into(),
            ..Default::default()
        };
        assert_eq!(
            project.validate().unwrap_err(),
            ValidationError::required("title")
        );
    }
}
