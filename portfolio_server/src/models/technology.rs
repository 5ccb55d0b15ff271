//! technologies: tools and frameworks, grouped by category on the skills view.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, VariantNames};

use super::{check_url, require, Collection, Entity, ValidationError};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TechCategory {
    #[default]
    Frontend,
    Backend,
    Database,
    Devops,
    Cloud,
    Tools,
}

impl TechCategory {
    pub const ALL: [TechCategory; 6] = [
        TechCategory::Frontend,
        TechCategory::Backend,
        TechCategory::Database,
        TechCategory::Devops,
        TechCategory::Cloud,
        TechCategory::Tools,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TechCategory::Frontend => "Frontend",
            TechCategory::Backend => "Backend",
            TechCategory::Database => "Databases",
            TechCategory::Devops => "DevOps",
            TechCategory::Cloud => "Cloud",
            TechCategory::Tools => "Tools",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Technology {
    pub name: String,
    pub category: TechCategory,
    pub icon_url: Option<String>,
    #[serde(default)]
    pub order: i32,
}

impl Entity for Technology {
    const COLLECTION: Collection = Collection::Technologies;

    fn order(&self) -> i32 {
        self.order
    }

    fn set_order(&mut self, order: i32) {
        self.order = order;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        check_url("icon_url", self.icon_url.as_deref())
    }
}
