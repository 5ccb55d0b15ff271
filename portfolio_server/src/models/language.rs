//! languages: spoken languages with a proficiency level.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, VariantNames};

use super::{require, Collection, Entity, ValidationError};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, Display, VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProficiencyLevel {
    Native,
    Fluent,
    Advanced,
    #[default]
    Intermediate,
    Beginner,
}

impl ProficiencyLevel {
    /// Rough fill percentage for the skill bar.
    pub fn percent(self) -> u8 {
        match self {
            ProficiencyLevel::Native => 100,
            ProficiencyLevel::Fluent => 90,
            ProficiencyLevel::Advanced => 75,
            ProficiencyLevel::Intermediate => 55,
            ProficiencyLevel::Beginner => 30,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Language {
    pub name: String,
    pub level: ProficiencyLevel,
    #[serde(default)]
    pub order: i32,
}

impl Entity for Language {
    const COLLECTION: Collection = Collection::Languages;

    fn order(&self) -> i32 {
        self.order
    }

    fn set_order(&mut self, order: i32) {
        self.order = order;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)
    }
}
