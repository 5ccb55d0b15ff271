//! experiences: employment history entries.

use serde::{Deserialize, Serialize};

use super::{check_url, require, Collection, Entity, ValidationError};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub company: String,
    pub role: String,
    pub location: Option<String>,
    /// `YYYY-MM` or `YYYY-MM-DD`.
    pub start_date: String,
    /// Absent while the position is current.
    pub end_date: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    pub logo_url: Option<String>,
    #[serde(default)]
    pub order: i32,
}

impl Entity for Experience {
    const COLLECTION: Collection = Collection::Experiences;

    fn order(&self) -> i32 {
        self.order
    }

    fn set_order(&mut self, order: i32) {
        self.order = order;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require("company", &self.company)?;
        require("role", &self.role)?;
        require("start_date", &self.start_date)?;
        check_url("logo_url", self.logo_url.as_deref())?;
        Ok(())
    }
}
