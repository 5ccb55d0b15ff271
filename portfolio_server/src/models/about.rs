//! about_categories + about_items: the grouped "about me" section.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{require, require_key, Collection, Entity, ValidationError};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AboutCategory {
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub order: i32,
}

impl Entity for AboutCategory {
    const COLLECTION: Collection = Collection::AboutCategories;

    fn order(&self) -> i32 {
        self.order
    }

    fn set_order(&mut self, order: i32) {
        self.order = order;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_key("key", &self.key)?;
        require("title", &self.title)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AboutItem {
    #[serde(default)]
    pub category_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    #[serde(default)]
    pub order: i32,
}

impl AboutItem {
    pub fn check_fields(&self) -> Result<(), ValidationError> {
        require("title", &self.title)
    }
}

impl Entity for AboutItem {
    const COLLECTION: Collection = Collection::AboutItems;

    fn order(&self) -> i32 {
        self.order
    }

    fn set_order(&mut self, order: i32) {
        self.order = order;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.category_id.is_nil() {
            return Err(ValidationError::required("category_id"));
        }
        self.check_fields()
    }

    fn references(&self) -> Vec<(Collection, Uuid)> {
        vec![(Collection::AboutCategories, self.category_id)]
    }
}
