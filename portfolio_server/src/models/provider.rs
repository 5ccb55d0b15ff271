//! providers: certificate issuers, addressed by a natural key in seed files.

use serde::{Deserialize, Serialize};

use super::{check_url, require, require_key, Collection, Entity, ValidationError};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub key: String,
    pub name: String,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    #[serde(default)]
    pub order: i32,
}

impl Entity for Provider {
    const COLLECTION: Collection = Collection::Providers;

    fn order(&self) -> i32 {
        self.order
    }

    fn set_order(&mut self, order: i32) {
        self.order = order;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_key("key", &self.key)?;
        require("name", &self.name)?;
        check_url("website", self.website.as_deref())?;
        check_url("logo_url", self.logo_url.as_deref())
    }
}
