//! certificates: credentials issued by a provider.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{check_url, require, Collection, Entity, ValidationError};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    pub title: String,
    #[serde(default)]
    pub provider_id: Uuid,
    pub issue_date: String,
    pub credential_id: Option<String>,
    pub credential_url: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub order: i32,
}

impl Certificate {
    /// Every check except the provider link, which seed files give by key.
    pub fn check_fields(&self) -> Result<(), ValidationError> {
        require("title", &self.title)?;
        require("issue_date", &self.issue_date)?;
        check_url("credential_url", self.credential_url.as_deref())?;
        check_url("image_url", self.image_url.as_deref())
    }
}

impl Entity for Certificate {
    const COLLECTION: Collection = Collection::Certificates;

    fn order(&self) -> i32 {
        self.order
    }

    fn set_order(&mut self, order: i32) {
        self.order = order;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.provider_id.is_nil() {
            return Err(ValidationError::required("provider_id"));
        }
        self.check_fields()
    }

    fn references(&self) -> Vec<(Collection, Uuid)> {
        vec![(Collection::Providers, self.provider_id)]
    }
}
