//! site_settings: the singleton profile record shown in the hero section.

use serde::{Deserialize, Serialize};

use super::{check_url, require, ValidationError};

/// Logical key of the only settings record.
pub const SETTINGS_KEY: &str = "site";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteSettings {
    pub name: String,
    pub headline: String,
    pub bio: Option<String>,
    pub email: Option<String>,
    pub location: Option<String>,
    pub avatar_url: Option<String>,
    pub resume_url: Option<String>,
    pub github_url: Option<String>,
    pub linkedin_url: Option<String>,
}

impl SiteSettings {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        require("headline", &self.headline)?;
        if let Some(email) = self.email.as_deref() {
            if !email.is_empty() && !email.contains('@') {
                return Err(ValidationError::new("email", "must be an email address"));
            }
        }
        check_url("avatar_url", self.avatar_url.as_deref())?;
        check_url("resume_url", self.resume_url.as_deref())?;
        check_url("github_url", self.github_url.as_deref())?;
        check_url("linkedin_url", self.linkedin_url.as_deref())
    }
}
