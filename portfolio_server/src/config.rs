//! Portfolio service configuration: loaded from environment variables.

use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct SiteConfig {
    /// PostgreSQL connection URL. Unset means the backend is not configured.
    pub database_url: Option<String>,
    /// Serve the bundled fallback content while no backend is configured.
    pub use_fallback: bool,
    /// Directory holding uploaded blobs.
    pub upload_dir: PathBuf,
    /// Base URL prefixed to public file links.
    pub public_url: String,
    /// Secret signing one-time upload targets.
    pub upload_secret: String,
    /// Lifetime of an upload target in seconds.
    pub upload_ttl_secs: i64,
    /// Maximum database connections.
    pub db_pool_size: usize,
}

impl SiteConfig {
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());
        let use_fallback = std::env::var("PORTFOLIO_USE_FALLBACK")
            .map(|s| parse_flag(&s))
            .unwrap_or(false);
        let upload_dir = std::env::var("PORTFOLIO_UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./uploads"));
        let public_url = std::env::var("PORTFOLIO_PUBLIC_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string());
        let upload_secret = std::env::var("PORTFOLIO_UPLOAD_SECRET").unwrap_or_default();
        let upload_ttl_secs = std::env::var("PORTFOLIO_UPLOAD_TTL")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(900);
        let db_pool_size = std::env::var("PORTFOLIO_DB_POOL_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8);

        if database_url.is_none() {
            if use_fallback {
                tracing::warn!("DATABASE_URL not set -- serving bundled fallback content");
            } else {
                tracing::warn!("DATABASE_URL not set and fallback disabled -- site lists will be empty");
            }
        }

        let upload_secret = if upload_secret.is_empty() {
            tracing::warn!(
                "PORTFOLIO_UPLOAD_SECRET not set -- using a per-process secret, upload URLs die with the process"
            );
            uuid::Uuid::new_v4().simple().to_string()
        } else {
            upload_secret
        };

        Self {
            database_url,
            use_fallback,
            upload_dir,
            public_url: public_url.trim_end_matches('/').to_string(),
            upload_secret,
            upload_ttl_secs,
            db_pool_size,
        }
    }

    /// Configuration for tests and embedded use: no database, fallback off.
    pub fn local(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            database_url: None,
            use_fallback: false,
            upload_dir: upload_dir.into(),
            public_url: "http://localhost:8080".to_string(),
            upload_secret: "local-upload-secret".to_string(),
            upload_ttl_secs: 900,
            db_pool_size: 1,
        }
    }
}

/// Truthy env flag: `1`, `true`, `yes`, `on` (any case).
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_parsing() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" ON "));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
    }
}
