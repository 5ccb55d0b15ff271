//! Backend availability, published over a watch channel so the server can
//! answer requests while the database connection is still being set up.

use std::sync::Arc;

use tokio::sync::watch;

use crate::config::SiteConfig;
use crate::services::ContentBackend;
use crate::store::PgStore;

#[derive(Clone)]
pub enum BackendStatus {
    /// No database URL configured.
    Unconfigured,
    /// Configured, connection not (yet) established.
    Connecting,
    Ready(ContentBackend),
}

impl BackendStatus {
    pub fn backend(&self) -> Option<&ContentBackend> {
        match self {
            BackendStatus::Ready(backend) => Some(backend),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BackendStatus::Unconfigured => "unconfigured",
            BackendStatus::Connecting => "connecting",
            BackendStatus::Ready(_) => "ready",
        }
    }
}

impl std::fmt::Debug for BackendStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Initial status for a configuration, plus the channel carrying updates.
pub fn status_channel(config: &SiteConfig) -> (watch::Sender<BackendStatus>, watch::Receiver<BackendStatus>) {
    let initial = if config.database_url.is_some() {
        BackendStatus::Connecting
    } else {
        BackendStatus::Unconfigured
    };
    watch::channel(initial)
}

/// Open the PostgreSQL store, run the migration, and flip the status to
/// `Ready`. On failure the status stays `Connecting`.
pub async fn connect(config: SiteConfig, status: watch::Sender<BackendStatus>) {
    let Some(url) = config.database_url.as_deref() else {
        return;
    };

    let store = match PgStore::connect(url, config.db_pool_size) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(error = %e, "Failed to create database pool");
            return;
        }
    };

    tracing::info!("Running content migration...");
    if let Err(e) = store.migrate().await {
        tracing::error!(error = %e, "Content migration failed, backend stays unavailable");
        return;
    }
    tracing::info!("Content migration completed.");

    status.send_replace(BackendStatus::Ready(ContentBackend::new(Arc::new(store))));
    tracing::info!("Content backend ready");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_status_follows_configuration() {
        let mut config = SiteConfig::local("/tmp/uploads");
        let (_tx, rx) = status_channel(&config);
        assert!(matches!(*rx.borrow(), BackendStatus::Unconfigured));

        config.database_url = Some("postgres://localhost/portfolio".into());
        let (_tx, rx) = status_channel(&config);
        assert!(matches!(*rx.borrow(), BackendStatus::Connecting));
        assert!(rx.borrow().backend().is_none());
    }

    #[tokio::test]
    async fn ready_exposes_backend() {
        let (tx, rx) = watch::channel(BackendStatus::Connecting);
        tx.send_replace(BackendStatus::Ready(ContentBackend::in_memory()));
        assert_eq!(rx.borrow().label(), "ready");
        assert!(rx.borrow().backend().is_some());
    }
}
