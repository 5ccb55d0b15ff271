//! Portfolio server: content API, uploads and site reads.
//!
//! The listener comes up immediately; the database connection is set up in
//! the background and flips the backend status to ready when it succeeds.

use std::net::SocketAddr;

use clap::Parser;

use portfolio_server::config::SiteConfig;
use portfolio_server::routes::{self, AppState};
use portfolio_server::{metrics, site};

#[derive(Parser)]
#[command(name = "portfolio", about = "Portfolio content server")]
struct Cli {
    /// Server port
    #[arg(short, long, env = "PORTFOLIO_PORT", default_value = "8080")]
    port: u16,

    /// PostgreSQL connection URL (overrides DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,

    /// Serve bundled fallback content when no database is configured
    #[arg(long)]
    fallback: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    tracing::info!("Starting portfolio server...");

    let mut config = SiteConfig::from_env();
    if let Some(url) = cli.database_url.filter(|s| !s.trim().is_empty()) {
        config.database_url = Some(url);
    }
    config.use_fallback |= cli.fallback;

    let (status_tx, status_rx) = site::backend::status_channel(&config);
    tokio::spawn(site::backend::connect(config.clone(), status_tx));

    metrics::init_metrics();

    let app = routes::router(AppState::new(config, status_rx));

    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    tracing::info!("Portfolio server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    if std::env::var("LOG_FORMAT").unwrap_or_default() == "json" {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
