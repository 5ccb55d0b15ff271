//! Import portfolio content from a JSON seed document.
//!
//! The whole file is checked before anything is written. By default the
//! import refuses to touch a database that already holds content.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use eyre::WrapErr;

use portfolio_server::seeder::{parse_seed, run_seed, SeedMode, SeedOptions, SeedReport};
use portfolio_server::services::ContentBackend;
use portfolio_server::store::PgStore;

#[derive(Parser, Debug)]
#[command(name = "portfolio-seed", about = "Seed the portfolio content database")]
struct Cli {
    /// Seed document (JSON)
    file: PathBuf,

    /// Delete all existing content before importing
    #[arg(long, conflicts_with = "force")]
    reset: bool,

    /// Append to existing content instead of refusing
    #[arg(long)]
    force: bool,

    /// Check the document and its references without writing
    #[arg(long)]
    validate_only: bool,

    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
}

impl Cli {
    fn options(&self) -> SeedOptions {
        let mode = if self.reset {
            SeedMode::Reset
        } else if self.force {
            SeedMode::Append
        } else {
            SeedMode::Default
        };
        SeedOptions {
            mode,
            validate_only: self.validate_only,
        }
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let options = cli.options();

    let text = tokio::fs::read_to_string(&cli.file)
        .await
        .wrap_err_with(|| format!("reading {}", cli.file.display()))?;
    let doc = parse_seed(&text)?;

    let backend = match cli.database_url.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(url) => {
            let store = PgStore::connect(url, 2)?;
            store.migrate().await.map_err(|e| eyre::eyre!("{e:#}"))?;
            ContentBackend::new(Arc::new(store))
        }
        // References are still checked, against an empty store.
        None if options.validate_only => ContentBackend::in_memory(),
        None => eyre::bail!("DATABASE_URL is not set; pass --database-url or use --validate-only"),
    };

    let report = run_seed(&backend, &doc, options).await?;
    println!("{}", render_report(&report));
    Ok(())
}

fn render_report(report: &SeedReport) -> String {
    if report.validated_only {
        return "Seed document is valid; nothing was written.".to_string();
    }

    let mut lines = Vec::new();
    if report.cleared > 0 {
        lines.push(format!("Cleared {} existing record(s)", report.cleared));
    }
    for (collection, count) in &report.inserted {
        lines.push(format!("  {:<18} {count}", collection.as_str()));
    }
    if report.settings {
        lines.push("  site settings      saved".to_string());
    }
    lines.push(format!("Seeded {} record(s)", report.total_inserted()));
    lines.join("\n")
}
