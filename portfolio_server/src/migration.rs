//! Schema migration for the portfolio content tables.

use diesel_async::AsyncPgConnection;
use diesel_async::SimpleAsyncConnection;

/// SQL migration for the content store.
///
/// Idempotent; safe to run on every start.
pub const MIGRATION_SQL: &str = r#"
-- ================================================================
-- Portfolio content tables
-- ================================================================

CREATE TABLE IF NOT EXISTS content_documents (
    id              UUID PRIMARY KEY,
    collection      VARCHAR(64) NOT NULL,
    sort_order      INTEGER NOT NULL DEFAULT 0,
    data            JSONB NOT NULL DEFAULT '{}'::jsonb,
    create_date     TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    write_date      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_content_documents_collection
    ON content_documents (collection, sort_order, create_date);

CREATE TABLE IF NOT EXISTS site_settings (
    key             VARCHAR(64) PRIMARY KEY,
    data            JSONB NOT NULL,
    create_date     TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    write_date      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS stored_files (
    id              UUID PRIMARY KEY,
    content_type    VARCHAR(255) NOT NULL,
    size_bytes      BIGINT NOT NULL,
    sha256          VARCHAR(64) NOT NULL,
    file_name       VARCHAR(255) NOT NULL,
    create_date     TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
"#;

/// Run the content store migration.
pub async fn run_migration(conn: &mut AsyncPgConnection) -> anyhow::Result<()> {
    conn.batch_execute(MIGRATION_SQL)
        .await
        .map_err(|e| anyhow::anyhow!("content migration failed: {e}"))?;
    Ok(())
}
