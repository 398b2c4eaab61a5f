//! Shared CMS store connection
//!
//! The pipeline only reads the shared store. Schema creation exists for
//! development stores and tests (`database.create_schema = true`).

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tracing::info;

/// Open the shared CMS store
pub async fn connect_shared_store(db_url: &str) -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(2)
        .connect(db_url)
        .await?;

    info!("Connected to shared CMS store");

    Ok(pool)
}

/// Create the tenant directory and page layout tables if missing
///
/// Idempotent - safe to call multiple times
pub async fn create_shared_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tenants (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            isolated INTEGER NOT NULL DEFAULT 0,
            db_host TEXT,
            db_port INTEGER,
            db_name TEXT,
            db_user TEXT,
            credential_ref TEXT,
            connection_url TEXT,
            active INTEGER NOT NULL DEFAULT 1
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tenant_secrets (
            credential_ref TEXT PRIMARY KEY,
            secret TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS page_layouts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            tenant_id TEXT NOT NULL,
            page_id TEXT NOT NULL,
            layout TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_page_layouts_tenant ON page_layouts(tenant_id)")
        .execute(pool)
        .await?;

    info!("Shared schema ready (tenants, tenant_secrets, page_layouts)");

    Ok(())
}
