//! CMS store fixtures
//!
//! A temp-file SQLite shared store plus an output root, both inside one
//! TempDir that must outlive the test.

use compreg_common::config::{OutputPaths, PipelineConfig};
use compreg_common::db::{connect_shared_store, create_shared_schema};
use serde_json::Value;
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Shared store and output root for one test
pub struct TestWorkspace {
    pub temp_dir: TempDir,
    pub pool: SqlitePool,
}

impl TestWorkspace {
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn output_root(&self) -> PathBuf {
        self.temp_dir.path().join("out")
    }
}

/// Fresh shared store with the CMS schema
pub async fn create_test_store() -> TestWorkspace {
    let temp_dir = TempDir::new().unwrap();
    let db_url = format!("sqlite://{}?mode=rwc", temp_dir.path().join("cms.db").display());
    let pool = connect_shared_store(&db_url).await.unwrap();
    create_shared_schema(&pool).await.unwrap();
    TestWorkspace { temp_dir, pool }
}

/// Config whose outputs all live under `root`
pub fn test_config(root: &Path) -> PipelineConfig {
    PipelineConfig {
        paths: OutputPaths::under(root),
        ..PipelineConfig::default()
    }
}

pub async fn insert_shared_tenant(pool: &SqlitePool, id: &str) {
    sqlx::query("INSERT INTO tenants (id, name, isolated) VALUES (?, ?, 0)")
        .bind(id)
        .bind(format!("Tenant {}", id))
        .execute(pool)
        .await
        .unwrap();
}

pub async fn insert_isolated_tenant(
    pool: &SqlitePool,
    id: &str,
    credential_ref: Option<&str>,
    secret: Option<&str>,
) {
    sqlx::query(
        r#"
        INSERT INTO tenants (id, name, isolated, db_host, db_port, db_name, db_user, credential_ref)
        VALUES (?, ?, 1, '127.0.0.1', 5432, ?, 'reader', ?)
        "#,
    )
    .bind(id)
    .bind(format!("Tenant {}", id))
    .bind(format!("{}_cms", id))
    .bind(credential_ref)
    .execute(pool)
    .await
    .unwrap();

    if let (Some(reference), Some(secret)) = (credential_ref, secret) {
        sqlx::query("INSERT INTO tenant_secrets (credential_ref, secret) VALUES (?, ?)")
            .bind(reference)
            .bind(secret)
            .execute(pool)
            .await
            .unwrap();
    }
}

pub async fn insert_layout(pool: &SqlitePool, tenant_id: &str, page_id: &str, layout: &Value) {
    sqlx::query("INSERT INTO page_layouts (tenant_id, page_id, layout) VALUES (?, ?, ?)")
        .bind(tenant_id)
        .bind(page_id)
        .bind(layout.to_string())
        .execute(pool)
        .await
        .unwrap();
}
