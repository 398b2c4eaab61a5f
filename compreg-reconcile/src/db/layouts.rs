//! Page layout retrieval
//!
//! Shared tenants are a filtered query on the shared store. Isolated tenants
//! get a short-lived PostgreSQL pool that is always closed before returning.

use crate::models::{IsolatedProfile, PageLayoutDocument, Tenant, ConnectionProfile};
use crate::services::component_scanner::ScanError;
use crate::services::credentials::CredentialChain;
use crate::types::PageLayoutStore;
use async_trait::async_trait;
use compreg_common::config::{IsolatedPoolConfig, MAX_ISOLATED_CONNECTIONS};
use serde_json::Value;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{PgPool, Row, SqlitePool};
use std::time::Duration;

/// [`PageLayoutStore`] over the shared store and isolated tenant databases
pub struct SqlLayoutStore {
    shared: SqlitePool,
    pool_config: IsolatedPoolConfig,
    credentials: CredentialChain,
}

impl SqlLayoutStore {
    pub fn new(shared: SqlitePool, pool_config: IsolatedPoolConfig, credentials: CredentialChain) -> Self {
        Self {
            shared,
            pool_config,
            credentials,
        }
    }

    async fn fetch_shared(&self, tenant: &Tenant) -> Result<Vec<PageLayoutDocument>, ScanError> {
        let rows = sqlx::query("SELECT page_id, layout FROM page_layouts WHERE tenant_id = ? ORDER BY id")
            .bind(&tenant.id)
            .fetch_all(&self.shared)
            .await
            .map_err(|e| ScanError::Query(e.to_string()))?;

        rows.iter()
            .map(|row| {
                let page_id: String = row.try_get("page_id").map_err(|e| ScanError::Query(e.to_string()))?;
                let layout: Option<String> = row.try_get("layout").map_err(|e| ScanError::Query(e.to_string()))?;
                Ok(document(&tenant.id, page_id, layout))
            })
            .collect()
    }

    async fn fetch_isolated(
        &self,
        tenant: &Tenant,
        profile: &IsolatedProfile,
    ) -> Result<Vec<PageLayoutDocument>, ScanError> {
        let credentials = self.credentials.resolve(&tenant.id, profile)?;

        let options = PgConnectOptions::new()
            .host(&credentials.host)
            .port(credentials.port)
            .database(&credentials.database)
            .username(&credentials.username)
            .password(&credentials.password);

        let pool = PgPoolOptions::new()
            .max_connections(self.pool_config.max_connections.clamp(1, MAX_ISOLATED_CONNECTIONS))
            .acquire_timeout(Duration::from_secs(self.pool_config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(self.pool_config.idle_timeout_secs))
            .connect_with(options)
            .await
            .map_err(|e| ScanError::Connection(e.to_string()))?;

        tracing::debug!(
            tenant_id = %tenant.id,
            host = %credentials.host,
            database = %credentials.database,
            "Isolated pool opened"
        );

        let result = query_isolated(&pool, &tenant.id).await;
        pool.close().await;
        tracing::debug!(tenant_id = %tenant.id, "Isolated pool closed");

        result
    }
}

async fn query_isolated(pool: &PgPool, tenant_id: &str) -> Result<Vec<PageLayoutDocument>, ScanError> {
    let rows = sqlx::query(
        "SELECT page_id::text AS page_id, layout::text AS layout FROM page_layouts WHERE is_default_language = TRUE",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| ScanError::Query(e.to_string()))?;

    rows.iter()
        .map(|row| {
            let page_id: String = row.try_get("page_id").map_err(|e| ScanError::Query(e.to_string()))?;
            let layout: Option<String> = row.try_get("layout").map_err(|e| ScanError::Query(e.to_string()))?;
            Ok(document(tenant_id, page_id, layout))
        })
        .collect()
}

/// Unparseable or empty layouts become `null`, which the scanner skips
fn document(tenant_id: &str, page_id: String, layout: Option<String>) -> PageLayoutDocument {
    let layout = match layout.as_deref().map(serde_json::from_str::<Value>) {
        Some(Ok(value)) => value,
        Some(Err(e)) => {
            tracing::warn!(tenant_id = %tenant_id, page_id = %page_id, error = %e, "Unparseable layout JSON");
            Value::Null
        }
        None => Value::Null,
    };
    PageLayoutDocument::new(page_id, layout)
}

#[async_trait]
impl PageLayoutStore for SqlLayoutStore {
    async fn fetch_layouts(&self, tenant: &Tenant) -> Result<Vec<PageLayoutDocument>, ScanError> {
        match &tenant.connection_profile {
            ConnectionProfile::Shared => self.fetch_shared(tenant).await,
            ConnectionProfile::Isolated(profile) => self.fetch_isolated(tenant, profile).await,
            ConnectionProfile::Misconfigured(reason) => Err(ScanError::Misconfigured(reason.clone())),
        }
    }
}
