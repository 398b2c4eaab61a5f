//! Tenant directory backed by the shared store
//!
//! `tenants` holds one row per tenant; isolated tenants carry their
//! connection fields and an optional `credential_ref` into `tenant_secrets`.

use crate::models::{ConnectionProfile, IsolatedProfile, Tenant};
use crate::types::TenantDirectory;
use async_trait::async_trait;
use compreg_common::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// Port used when an isolated tenant row leaves `db_port` empty
pub const DEFAULT_POSTGRES_PORT: u16 = 5432;

const TENANT_COLUMNS: &str = r#"
    SELECT t.id, t.name, t.isolated, t.db_host, t.db_port, t.db_name, t.db_user,
           t.credential_ref, t.connection_url, s.secret
    FROM tenants t
    LEFT JOIN tenant_secrets s ON s.credential_ref = t.credential_ref
"#;

/// [`TenantDirectory`] over the shared SQLite store
#[derive(Debug, Clone)]
pub struct SqliteTenantDirectory {
    pool: SqlitePool,
}

impl SqliteTenantDirectory {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantDirectory for SqliteTenantDirectory {
    async fn list_tenants(&self) -> Result<Vec<Tenant>> {
        let sql = format!("{} WHERE t.active = 1 ORDER BY t.id", TENANT_COLUMNS);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        let tenants = rows.iter().map(tenant_from_row).collect::<Result<Vec<_>>>()?;
        tracing::debug!(count = tenants.len(), "Loaded tenant directory");
        Ok(tenants)
    }

    async fn connection_profile(&self, tenant_id: &str) -> Result<ConnectionProfile> {
        let sql = format!("{} WHERE t.id = ?", TENANT_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(tenant_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("tenant {}", tenant_id)))?;

        Ok(tenant_from_row(&row)?.connection_profile)
    }
}

/// Build a tenant from one directory row
///
/// Only a row without a readable `id` or `name` is an error. Bad connection
/// fields give a [`ConnectionProfile::Misconfigured`] tenant so the scan
/// stage reports it as that tenant's failure.
fn tenant_from_row(row: &SqliteRow) -> Result<Tenant> {
    let id: String = row.try_get("id")?;
    let name: String = row.try_get("name")?;

    let connection_profile = match profile_from_row(&id, row) {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!(tenant_id = %id, error = %e, "Malformed tenant connection fields");
            ConnectionProfile::Misconfigured(e.to_string())
        }
    };
    Ok(Tenant {
        id,
        name,
        connection_profile,
    })
}

fn profile_from_row(id: &str, row: &SqliteRow) -> Result<ConnectionProfile> {
    let isolated: bool = row.try_get::<i64, _>("isolated")? != 0;
    if !isolated {
        return Ok(ConnectionProfile::Shared);
    }

    let port = match row.try_get::<Option<i64>, _>("db_port")? {
        Some(p) => u16::try_from(p)
            .map_err(|_| Error::InvalidInput(format!("tenant {}: db_port {} out of range", id, p)))?,
        None => DEFAULT_POSTGRES_PORT,
    };

    Ok(ConnectionProfile::Isolated(IsolatedProfile {
        host: row.try_get::<Option<String>, _>("db_host")?.unwrap_or_default(),
        port,
        database: row.try_get::<Option<String>, _>("db_name")?.unwrap_or_default(),
        username: row.try_get::<Option<String>, _>("db_user")?.unwrap_or_default(),
        credential_ref: row.try_get("credential_ref")?,
        stored_secret: row.try_get("secret")?,
        connection_url: row.try_get("connection_url")?,
    }))
}
