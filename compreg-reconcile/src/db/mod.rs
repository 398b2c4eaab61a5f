//! Database access for compreg-reconcile
//!
//! Read-only adapters over the CMS stores: the tenant directory and page
//! layouts live in the shared SQLite store; isolated tenants have their own
//! PostgreSQL databases.

pub mod layouts;
pub mod tenants;

pub use layouts::SqlLayoutStore;
pub use tenants::{SqliteTenantDirectory, DEFAULT_POSTGRES_PORT};
