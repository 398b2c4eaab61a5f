//! Collaborator contracts for the reconciliation pipeline
//!
//! The pipeline never talks to the CMS directly. It sees four narrow
//! contracts:
//! - **TenantDirectory:** who the tenants are and how to reach them
//! - **PageLayoutStore:** stored page layouts per tenant
//! - **RegistryStore:** descriptor records keyed by id
//! - **ArtifactStore:** generated component source keyed by path
//!
//! For both stores, existence of the keyed resource is the idempotency oracle.

use crate::models::{ComponentDescriptor, ConnectionProfile, PageLayoutDocument, Tenant};
use crate::services::component_scanner::ScanError;
use async_trait::async_trait;
use compreg_common::Result;
use serde_json::Value;
use std::path::{Path, PathBuf};

// ============================================================================
// Read side
// ============================================================================

/// Source of tenants and their connection topology
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    /// All active tenants
    ///
    /// An error here is fatal to the whole run.
    async fn list_tenants(&self) -> Result<Vec<Tenant>>;

    /// Current connection profile for one tenant
    async fn connection_profile(&self, tenant_id: &str) -> Result<ConnectionProfile>;
}

/// Stored page layouts for a tenant
#[async_trait]
pub trait PageLayoutStore: Send + Sync {
    /// Default-language layouts of every page the tenant owns
    async fn fetch_layouts(&self, tenant: &Tenant) -> std::result::Result<Vec<PageLayoutDocument>, ScanError>;
}

// ============================================================================
// Write side
// ============================================================================

/// A descriptor record as found in the registry, before validation
#[derive(Debug, Clone, PartialEq)]
pub struct RawDescriptor {
    /// Where the record came from (file name), for warnings
    pub location: String,
    /// Parsed JSON, or the parse failure message
    pub body: std::result::Result<Value, String>,
}

/// Descriptor records, one addressable resource per id
pub trait RegistryStore: Send + Sync {
    fn list_descriptors(&self) -> Result<Vec<RawDescriptor>>;

    fn exists(&self, id: &str) -> bool;

    /// Persist a new descriptor; never replaces an existing one
    fn write_descriptor(&self, id: &str, descriptor: &ComponentDescriptor) -> Result<PathBuf>;
}

/// Generated component source files
pub trait ArtifactStore: Send + Sync {
    /// Target path for a component identifier
    fn artifact_path(&self, identifier: &str) -> PathBuf;

    fn exists(&self, path: &Path) -> bool;

    /// Write new source; never replaces an existing file
    fn write(&self, path: &Path, source: &str) -> Result<()>;
}
