//! Error types for compreg-reconcile
//!
//! Only errors that abort a whole run live here. Per-tenant, per-component
//! and patch-stage failures have their own types next to the code that
//! raises them and end up in the run summary instead.

use thiserror::Error;

/// Fatal pipeline error
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Tenant directory could not be read
    #[error("Tenant directory unavailable: {0}")]
    TenantDirectory(#[source] compreg_common::Error),

    /// Run reports could not be persisted
    #[error("Failed to write run reports: {0}")]
    Reports(#[source] compreg_common::Error),
}

/// Result type for a pipeline run
pub type PipelineResult<T> = Result<T, PipelineError>;
