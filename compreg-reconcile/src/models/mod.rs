//! Data models for the reconciliation pipeline
//!
//! - Tenants and their connection topology
//! - Component usage (per tenant and aggregated)
//! - Registry descriptors and inferred property specs
//! - Report entries and run summary

pub mod descriptor;
pub mod report;
pub mod tenant;
pub mod usage;

pub use descriptor::{
    Category, ComponentDescriptor, DescriptorMetadata, EditorKind, InferredProperty,
    PropertyKind, PropertySpec, TenantScope,
};
pub use report::{
    MissingComponentReportEntry, OutcomeCounts, RegistryPatchResult, RunError, RunResults,
    RunSummary, StepRecord, StepStatus, TenantScanReport,
};
pub use tenant::{ConnectionProfile, IsolatedProfile, Tenant};
pub use usage::{
    AggregatedUsage, ComponentUsageInstance, ComponentUsageRecord, PageLayoutDocument,
    TenantUsage, UsageAccumulator, MERGED_SAMPLE_LIMIT, TENANT_SAMPLE_LIMIT,
};
