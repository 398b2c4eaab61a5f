//! Usage vs. registry diff
//!
//! Plain set differences on the exact type string. A casing mismatch
//! (`heroBanner` vs `HeroBanner`) is reported as missing.

use crate::models::{MissingComponentReportEntry, TenantScope, UsageAccumulator};
use crate::services::naming::{derive_id, infer_category, infer_editor};
use crate::services::registry_loader::RegistryIndex;
use crate::services::schema_inferencer::SchemaInferencer;
use std::collections::BTreeSet;

/// Result of diffing usage against the registry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiffResult {
    /// Used but not registered, by total usage descending
    pub missing: Vec<MissingComponentReportEntry>,
    /// Registered but not used, lexical order
    pub unused: Vec<String>,
}

impl DiffResult {
    pub fn missing_types(&self) -> Vec<&str> {
        self.missing.iter().map(|m| m.component_type.as_str()).collect()
    }
}

/// Computes missing/unused component types
#[derive(Debug, Default)]
pub struct UsageRegistryDiffEngine {
    inferencer: SchemaInferencer,
}

impl UsageRegistryDiffEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diff(&self, usage: &UsageAccumulator, registry: &RegistryIndex) -> DiffResult {
        let used: BTreeSet<&str> = usage.types().collect();
        let registered = registry.all_types();

        let mut missing: Vec<MissingComponentReportEntry> = used
            .difference(&registered)
            .filter_map(|t| usage.get(t))
            .map(|aggregated| {
                let inferred = self.inferencer.infer(&aggregated.samples);
                let polymorphic = inferred
                    .iter()
                    .filter(|(_, p)| p.is_polymorphic())
                    .map(|(k, _)| k.clone())
                    .collect();
                let category = infer_category(&aggregated.component_type);
                let editor = infer_editor(
                    &aggregated.component_type,
                    inferred.keys().map(String::as_str),
                );

                MissingComponentReportEntry {
                    component_type: aggregated.component_type.clone(),
                    total_usage: aggregated.total_count,
                    tenant_count: aggregated.tenant_count(),
                    tenants: aggregated.tenant_ids.iter().cloned().collect(),
                    page_count: aggregated.page_count,
                    samples: aggregated.samples.clone(),
                    recommended_id: derive_id(&aggregated.component_type),
                    recommended_category: category,
                    recommended_editor: editor,
                    recommended_scope: TenantScope::for_tenant_count(aggregated.tenant_count()),
                    polymorphic_properties: polymorphic,
                    inferred_properties: inferred,
                }
            })
            .collect();

        // Stable: equal usage keeps lexical type order
        missing.sort_by(|a, b| b.total_usage.cmp(&a.total_usage));

        let unused = registered
            .difference(&used)
            .map(|t| t.to_string())
            .collect();

        DiffResult { missing, unused }
    }
}
