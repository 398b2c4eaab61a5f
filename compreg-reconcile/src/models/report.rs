//! Report entries and run summary
//!
//! The run summary is the only user-facing error surface: every unit of work
//! ends up as `success`, `skipped`, or `error` in one of these structures.

use super::descriptor::{Category, EditorKind, InferredProperty, TenantScope};
use super::usage::ComponentUsageInstance;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

/// One used-but-unregistered component type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingComponentReportEntry {
    #[serde(rename = "type")]
    pub component_type: String,
    pub total_usage: usize,
    pub tenant_count: usize,
    pub tenants: Vec<String>,
    pub page_count: usize,
    pub samples: Vec<ComponentUsageInstance>,
    pub inferred_properties: BTreeMap<String, InferredProperty>,
    pub recommended_id: String,
    pub recommended_category: Category,
    pub recommended_editor: EditorKind,
    pub recommended_scope: TenantScope,
    /// Properties whose samples disagreed about the kind
    pub polymorphic_properties: Vec<String>,
}

/// Outcome of a stage or unit of work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Success,
    Skipped,
    Error,
}

/// One pipeline stage as it ran
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    pub name: String,
    pub status: StepStatus,
    pub message: String,
    pub duration_ms: u64,
}

/// A recorded failure; `unit` names the tenant, component, or file involved
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunError {
    pub step: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub message: String,
}

/// Created / skipped / errored tallies for a write stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    pub created: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl OutcomeCounts {
    pub fn total(&self) -> usize {
        self.created + self.skipped + self.errors
    }
}

/// Outcome of appending references to the generated registry index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryPatchResult {
    pub updated: bool,
    pub new_entries: usize,
    pub added_refs: Vec<String>,
}

impl RegistryPatchResult {
    pub fn unchanged() -> Self {
        Self::default()
    }
}

/// Per-tenant scan outcome
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantScanReport {
    pub tenant_id: String,
    pub topology: String,
    pub status: StepStatus,
    pub documents_scanned: usize,
    pub documents_skipped: usize,
    pub instances: usize,
    pub component_types: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate results of a run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResults {
    pub tenants_scanned: usize,
    pub tenants_failed: usize,
    pub tenant_scans: Vec<TenantScanReport>,
    pub component_types_found: usize,
    pub registered_types: usize,
    pub missing_components: Vec<MissingComponentReportEntry>,
    pub unused_components: Vec<String>,
    pub descriptors: OutcomeCounts,
    pub artifacts: OutcomeCounts,
    pub registry: RegistryPatchResult,
    pub dry_run: bool,
}

/// Machine-readable summary of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    #[serde(rename = "runId")]
    pub run_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub steps: Vec<StepRecord>,
    pub errors: Vec<RunError>,
    pub warnings: Vec<String>,
    pub results: RunResults,
    /// Wall-clock duration in milliseconds
    pub duration: u64,
    pub completed: bool,
}

impl RunSummary {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            timestamp,
            steps: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
            results: RunResults::default(),
            duration: 0,
            completed: false,
        }
    }

    pub fn record_step(
        &mut self,
        name: &str,
        status: StepStatus,
        message: impl Into<String>,
        duration_ms: u64,
    ) {
        self.steps.push(StepRecord {
            name: name.to_string(),
            status,
            message: message.into(),
            duration_ms,
        });
    }

    pub fn record_error(&mut self, step: &str, unit: Option<&str>, message: impl Into<String>) {
        self.errors.push(RunError {
            step: step.to_string(),
            unit: unit.map(str::to_string),
            message: message.into(),
        });
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn step(&self, name: &str) -> Option<&StepRecord> {
        self.steps.iter().find(|s| s.name == name)
    }

    /// Completed with nothing in `errors`
    pub fn is_clean(&self) -> bool {
        self.completed && self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_summary_serializes_contract_fields() {
        let mut summary = RunSummary::new(Utc::now());
        summary.record_step("scan", StepStatus::Success, "2 tenants", 12);
        summary.record_error("scan", Some("t2"), "connection refused");
        summary.completed = true;

        let value = serde_json::to_value(&summary).unwrap();
        for field in ["runId", "timestamp", "steps", "errors", "warnings", "results", "duration", "completed"] {
            assert!(value.get(field).is_some(), "missing field {}", field);
        }
        assert_eq!(value["steps"][0]["status"], json!("success"));
        assert_eq!(value["errors"][0]["unit"], json!("t2"));
        assert!(!summary.is_clean());
    }

    #[test]
    fn test_outcome_total() {
        let counts = OutcomeCounts { created: 2, skipped: 1, errors: 1 };
        assert_eq!(counts.total(), 4);
    }
}
