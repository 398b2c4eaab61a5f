//! LOAD TENANTS and SCAN
//!
//! The tenant directory is the one read-side dependency a run cannot do
//! without. Scanning never fails as a whole: tenants that can't be read are
//! recorded and left out of the usage totals.

use super::{elapsed_ms, steps, PipelineOrchestrator};
use crate::error::PipelineError;
use crate::models::{RunSummary, StepStatus, Tenant, UsageAccumulator};
use std::time::Instant;

impl PipelineOrchestrator {
    pub(super) async fn phase_load_tenants(
        &self,
        summary: &mut RunSummary,
    ) -> Result<Vec<Tenant>, PipelineError> {
        let started = Instant::now();

        match self.directory.list_tenants().await {
            Ok(tenants) => {
                let isolated = tenants.iter().filter(|t| t.is_isolated()).count();
                tracing::info!(tenants = tenants.len(), isolated, "Tenant directory loaded");
                summary.record_step(
                    steps::LOAD_TENANTS,
                    StepStatus::Success,
                    format!("{} tenant(s), {} isolated", tenants.len(), isolated),
                    elapsed_ms(started),
                );
                Ok(tenants)
            }
            Err(e) => {
                summary.record_step(
                    steps::LOAD_TENANTS,
                    StepStatus::Error,
                    e.to_string(),
                    elapsed_ms(started),
                );
                Err(PipelineError::TenantDirectory(e))
            }
        }
    }

    pub(super) async fn phase_scanning(&self, tenants: &[Tenant], summary: &mut RunSummary) -> UsageAccumulator {
        let started = Instant::now();

        let filter = &self.options.tenant_filter;
        for wanted in filter {
            if !tenants.iter().any(|t| &t.id == wanted) {
                summary.warn(format!("tenant filter: '{}' is not an active tenant", wanted));
            }
        }

        let (usage, reports) = self.scanner.scan_all(tenants, filter).await;

        let failed: Vec<_> = reports.iter().filter(|r| r.status == StepStatus::Error).collect();
        for report in &failed {
            summary.record_error(
                steps::SCAN,
                Some(&report.tenant_id),
                report.error.clone().unwrap_or_default(),
            );
        }

        let (status, message) = if failed.is_empty() {
            (
                StepStatus::Success,
                format!("{} tenant(s) scanned, {} component type(s)", reports.len(), usage.len()),
            )
        } else {
            (
                StepStatus::Error,
                format!(
                    "{} of {} tenant(s) failed, {} component type(s) from the rest",
                    failed.len(),
                    reports.len(),
                    usage.len()
                ),
            )
        };
        summary.record_step(steps::SCAN, status, message, elapsed_ms(started));

        let results = &mut summary.results;
        results.tenants_failed = failed.len();
        results.tenants_scanned = reports.len() - failed.len();
        results.component_types_found = usage.len();
        results.tenant_scans = reports;

        usage
    }
}
