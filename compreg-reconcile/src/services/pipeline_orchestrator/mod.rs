//! Reconciliation pipeline orchestrator
//!
//! # Stages
//! LOAD TENANTS → SCAN → LOAD REGISTRY → DIFF → SYNTHESIZE → GENERATE → PATCH → REPORT
//!
//! Each stage is a `phase_*` method in its own module. Stages record their
//! outcome in the [`RunSummary`] and hand their output to the next stage.
//! Only an unreadable tenant directory or an unwritable report directory
//! stops a run; every other failure is recorded and later stages carry on
//! with whatever input is still available.

use crate::error::{PipelineError, PipelineResult};
use crate::models::{RunSummary, StepStatus};
use crate::services::component_scanner::ComponentScanner;
use crate::services::report_writer::ReportWriter;
use crate::storage::{FsArtifactStore, FsRegistryStore};
use crate::types::{ArtifactStore, PageLayoutStore, RegistryStore, TenantDirectory};
use compreg_common::config::{PatcherConfig, PipelineConfig};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

mod phase_generating;
mod phase_patching;
mod phase_registry;
mod phase_scanning;
mod phase_synthesizing;

/// Stage names as they appear in the run summary
pub mod steps {
    pub const LOAD_TENANTS: &str = "load_tenants";
    pub const SCAN: &str = "scan";
    pub const LOAD_REGISTRY: &str = "load_registry";
    pub const DIFF: &str = "diff";
    pub const SYNTHESIZE: &str = "synthesize";
    pub const GENERATE: &str = "generate";
    pub const PATCH: &str = "patch";
    pub const WRITE_REPORTS: &str = "write_reports";
}

/// Per-run switches
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOptions {
    /// Compute everything, write only the reports
    pub dry_run: bool,
    /// Scan only these tenant ids; empty means all
    pub tenant_filter: BTreeSet<String>,
}

/// Pipeline orchestrator service
pub struct PipelineOrchestrator {
    directory: Arc<dyn TenantDirectory>,
    scanner: ComponentScanner,
    registry: Arc<dyn RegistryStore>,
    artifacts: Arc<dyn ArtifactStore>,
    patcher_config: PatcherConfig,
    index_file: PathBuf,
    reports: ReportWriter,
    options: RunOptions,
}

impl PipelineOrchestrator {
    /// Orchestrator with filesystem stores laid out per `config.paths`
    pub fn new(
        directory: Arc<dyn TenantDirectory>,
        layouts: Arc<dyn PageLayoutStore>,
        config: &PipelineConfig,
        options: RunOptions,
    ) -> Self {
        let paths = &config.paths;
        Self {
            directory,
            scanner: ComponentScanner::new(layouts),
            registry: Arc::new(FsRegistryStore::new(paths.registry_dir())),
            artifacts: Arc::new(FsArtifactStore::new(paths.artifact_dir())),
            patcher_config: config.patcher.clone(),
            index_file: paths.index_file(),
            reports: ReportWriter::new(paths.reports_dir()),
            options,
        }
    }

    /// Replace the registry and artifact stores
    pub fn with_stores(mut self, registry: Arc<dyn RegistryStore>, artifacts: Arc<dyn ArtifactStore>) -> Self {
        self.registry = registry;
        self.artifacts = artifacts;
        self
    }

    /// Execute one full reconciliation run
    ///
    /// Returns the summary that was persisted. A fatal error is returned
    /// after a best-effort error-state summary has been written.
    pub async fn run(&self) -> PipelineResult<RunSummary> {
        let started = Instant::now();
        let mut summary = RunSummary::new(compreg_common::time::now());
        summary.results.dry_run = self.options.dry_run;

        tracing::info!(
            run_id = %summary.run_id,
            dry_run = self.options.dry_run,
            tenant_filter = self.options.tenant_filter.len(),
            "Starting reconciliation run"
        );

        let tenants = match self.phase_load_tenants(&mut summary).await {
            Ok(tenants) => tenants,
            Err(e) => return Err(self.abort(summary, started, e)),
        };

        let usage = self.phase_scanning(&tenants, &mut summary).await;

        let diff = match self.phase_load_registry(&mut summary) {
            Some(index) => Some(self.phase_diffing(&usage, &index, &mut summary)),
            None => {
                skip(&mut summary, steps::DIFF, "registry unavailable");
                None
            }
        };

        match diff {
            Some(diff) => {
                let descriptors = self.phase_synthesizing(&diff.missing, &mut summary);
                let identifiers = self.phase_generating(&descriptors, &mut summary);
                self.phase_patching(&identifiers, &mut summary);
            }
            None => {
                for step in [steps::SYNTHESIZE, steps::GENERATE, steps::PATCH] {
                    skip(&mut summary, step, "no diff available");
                }
            }
        }

        summary.completed = true;
        summary.duration = elapsed_ms(started);
        summary.record_step(
            steps::WRITE_REPORTS,
            StepStatus::Success,
            format!("reports in {}", self.reports.dir().display()),
            0,
        );
        self.reports.write(&summary).map_err(PipelineError::Reports)?;

        let r = &summary.results;
        tracing::info!(
            run_id = %summary.run_id,
            tenants_scanned = r.tenants_scanned,
            tenants_failed = r.tenants_failed,
            missing = r.missing_components.len(),
            unused = r.unused_components.len(),
            descriptors_created = r.descriptors.created,
            artifacts_created = r.artifacts.created,
            registry_entries = r.registry.new_entries,
            errors = summary.errors.len(),
            duration_ms = summary.duration,
            "Reconciliation run completed"
        );

        Ok(summary)
    }

    /// Persist an incomplete summary, then hand back the fatal error
    fn abort(&self, mut summary: RunSummary, started: Instant, error: PipelineError) -> PipelineError {
        tracing::error!(run_id = %summary.run_id, error = %error, "Reconciliation run aborted");

        summary.record_error(steps::LOAD_TENANTS, None, error.to_string());
        summary.completed = false;
        summary.duration = elapsed_ms(started);

        if let Err(e) = self.reports.write(&summary) {
            tracing::error!(error = %e, "Failed to persist error-state summary");
        }
        error
    }
}

fn elapsed_ms(since: Instant) -> u64 {
    u64::try_from(since.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn skip(summary: &mut RunSummary, step: &str, reason: &str) {
    tracing::info!(step, reason, "Stage skipped");
    summary.record_step(step, StepStatus::Skipped, reason, 0);
}
