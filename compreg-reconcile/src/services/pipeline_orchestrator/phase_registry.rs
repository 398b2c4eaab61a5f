//! LOAD REGISTRY and DIFF

use super::{elapsed_ms, steps, PipelineOrchestrator};
use crate::models::{RunSummary, StepStatus, UsageAccumulator};
use crate::services::diff_engine::{DiffResult, UsageRegistryDiffEngine};
use crate::services::registry_loader::{RegistryIndex, RegistryLoader};
use std::time::Instant;

impl PipelineOrchestrator {
    pub(super) fn phase_load_registry(&self, summary: &mut RunSummary) -> Option<RegistryIndex> {
        let started = Instant::now();

        match RegistryLoader::new(self.registry.as_ref()).load_all() {
            Ok(index) => {
                for warning in &index.warnings {
                    summary.warn(format!("registry: {}", warning));
                }
                summary.record_step(
                    steps::LOAD_REGISTRY,
                    StepStatus::Success,
                    format!(
                        "{} descriptor(s), {} type(s), {} excluded",
                        index.len(),
                        index.by_type.len(),
                        index.warnings.len()
                    ),
                    elapsed_ms(started),
                );
                summary.results.registered_types = index.by_type.len();
                Some(index)
            }
            Err(e) => {
                tracing::error!(error = %e, "Registry load failed");
                summary.record_error(steps::LOAD_REGISTRY, None, e.to_string());
                summary.record_step(steps::LOAD_REGISTRY, StepStatus::Error, e.to_string(), elapsed_ms(started));
                None
            }
        }
    }

    pub(super) fn phase_diffing(
        &self,
        usage: &UsageAccumulator,
        index: &RegistryIndex,
        summary: &mut RunSummary,
    ) -> DiffResult {
        let started = Instant::now();
        let diff = UsageRegistryDiffEngine::new().diff(usage, index);

        for entry in &diff.missing {
            if !entry.polymorphic_properties.is_empty() {
                summary.warn(format!(
                    "{}: mixed value kinds for {}",
                    entry.component_type,
                    entry.polymorphic_properties.join(", ")
                ));
            }
        }

        tracing::info!(missing = diff.missing.len(), unused = diff.unused.len(), "Diff computed");
        summary.record_step(
            steps::DIFF,
            StepStatus::Success,
            format!("{} missing, {} unused", diff.missing.len(), diff.unused.len()),
            elapsed_ms(started),
        );
        summary.results.missing_components = diff.missing.clone();
        summary.results.unused_components = diff.unused.clone();

        diff
    }
}
