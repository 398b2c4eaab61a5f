//! PATCH: reference new artifacts from the generated registry index
//!
//! A structural problem with the index file fails this stage only. The file
//! is left exactly as it was.

use super::{elapsed_ms, skip, steps, PipelineOrchestrator};
use crate::models::{RegistryPatchResult, RunSummary, StepStatus};
use crate::services::registry_patcher::RegistryPatcher;
use std::time::Instant;

impl PipelineOrchestrator {
    pub(super) fn phase_patching(&self, identifiers: &[String], summary: &mut RunSummary) {
        if self.options.dry_run {
            skip(summary, steps::PATCH, "dry run");
            return;
        }
        if identifiers.is_empty() {
            summary.results.registry = RegistryPatchResult::unchanged();
            summary.record_step(steps::PATCH, StepStatus::Success, "no new references", 0);
            return;
        }

        let started = Instant::now();
        let patched = RegistryPatcher::new(&self.patcher_config.anchor_pattern, self.patcher_config.import_prefix.clone())
            .and_then(|patcher| patcher.patch_file(&self.index_file, identifiers));

        match patched {
            Ok(result) => {
                summary.record_step(
                    steps::PATCH,
                    StepStatus::Success,
                    format!("{} entr(ies) added", result.new_entries),
                    elapsed_ms(started),
                );
                summary.results.registry = result;
            }
            Err(e) => {
                tracing::error!(path = %self.index_file.display(), error = %e, "Registry patch failed");
                let unit = self.index_file.display().to_string();
                summary.record_error(steps::PATCH, Some(&unit), e.to_string());
                summary.record_step(steps::PATCH, StepStatus::Error, e.to_string(), elapsed_ms(started));
                summary.results.registry = RegistryPatchResult::unchanged();
            }
        }
    }
}
