//! SYNTHESIZE: one descriptor per missing component type

use super::{elapsed_ms, steps, PipelineOrchestrator};
use crate::models::{ComponentDescriptor, MissingComponentReportEntry, RunSummary, StepStatus};
use crate::services::descriptor_synthesizer::{DescriptorSynthesizer, SynthesisOutcome};
use std::time::Instant;

impl PipelineOrchestrator {
    /// Returns every descriptor that now exists in the registry store,
    /// created this run or skipped because it was already there
    pub(super) fn phase_synthesizing(
        &self,
        missing: &[MissingComponentReportEntry],
        summary: &mut RunSummary,
    ) -> Vec<ComponentDescriptor> {
        let started = Instant::now();
        let synthesizer = DescriptorSynthesizer::new(self.registry.clone(), summary.timestamp)
            .with_dry_run(self.options.dry_run);

        let mut available = Vec::new();
        let mut planned = 0usize;
        let counts = &mut summary.results.descriptors;
        let mut errors = Vec::new();

        for entry in missing {
            match synthesizer.synthesize(entry) {
                Ok(SynthesisOutcome::Created { descriptor, .. }) => {
                    counts.created += 1;
                    available.push(descriptor);
                }
                Ok(SynthesisOutcome::Planned { .. }) => planned += 1,
                Ok(SynthesisOutcome::Skipped { descriptor }) => {
                    counts.skipped += 1;
                    available.push(descriptor);
                }
                Err(e) => {
                    tracing::error!(component_type = %entry.component_type, error = %e, "Descriptor synthesis failed");
                    counts.errors += 1;
                    errors.push((entry.component_type.clone(), e.to_string()));
                }
            }
        }

        let counts = summary.results.descriptors;
        for (unit, message) in errors {
            summary.record_error(steps::SYNTHESIZE, Some(&unit), message);
        }

        let (status, message) = if self.options.dry_run {
            (
                StepStatus::Skipped,
                format!("dry run: {} planned, {} exist", planned, counts.skipped),
            )
        } else if counts.errors > 0 {
            (
                StepStatus::Error,
                format!("{} created, {} skipped, {} failed", counts.created, counts.skipped, counts.errors),
            )
        } else {
            (
                StepStatus::Success,
                format!("{} created, {} skipped", counts.created, counts.skipped),
            )
        };
        summary.record_step(steps::SYNTHESIZE, status, message, elapsed_ms(started));

        available
    }
}
