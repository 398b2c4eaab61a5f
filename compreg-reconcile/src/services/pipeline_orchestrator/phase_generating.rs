//! GENERATE: component sources for descriptors in the registry store
//!
//! The artifact existence check is separate from the descriptor one, so a
//! descriptor that was already present still gets a missing artifact.

use super::{elapsed_ms, skip, steps, PipelineOrchestrator};
use crate::models::{ComponentDescriptor, RunSummary, StepStatus};
use crate::services::artifact_generator::{ArtifactGenerator, GenerationOutcome};
use std::time::Instant;

impl PipelineOrchestrator {
    /// Returns identifiers of every artifact now on disk for these descriptors
    pub(super) fn phase_generating(
        &self,
        descriptors: &[ComponentDescriptor],
        summary: &mut RunSummary,
    ) -> Vec<String> {
        if self.options.dry_run {
            skip(summary, steps::GENERATE, "dry run");
            return Vec::new();
        }

        let started = Instant::now();
        let generator = ArtifactGenerator::new(self.artifacts.clone());
        let mut identifiers = Vec::with_capacity(descriptors.len());

        for descriptor in descriptors {
            match generator.generate(descriptor) {
                Ok(outcome) => {
                    match outcome {
                        GenerationOutcome::Created { .. } => summary.results.artifacts.created += 1,
                        GenerationOutcome::Skipped { .. } => summary.results.artifacts.skipped += 1,
                    }
                    identifiers.push(outcome.identifier().to_string());
                }
                Err(e) => {
                    tracing::error!(id = %descriptor.id, error = %e, "Artifact generation failed");
                    summary.results.artifacts.errors += 1;
                    summary.record_error(steps::GENERATE, Some(&descriptor.id), e.to_string());
                }
            }
        }

        let counts = summary.results.artifacts;
        let status = if counts.errors > 0 {
            StepStatus::Error
        } else {
            StepStatus::Success
        };
        summary.record_step(
            steps::GENERATE,
            status,
            format!("{} created, {} skipped, {} failed", counts.created, counts.skipped, counts.errors),
            elapsed_ms(started),
        );

        identifiers
    }
}
