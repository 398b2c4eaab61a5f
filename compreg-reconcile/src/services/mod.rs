//! Service modules for the reconciliation pipeline
//!
//! Read side: scanning, registry loading, diffing and schema inference.
//! Write side: descriptor synthesis, artifact generation, index patching and
//! run reports. The orchestrator runs them in order.

pub mod artifact_generator;
pub mod component_scanner;
pub mod credentials;
pub mod descriptor_synthesizer;
pub mod diff_engine;
pub mod naming;
pub mod pipeline_orchestrator;
pub mod registry_loader;
pub mod registry_patcher;
pub mod report_writer;
pub mod schema_inferencer;

pub use artifact_generator::{ArtifactGenerator, GenerationOutcome};
pub use component_scanner::{ComponentScanner, ScanError};
pub use credentials::{CredentialChain, CredentialError, CredentialResolver, ResolvedCredentials};
pub use descriptor_synthesizer::{DescriptorSynthesizer, SynthesisError, SynthesisOutcome};
pub use diff_engine::{DiffResult, UsageRegistryDiffEngine};
pub use pipeline_orchestrator::{PipelineOrchestrator, RunOptions};
pub use registry_loader::{RegistryIndex, RegistryLoader};
pub use registry_patcher::{PatchError, RegistryPatcher};
pub use report_writer::{ReportPaths, ReportWriter};
pub use schema_inferencer::SchemaInferencer;
