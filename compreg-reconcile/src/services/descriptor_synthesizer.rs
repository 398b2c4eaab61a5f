//! Descriptor synthesis for missing component types
//!
//! Turns a [`MissingComponentReportEntry`] into a [`ComponentDescriptor`] and
//! persists it, unless a descriptor with the derived id already exists.

use crate::models::{ComponentDescriptor, DescriptorMetadata, MissingComponentReportEntry};
use crate::services::naming::{derive_id, derive_name, infer_tags};
use crate::types::RegistryStore;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Descriptor version for everything this pipeline creates
pub const DESCRIPTOR_VERSION: &str = "1.0.0";

/// Recorded as `metadata.generatedBy`
pub const GENERATOR_NAME: &str = "compreg-reconcile";

/// Per-component synthesis errors
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// Type yields no usable id characters
    #[error("Component type '{0}' yields an empty id")]
    EmptyId(String),

    /// Registry store write failed
    #[error("Registry store error: {0}")]
    Store(#[from] compreg_common::Error),
}

/// What happened to one missing component
#[derive(Debug, Clone, PartialEq)]
pub enum SynthesisOutcome {
    /// Written to the registry store
    Created {
        descriptor: ComponentDescriptor,
        path: PathBuf,
    },
    /// Dry run: computed, not written
    Planned { descriptor: ComponentDescriptor },
    /// A descriptor with this id already exists; nothing written. Carries
    /// the descriptor as it would have been built, for artifact generation.
    Skipped { descriptor: ComponentDescriptor },
}

impl SynthesisOutcome {
    pub fn id(&self) -> &str {
        match self {
            SynthesisOutcome::Created { descriptor, .. }
            | SynthesisOutcome::Planned { descriptor }
            | SynthesisOutcome::Skipped { descriptor } => &descriptor.id,
        }
    }
}

/// Builds and persists descriptors
pub struct DescriptorSynthesizer {
    store: Arc<dyn RegistryStore>,
    generated_at: DateTime<Utc>,
    dry_run: bool,
}

impl DescriptorSynthesizer {
    pub fn new(store: Arc<dyn RegistryStore>, generated_at: DateTime<Utc>) -> Self {
        Self {
            store,
            generated_at,
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// The descriptor for an entry, without touching the store
    pub fn build(&self, entry: &MissingComponentReportEntry) -> Result<ComponentDescriptor, SynthesisError> {
        let id = derive_id(&entry.component_type);
        if id.is_empty() {
            return Err(SynthesisError::EmptyId(entry.component_type.clone()));
        }

        let name = derive_name(&entry.component_type);
        let category = entry.recommended_category;
        let properties = entry
            .inferred_properties
            .iter()
            .map(|(key, inferred)| (key.clone(), inferred.spec.clone()))
            .collect();

        Ok(ComponentDescriptor {
            description: format!(
                "{} component, used {} time(s) across {} tenant(s)",
                name, entry.total_usage, entry.tenant_count
            ),
            id,
            name,
            component_type: entry.component_type.clone(),
            category,
            properties,
            editor: entry.recommended_editor,
            version: DESCRIPTOR_VERSION.to_string(),
            tenant_scope: entry.recommended_scope,
            tags: infer_tags(&entry.component_type, category),
            metadata: DescriptorMetadata {
                generated_by: GENERATOR_NAME.to_string(),
                generated_at: self.generated_at,
                usage_count: entry.total_usage,
                tenant_count: entry.tenant_count,
            },
        })
    }

    pub fn synthesize(&self, entry: &MissingComponentReportEntry) -> Result<SynthesisOutcome, SynthesisError> {
        let descriptor = self.build(entry)?;

        if self.store.exists(&descriptor.id) {
            tracing::info!(id = %descriptor.id, component_type = %entry.component_type, "Descriptor exists, skipped");
            return Ok(SynthesisOutcome::Skipped { descriptor });
        }

        if self.dry_run {
            tracing::info!(id = %descriptor.id, "Dry run: descriptor not written");
            return Ok(SynthesisOutcome::Planned { descriptor });
        }

        let path = self.store.write_descriptor(&descriptor.id, &descriptor)?;
        tracing::info!(id = %descriptor.id, path = %path.display(), "Descriptor created");
        Ok(SynthesisOutcome::Created { descriptor, path })
    }
}
