//! Canonical registry loading
//!
//! Reads every descriptor record once and builds three indices. The diff
//! engine only ever asks the resulting [`RegistryIndex`]; it never goes back
//! to the store.

use crate::types::RegistryStore;
use compreg_common::Result;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Category bucket for records that don't declare one
pub const UNCATEGORIZED: &str = "uncategorized";

/// The parts of a descriptor record the pipeline relies on
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryEntry {
    pub id: String,
    pub component_type: String,
    pub category: String,
    pub location: String,
}

/// In-memory indices over the canonical registry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistryIndex {
    pub by_id: BTreeMap<String, RegistryEntry>,
    pub by_type: BTreeMap<String, Vec<String>>,
    pub by_category: BTreeMap<String, Vec<String>>,
    /// One message per excluded record
    pub warnings: Vec<String>,
}

impl RegistryIndex {
    pub fn has_type(&self, component_type: &str) -> bool {
        self.by_type.contains_key(component_type)
    }

    pub fn all_types(&self) -> BTreeSet<&str> {
        self.by_type.keys().map(String::as_str).collect()
    }

    pub fn ids_for_type(&self, component_type: &str) -> &[String] {
        self.by_type
            .get(component_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    fn insert(&mut self, entry: RegistryEntry) {
        self.by_type
            .entry(entry.component_type.clone())
            .or_default()
            .push(entry.id.clone());
        self.by_category
            .entry(entry.category.clone())
            .or_default()
            .push(entry.id.clone());
        self.by_id.insert(entry.id.clone(), entry);
    }
}

/// Loads the registry store into a [`RegistryIndex`]
pub struct RegistryLoader<'a> {
    store: &'a dyn RegistryStore,
}

impl<'a> RegistryLoader<'a> {
    pub fn new(store: &'a dyn RegistryStore) -> Self {
        Self { store }
    }

    /// Read all records; malformed ones are excluded with a warning
    pub fn load_all(&self) -> Result<RegistryIndex> {
        let mut index = RegistryIndex::default();

        for raw in self.store.list_descriptors()? {
            let body = match raw.body {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!(location = %raw.location, error = %e, "Unparseable descriptor, excluded");
                    index.warnings.push(format!("{}: unparseable descriptor ({})", raw.location, e));
                    continue;
                }
            };

            let id = non_empty_str(&body, "id");
            let component_type = non_empty_str(&body, "type");
            let (id, component_type) = match (id, component_type) {
                (Some(id), Some(t)) => (id, t),
                (id, t) => {
                    let missing = match (id, t) {
                        (None, None) => "id and type",
                        (None, _) => "id",
                        _ => "type",
                    };
                    tracing::warn!(location = %raw.location, missing, "Descriptor missing required field, excluded");
                    index
                        .warnings
                        .push(format!("{}: descriptor missing {}", raw.location, missing));
                    continue;
                }
            };

            if index.by_id.contains_key(&id) {
                tracing::warn!(location = %raw.location, id = %id, "Duplicate descriptor id, excluded");
                index
                    .warnings
                    .push(format!("{}: duplicate descriptor id '{}'", raw.location, id));
                continue;
            }

            let category = non_empty_str(&body, "category").unwrap_or_else(|| UNCATEGORIZED.to_string());
            index.insert(RegistryEntry {
                id,
                component_type,
                category,
                location: raw.location,
            });
        }

        tracing::info!(
            descriptors = index.len(),
            types = index.by_type.len(),
            excluded = index.warnings.len(),
            "Registry loaded"
        );

        Ok(index)
    }
}

fn non_empty_str(body: &Value, field: &str) -> Option<String> {
    body.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
