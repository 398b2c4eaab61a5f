//! Component usage records
//!
//! Usage is collected per tenant into a [`TenantUsage`], then folded into the
//! pipeline-wide [`UsageAccumulator`]. The accumulator is a plain value passed
//! through the scan loop and returned; nothing else mutates it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Samples kept per component type within one tenant
pub const TENANT_SAMPLE_LIMIT: usize = 3;

/// Samples kept per component type across all tenants
pub const MERGED_SAMPLE_LIMIT: usize = 5;

/// One stored page layout (default language)
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayoutDocument {
    pub page_id: String,
    /// Layout JSON: `{"components": [...]}`, or wrapped as `{"layout": {...}}`
    pub layout: Value,
}

impl PageLayoutDocument {
    pub fn new(page_id: impl Into<String>, layout: Value) -> Self {
        Self {
            page_id: page_id.into(),
            layout,
        }
    }

    /// The `components` value, wherever the layout keeps it
    pub fn components(&self) -> Option<&Value> {
        self.layout
            .get("components")
            .or_else(|| self.layout.get("layout").and_then(|l| l.get("components")))
    }
}

/// A single component placed on a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentUsageInstance {
    pub component_type: String,
    pub properties: Map<String, Value>,
}

impl ComponentUsageInstance {
    pub fn new(component_type: impl Into<String>, properties: Map<String, Value>) -> Self {
        Self {
            component_type: component_type.into(),
            properties,
        }
    }
}

/// Usage of one component type within one tenant
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentUsageRecord {
    pub component_type: String,
    pub count: usize,
    pub samples: Vec<ComponentUsageInstance>,
    pub pages: BTreeSet<String>,
}

impl ComponentUsageRecord {
    pub fn new(component_type: impl Into<String>) -> Self {
        Self {
            component_type: component_type.into(),
            count: 0,
            samples: Vec::new(),
            pages: BTreeSet::new(),
        }
    }

    pub fn observe(&mut self, page_id: &str, instance: ComponentUsageInstance) {
        self.count += 1;
        self.pages.insert(page_id.to_string());
        if self.samples.len() < TENANT_SAMPLE_LIMIT {
            self.samples.push(instance);
        }
    }
}

/// Everything one tenant contributed to the scan
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TenantUsage {
    pub tenant_id: String,
    pub records: BTreeMap<String, ComponentUsageRecord>,
    pub documents_scanned: usize,
    pub documents_skipped: usize,
    pub instances_skipped: usize,
}

impl TenantUsage {
    pub fn new(tenant_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            ..Default::default()
        }
    }

    pub fn observe(&mut self, page_id: &str, instance: ComponentUsageInstance) {
        self.records
            .entry(instance.component_type.clone())
            .or_insert_with(|| ComponentUsageRecord::new(instance.component_type.clone()))
            .observe(page_id, instance);
    }

    pub fn instance_count(&self) -> usize {
        self.records.values().map(|r| r.count).sum()
    }
}

/// Usage of one component type across all tenants
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedUsage {
    pub component_type: String,
    pub total_count: usize,
    pub tenant_ids: BTreeSet<String>,
    pub samples: Vec<ComponentUsageInstance>,
    pub page_count: usize,
}

impl AggregatedUsage {
    fn new(component_type: &str) -> Self {
        Self {
            component_type: component_type.to_string(),
            total_count: 0,
            tenant_ids: BTreeSet::new(),
            samples: Vec::new(),
            page_count: 0,
        }
    }

    pub fn tenant_count(&self) -> usize {
        self.tenant_ids.len()
    }

    fn absorb(&mut self, tenant_id: &str, record: ComponentUsageRecord) {
        self.total_count += record.count;
        self.tenant_ids.insert(tenant_id.to_string());
        // Pages are tenant-scoped, so per-tenant distinct counts add up
        self.page_count += record.pages.len();
        let room = MERGED_SAMPLE_LIMIT.saturating_sub(self.samples.len());
        self.samples.extend(record.samples.into_iter().take(room));
    }
}

/// Pipeline-wide usage, keyed by component type
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsageAccumulator {
    by_type: BTreeMap<String, AggregatedUsage>,
}

impl UsageAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one tenant's records in and hand the accumulator back
    pub fn merge(mut self, usage: TenantUsage) -> Self {
        let tenant_id = usage.tenant_id;
        for (component_type, record) in usage.records {
            if record.count == 0 {
                continue;
            }
            self.by_type
                .entry(component_type)
                .or_insert_with_key(|t| AggregatedUsage::new(t))
                .absorb(&tenant_id, record);
        }
        self
    }

    pub fn get(&self, component_type: &str) -> Option<&AggregatedUsage> {
        self.by_type.get(component_type)
    }

    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.by_type.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AggregatedUsage> {
        self.by_type.values()
    }

    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn instance(component_type: &str, n: i64) -> ComponentUsageInstance {
        let mut props = Map::new();
        props.insert("n".to_string(), json!(n));
        ComponentUsageInstance::new(component_type, props)
    }

    #[test]
    fn test_record_caps_samples_not_count() {
        let mut record = ComponentUsageRecord::new("Card");
        for n in 0..10 {
            record.observe("home", instance("Card", n));
        }

        assert_eq!(record.count, 10);
        assert_eq!(record.samples.len(), TENANT_SAMPLE_LIMIT);
        assert_eq!(record.pages.len(), 1);
        // First observations are the ones kept
        assert_eq!(record.samples[0].properties["n"], json!(0));
    }

    #[test]
    fn test_merge_caps_cross_tenant_samples() {
        let mut acc = UsageAccumulator::new();
        for t in 0..4 {
            let mut usage = TenantUsage::new(format!("t{}", t));
            for n in 0..5 {
                usage.observe(&format!("page-{}", n), instance("Card", n));
            }
            acc = acc.merge(usage);
        }

        let card = acc.get("Card").unwrap();
        assert_eq!(card.total_count, 20);
        assert_eq!(card.tenant_count(), 4);
        assert_eq!(card.samples.len(), MERGED_SAMPLE_LIMIT);
        assert_eq!(card.page_count, 20);
    }

    #[test]
    fn test_merge_same_tenant_twice_keeps_set_semantics() {
        let mut first = TenantUsage::new("t1");
        first.observe("home", instance("Hero", 1));
        let mut second = TenantUsage::new("t1");
        second.observe("about", instance("Hero", 2));

        let acc = UsageAccumulator::new().merge(first).merge(second);
        let hero = acc.get("Hero").unwrap();

        assert_eq!(hero.tenant_ids.len(), 1);
        assert_eq!(hero.total_count, 2);
    }

    #[test]
    fn test_components_accessor_accepts_wrapped_layout() {
        let plain = PageLayoutDocument::new("p", json!({"components": []}));
        let wrapped = PageLayoutDocument::new("p", json!({"layout": {"components": []}}));
        let none = PageLayoutDocument::new("p", json!({"sections": []}));

        assert!(plain.components().is_some());
        assert!(wrapped.components().is_some());
        assert!(none.components().is_none());
    }
}
