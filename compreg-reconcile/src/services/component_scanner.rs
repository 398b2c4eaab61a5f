//! Multi-tenant component usage scanner
//!
//! Walks every tenant's default-language page layouts and records which
//! component types are placed, how often, on which pages, and with what
//! properties. Tenants are scanned one at a time. A failing tenant is logged
//! and contributes nothing; it never stops the scan.

use crate::models::{
    ComponentUsageInstance, ConnectionProfile, PageLayoutDocument, StepStatus, Tenant, TenantScanReport,
    TenantUsage, UsageAccumulator,
};
use crate::services::credentials::CredentialError;
use crate::types::PageLayoutStore;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;

/// Per-tenant scan errors
#[derive(Debug, Error)]
pub enum ScanError {
    /// No credentials could be resolved for an isolated store
    #[error("Credential resolution failed: {0}")]
    Credentials(#[from] CredentialError),

    /// Could not open a connection to the tenant's store
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Layout query failed
    #[error("Query failed: {0}")]
    Query(String),

    /// The tenant's directory entry has unusable connection fields
    #[error("Tenant misconfigured: {0}")]
    Misconfigured(String),
}

/// Pull component instances out of one layout document
///
/// Returns false when the document has no usable `components` list, in which
/// case it is counted as skipped.
pub fn extract_usage(doc: &PageLayoutDocument, usage: &mut TenantUsage) -> bool {
    let components = match doc.components().and_then(Value::as_array) {
        Some(list) => list,
        None => {
            usage.documents_skipped += 1;
            return false;
        }
    };

    usage.documents_scanned += 1;
    for component in components {
        let component_type = ["type", "id"]
            .iter()
            .filter_map(|key| component.get(*key).and_then(Value::as_str))
            .map(str::trim)
            .find(|t| !t.is_empty());

        let Some(component_type) = component_type else {
            usage.instances_skipped += 1;
            continue;
        };

        let properties = component
            .get("props")
            .or_else(|| component.get("properties"))
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_else(Map::new);

        usage.observe(&doc.page_id, ComponentUsageInstance::new(component_type, properties));
    }
    true
}

/// Scans tenants through a [`PageLayoutStore`]
pub struct ComponentScanner {
    store: Arc<dyn PageLayoutStore>,
}

impl ComponentScanner {
    pub fn new(store: Arc<dyn PageLayoutStore>) -> Self {
        Self { store }
    }

    /// Usage for a single tenant
    pub async fn scan_tenant(&self, tenant: &Tenant) -> Result<TenantUsage, ScanError> {
        if let ConnectionProfile::Misconfigured(reason) = &tenant.connection_profile {
            return Err(ScanError::Misconfigured(reason.clone()));
        }
        let documents = self.store.fetch_layouts(tenant).await?;

        let mut usage = TenantUsage::new(tenant.id.clone());
        for doc in &documents {
            if !extract_usage(doc, &mut usage) {
                tracing::debug!(tenant_id = %tenant.id, page_id = %doc.page_id, "Layout has no component list, skipped");
            }
        }
        Ok(usage)
    }

    /// Scan every tenant (or only those named in `filter`)
    ///
    /// Returns the merged usage and one report per tenant attempted.
    pub async fn scan_all(
        &self,
        tenants: &[Tenant],
        filter: &BTreeSet<String>,
    ) -> (UsageAccumulator, Vec<TenantScanReport>) {
        let mut accumulator = UsageAccumulator::new();
        let mut reports = Vec::with_capacity(tenants.len());

        for tenant in tenants {
            if !filter.is_empty() && !filter.contains(&tenant.id) {
                continue;
            }

            let topology = tenant.connection_profile.kind().to_string();
            match self.scan_tenant(tenant).await {
                Ok(usage) => {
                    tracing::info!(
                        tenant_id = %tenant.id,
                        topology = %topology,
                        documents = usage.documents_scanned,
                        skipped = usage.documents_skipped,
                        instances = usage.instance_count(),
                        "Tenant scanned"
                    );
                    reports.push(TenantScanReport {
                        tenant_id: tenant.id.clone(),
                        topology,
                        status: StepStatus::Success,
                        documents_scanned: usage.documents_scanned,
                        documents_skipped: usage.documents_skipped,
                        instances: usage.instance_count(),
                        component_types: usage.records.len(),
                        error: None,
                    });
                    accumulator = accumulator.merge(usage);
                }
                Err(e) => {
                    tracing::error!(tenant_id = %tenant.id, topology = %topology, error = %e, "Tenant scan failed");
                    reports.push(TenantScanReport {
                        tenant_id: tenant.id.clone(),
                        topology,
                        status: StepStatus::Error,
                        documents_scanned: 0,
                        documents_skipped: 0,
                        instances: 0,
                        component_types: 0,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        (accumulator, reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::BTreeMap;

    /// Layouts by tenant id; tenants not in the map fail
    struct FakeStore(BTreeMap<String, Vec<PageLayoutDocument>>);

    #[async_trait]
    impl PageLayoutStore for FakeStore {
        async fn fetch_layouts(&self, tenant: &Tenant) -> Result<Vec<PageLayoutDocument>, ScanError> {
            self.0
                .get(&tenant.id)
                .cloned()
                .ok_or_else(|| ScanError::Connection(format!("{} unreachable", tenant.id)))
        }
    }

    fn store(entries: Vec<(&str, Vec<PageLayoutDocument>)>) -> Arc<dyn PageLayoutStore> {
        Arc::new(FakeStore(
            entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        ))
    }

    #[test]
    fn test_extract_type_and_props_fallbacks() {
        let doc = PageLayoutDocument::new(
            "home",
            json!({"layout": {"components": [
                {"type": "Hero", "props": {"title": "Hi"}},
                {"id": "Card", "properties": {"n": 1}},
                {"type": "", "id": "Footer", "props": "not-an-object"},
                {"props": {"orphan": true}},
                {"type": 42}
            ]}}),
        );
        let mut usage = TenantUsage::new("t1");

        assert!(extract_usage(&doc, &mut usage));
        assert_eq!(usage.records["Hero"].samples[0].properties["title"], json!("Hi"));
        assert_eq!(usage.records["Card"].samples[0].properties["n"], json!(1));
        assert!(usage.records["Footer"].samples[0].properties.is_empty());
        assert_eq!(usage.instances_skipped, 2);
        assert_eq!(usage.documents_scanned, 1);
    }

    #[test]
    fn test_unusable_documents_are_skipped() {
        let mut usage = TenantUsage::new("t1");
        for layout in [json!({}), json!({"components": "nope"}), json!({"layout": {"components": {}}})] {
            assert!(!extract_usage(&PageLayoutDocument::new("p", layout), &mut usage));
        }
        assert_eq!(usage.documents_skipped, 3);
        assert_eq!(usage.documents_scanned, 0);
        assert!(usage.records.is_empty());
    }

    #[tokio::test]
    async fn test_shared_tenant_three_hero_banners() {
        let docs = vec![
            PageLayoutDocument::new("home", json!({"components": [
                {"type": "HeroBanner", "props": {"title": "A"}},
                {"type": "HeroBanner", "props": {"title": "B"}}
            ]})),
            PageLayoutDocument::new("about", json!({"components": [
                {"type": "HeroBanner", "props": {"title": "C"}}
            ]})),
        ];
        let scanner = ComponentScanner::new(store(vec![("t1", docs)]));

        let (usage, reports) = scanner
            .scan_all(&[Tenant::shared("t1", "One")], &BTreeSet::new())
            .await;

        let hero = usage.get("HeroBanner").unwrap();
        assert_eq!(hero.total_count, 3);
        assert_eq!(hero.tenant_count(), 1);
        assert_eq!(hero.page_count, 2);
        assert!(hero.samples.len() <= 3);
        assert_eq!(reports[0].status, StepStatus::Success);
        assert_eq!(reports[0].instances, 3);
    }

    #[tokio::test]
    async fn test_failing_tenant_is_isolated() {
        let docs = vec![PageLayoutDocument::new("home", json!({"components": [{"type": "Card"}]}))];
        let scanner = ComponentScanner::new(store(vec![("ok", docs)]));
        let tenants = vec![Tenant::shared("broken", "Broken"), Tenant::shared("ok", "Ok")];

        let (usage, reports) = scanner.scan_all(&tenants, &BTreeSet::new()).await;

        assert_eq!(usage.get("Card").unwrap().total_count, 1);
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].status, StepStatus::Error);
        assert!(reports[0].error.as_deref().unwrap().contains("unreachable"));
        assert_eq!(reports[1].status, StepStatus::Success);
    }

    #[tokio::test]
    async fn test_misconfigured_tenant_fails_without_store_access() {
        let docs = vec![PageLayoutDocument::new("home", json!({"components": [{"type": "Card"}]}))];
        let scanner = ComponentScanner::new(store(vec![("bad", docs.clone()), ("ok", docs)]));
        let bad = Tenant {
            id: "bad".to_string(),
            name: "Bad".to_string(),
            connection_profile: ConnectionProfile::Misconfigured("db_port 70000 out of range".to_string()),
        };

        let (usage, reports) = scanner
            .scan_all(&[bad, Tenant::shared("ok", "Ok")], &BTreeSet::new())
            .await;

        assert_eq!(reports[0].status, StepStatus::Error);
        assert_eq!(reports[0].topology, "misconfigured");
        assert!(reports[0].error.as_deref().unwrap().contains("70000"));
        assert_eq!(usage.get("Card").unwrap().tenant_ids, BTreeSet::from(["ok".to_string()]));
    }

    #[tokio::test]
    async fn test_tenant_filter() {
        let card = || vec![PageLayoutDocument::new("p", json!({"components": [{"type": "Card"}]}))];
        let scanner = ComponentScanner::new(store(vec![("a", card()), ("b", card())]));
        let tenants = vec![Tenant::shared("a", "A"), Tenant::shared("b", "B")];
        let filter = BTreeSet::from(["b".to_string()]);

        let (usage, reports) = scanner.scan_all(&tenants, &filter).await;

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].tenant_id, "b");
        assert_eq!(usage.get("Card").unwrap().tenant_ids, BTreeSet::from(["b".to_string()]));
    }
}
