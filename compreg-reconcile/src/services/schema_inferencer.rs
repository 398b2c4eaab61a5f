//! Property schema inference from usage samples
//!
//! The kind of the first observed value for a property is canonical. Later
//! samples that disagree are kept in `observed_kinds` (and surface as
//! polymorphic properties in the report) but never change the kind.
//! Requiredness is never inferred.

use crate::models::{ComponentUsageInstance, InferredProperty, PropertyKind, PropertySpec};
use crate::services::naming::derive_name;
use serde_json::Value;
use std::collections::BTreeMap;

/// Infers a property schema from bounded usage samples
#[derive(Debug, Default, Clone)]
pub struct SchemaInferencer;

impl SchemaInferencer {
    pub fn new() -> Self {
        Self
    }

    /// Schema for every property key seen in any sample
    pub fn infer(&self, samples: &[ComponentUsageInstance]) -> BTreeMap<String, InferredProperty> {
        let mut observed: BTreeMap<String, Vec<&Value>> = BTreeMap::new();
        for sample in samples {
            for (key, value) in &sample.properties {
                observed.entry(key.clone()).or_default().push(value);
            }
        }

        observed
            .into_iter()
            .filter_map(|(key, values)| {
                let first = *values.first()?;
                let kind = PropertyKind::of(first);
                let property = InferredProperty {
                    spec: PropertySpec {
                        kind,
                        description: format!("{} ({})", derive_name(&key), kind),
                        editable: true,
                        required: false,
                        default: default_value(first),
                    },
                    observed_kinds: values.iter().map(|v| PropertyKind::of(v)).collect(),
                };
                Some((key, property))
            })
            .collect()
    }
}

/// Scalars and empty collections make usable defaults; anything structured is
/// dropped, as is `null`
fn default_value(value: &Value) -> Option<Value> {
    match value {
        Value::String(_) | Value::Number(_) | Value::Bool(_) => Some(value.clone()),
        Value::Array(items) if items.is_empty() => Some(value.clone()),
        Value::Object(map) if map.is_empty() => Some(value.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn sample(props: Value) -> ComponentUsageInstance {
        let properties: Map<String, Value> = props.as_object().cloned().unwrap_or_default();
        ComponentUsageInstance::new("Widget", properties)
    }

    #[test]
    fn test_first_observed_kind_wins() {
        let samples = vec![
            sample(json!({"items": [1, 2]})),
            sample(json!({"items": "a,b"})),
        ];

        let schema = SchemaInferencer::new().infer(&samples);
        let items = &schema["items"];

        assert_eq!(items.spec.kind, PropertyKind::Array);
        assert_eq!(items.observed_kinds, vec![PropertyKind::Array, PropertyKind::String]);
        assert!(items.is_polymorphic());
    }

    #[test]
    fn test_defaults_policy() {
        let samples = vec![sample(json!({
            "title": "Welcome",
            "count": 3,
            "visible": true,
            "tags": [],
            "style": {},
            "links": [{"href": "/"}],
            "theme": {"color": "red"},
            "subtitle": null
        }))];

        let schema = SchemaInferencer::new().infer(&samples);

        assert_eq!(schema["title"].spec.default, Some(json!("Welcome")));
        assert_eq!(schema["count"].spec.default, Some(json!(3)));
        assert_eq!(schema["visible"].spec.default, Some(json!(true)));
        assert_eq!(schema["tags"].spec.default, Some(json!([])));
        assert_eq!(schema["style"].spec.default, Some(json!({})));
        assert_eq!(schema["links"].spec.default, None);
        assert_eq!(schema["theme"].spec.default, None);
        assert_eq!(schema["subtitle"].spec.default, None);
        assert_eq!(schema["subtitle"].spec.kind, PropertyKind::String);
    }

    #[test]
    fn test_editable_and_never_required() {
        let samples = vec![sample(json!({"title": "A"})), sample(json!({"title": "B"}))];
        let schema = SchemaInferencer::new().infer(&samples);

        let title = &schema["title"].spec;
        assert!(title.editable);
        assert!(!title.required);
        assert_eq!(title.description, "Title (string)");
        assert!(!schema["title"].is_polymorphic());
    }

    #[test]
    fn test_keys_union_across_samples() {
        let samples = vec![sample(json!({"a": 1})), sample(json!({"b": "x"})), sample(json!({}))];
        let schema = SchemaInferencer::new().infer(&samples);

        assert_eq!(schema.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(schema["a"].observed_kinds.len(), 1);
    }

    #[test]
    fn test_no_samples_no_properties() {
        assert!(SchemaInferencer::new().infer(&[]).is_empty());
    }
}
