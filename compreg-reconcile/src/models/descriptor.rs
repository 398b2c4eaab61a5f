//! Registry descriptor records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Primitive kind of a component property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    String,
    Number,
    Boolean,
    Array,
    Object,
    /// Anything a hand-written descriptor declares that we don't model
    #[serde(other)]
    Unknown,
}

impl PropertyKind {
    /// Kind of a runtime JSON value; `null` falls back to `string`
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Array(_) => PropertyKind::Array,
            Value::Object(_) => PropertyKind::Object,
            Value::Bool(_) => PropertyKind::Boolean,
            Value::Number(_) => PropertyKind::Number,
            Value::String(_) | Value::Null => PropertyKind::String,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyKind::String => "string",
            PropertyKind::Number => "number",
            PropertyKind::Boolean => "boolean",
            PropertyKind::Array => "array",
            PropertyKind::Object => "object",
            PropertyKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Property schema entry inside a descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySpec {
    #[serde(rename = "type")]
    pub kind: PropertyKind,
    pub description: String,
    pub editable: bool,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

/// Inference result for one property: the `PropertySpec` plus every kind observed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InferredProperty {
    #[serde(flatten)]
    pub spec: PropertySpec,
    /// One entry per observed value, in observation order
    pub observed_kinds: Vec<PropertyKind>,
}

impl InferredProperty {
    /// True when samples disagreed about the kind
    pub fn is_polymorphic(&self) -> bool {
        self.observed_kinds.iter().any(|k| *k != self.spec.kind)
    }
}

/// Registry category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Layout,
    Content,
    Interactive,
    Media,
    Form,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Layout => "layout",
            Category::Content => "content",
            Category::Interactive => "interactive",
            Category::Media => "media",
            Category::Form => "form",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Editor widget the registry UI uses for a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EditorKind {
    ImageEditor,
    VideoEditor,
    ButtonEditor,
    LinkEditor,
    InputEditor,
    TextEditor,
    ContainerEditor,
}

impl EditorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditorKind::ImageEditor => "ImageEditor",
            EditorKind::VideoEditor => "VideoEditor",
            EditorKind::ButtonEditor => "ButtonEditor",
            EditorKind::LinkEditor => "LinkEditor",
            EditorKind::InputEditor => "InputEditor",
            EditorKind::TextEditor => "TextEditor",
            EditorKind::ContainerEditor => "ContainerEditor",
        }
    }
}

impl fmt::Display for EditorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visibility of a descriptor across tenants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TenantScope {
    Global,
    Tenant,
}

impl TenantScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            TenantScope::Global => "global",
            TenantScope::Tenant => "tenant",
        }
    }

    pub fn for_tenant_count(tenant_count: usize) -> Self {
        if tenant_count > 1 {
            TenantScope::Global
        } else {
            TenantScope::Tenant
        }
    }
}

/// Provenance of a generated descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptorMetadata {
    pub generated_by: String,
    pub generated_at: DateTime<Utc>,
    pub usage_count: usize,
    pub tenant_count: usize,
}

/// Canonical registry record for a component type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDescriptor {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub component_type: String,
    pub category: Category,
    pub properties: BTreeMap<String, PropertySpec>,
    pub editor: EditorKind,
    pub version: String,
    pub tenant_scope: TenantScope,
    pub tags: Vec<String>,
    pub description: String,
    pub metadata: DescriptorMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_of_values() {
        assert_eq!(PropertyKind::of(&json!("x")), PropertyKind::String);
        assert_eq!(PropertyKind::of(&json!(null)), PropertyKind::String);
        assert_eq!(PropertyKind::of(&json!(1.5)), PropertyKind::Number);
        assert_eq!(PropertyKind::of(&json!(true)), PropertyKind::Boolean);
        assert_eq!(PropertyKind::of(&json!([1])), PropertyKind::Array);
        assert_eq!(PropertyKind::of(&json!({"a": 1})), PropertyKind::Object);
    }

    #[test]
    fn test_unknown_kind_deserializes() {
        let spec: PropertySpec = serde_json::from_value(json!({
            "type": "richtext",
            "description": "Body",
            "editable": true,
            "required": false
        }))
        .unwrap();
        assert_eq!(spec.kind, PropertyKind::Unknown);
        assert!(spec.default.is_none());
    }

    #[test]
    fn test_property_spec_omits_absent_default() {
        let spec = PropertySpec {
            kind: PropertyKind::Array,
            description: "Items (array)".to_string(),
            editable: true,
            required: false,
            default: None,
        };
        let value = serde_json::to_value(&spec).unwrap();
        assert_eq!(value["type"], json!("array"));
        assert!(value.get("default").is_none());
    }

    #[test]
    fn test_tenant_scope_threshold() {
        assert_eq!(TenantScope::for_tenant_count(0), TenantScope::Tenant);
        assert_eq!(TenantScope::for_tenant_count(1), TenantScope::Tenant);
        assert_eq!(TenantScope::for_tenant_count(2), TenantScope::Global);
    }

    #[test]
    fn test_editor_serializes_as_name() {
        assert_eq!(
            serde_json::to_value(EditorKind::ButtonEditor).unwrap(),
            json!("ButtonEditor")
        );
    }
}
