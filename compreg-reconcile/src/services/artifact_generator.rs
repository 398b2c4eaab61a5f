//! UI component source generation
//!
//! Produces one self-contained TSX file per descriptor: React import, props
//! interface, the component, and a default export. The render body comes
//! from [`RENDER_RULES`]; each property is claimed by the first rule that
//! matches it and blocks are emitted in rule order.

use crate::models::{ComponentDescriptor, PropertyKind, PropertySpec};
use crate::services::naming::studly_case;
use crate::types::ArtifactStore;
use compreg_common::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("valid identifier regex"));

/// Outcome of generating one artifact
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Created { identifier: String, path: PathBuf },
    /// Target file already exists; left as is
    Skipped { identifier: String, path: PathBuf },
}

impl GenerationOutcome {
    pub fn identifier(&self) -> &str {
        match self {
            GenerationOutcome::Created { identifier, .. } | GenerationOutcome::Skipped { identifier, .. } => {
                identifier
            }
        }
    }
}

// ============================================================================
// Render rules
// ============================================================================

/// A property as seen by the render rules
struct PropertyRef<'a> {
    /// Lower-cased name, for keyword matching
    lower: String,
    /// `props.title` or `props["data-id"]`
    accessor: String,
    spec: &'a PropertySpec,
}

struct RenderRule {
    matches: fn(&PropertyRef) -> bool,
    render: fn(&PropertyRef, &str) -> String,
}

fn name_has(p: &PropertyRef, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| p.lower.contains(k))
}

/// Text content for JSX; non-text kinds go through `String()`
fn text(p: &PropertyRef) -> String {
    match p.spec.kind {
        PropertyKind::String | PropertyKind::Number => format!("{{{}}}", p.accessor),
        _ => format!("{{String({} ?? '')}}", p.accessor),
    }
}

const RENDER_RULES: &[RenderRule] = &[
    RenderRule {
        matches: |p| name_has(p, &["title", "heading", "headline"]),
        render: |p, _| format!("{{{} && <h2>{}</h2>}}", p.accessor, text(p)),
    },
    RenderRule {
        matches: |p| name_has(p, &["description", "text", "content"]),
        render: |p, _| format!("{{{} && <p>{}</p>}}", p.accessor, text(p)),
    },
    RenderRule {
        matches: |p| name_has(p, &["image", "img"]),
        render: |p, _| format!("{{{0} && <img src={{String({0})}} alt=\"\" />}}", p.accessor),
    },
    RenderRule {
        matches: |p| name_has(p, &["button", "cta"]),
        render: |p, _| format!("{{{} && <button type=\"button\">{}</button>}}", p.accessor, text(p)),
    },
    RenderRule {
        matches: |p| p.spec.kind == PropertyKind::Array,
        render: |p, class| {
            format!(
                "<div className=\"{class}__grid\">\n\
                 {{({acc} ?? []).map((item, index) => (\n\
                 \x20 <div key={{index}} className=\"{class}__item\">{{JSON.stringify(item)}}</div>\n\
                 ))}}\n\
                 </div>",
                class = class,
                acc = p.accessor
            )
        },
    },
];

fn ts_type(kind: PropertyKind) -> &'static str {
    match kind {
        PropertyKind::String => "string",
        PropertyKind::Number => "number",
        PropertyKind::Boolean => "boolean",
        PropertyKind::Array => "unknown[]",
        PropertyKind::Object => "Record<string, unknown>",
        PropertyKind::Unknown => "unknown",
    }
}

fn quoted(name: &str) -> String {
    serde_json::to_string(name).unwrap_or_else(|_| format!("\"{}\"", name))
}

fn indent(block: &str, spaces: usize) -> String {
    let pad = " ".repeat(spaces);
    block
        .lines()
        .map(|line| format!("{}{}", pad, line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Full TSX source for a descriptor
pub fn render_source(descriptor: &ComponentDescriptor) -> String {
    let identifier = studly_case(&descriptor.id);
    let class = &descriptor.id;

    let properties: Vec<(&String, PropertyRef)> = descriptor
        .properties
        .iter()
        .map(|(name, spec)| {
            let accessor = if IDENTIFIER.is_match(name) {
                format!("props.{}", name)
            } else {
                format!("props[{}]", quoted(name))
            };
            let prop = PropertyRef {
                lower: name.to_lowercase(),
                accessor,
                spec,
            };
            (name, prop)
        })
        .collect();

    let mut out = String::new();
    let _ = writeln!(out, "import React from 'react';");
    let _ = writeln!(out);

    let _ = writeln!(out, "export interface {}Props {{", identifier);
    for (name, prop) in &properties {
        let key = if IDENTIFIER.is_match(name) {
            name.to_string()
        } else {
            quoted(name)
        };
        let optional = if prop.spec.required { "" } else { "?" };
        let _ = writeln!(out, "  {}{}: {};", key, optional, ts_type(prop.spec.kind));
    }
    let _ = writeln!(out, "}}");
    let _ = writeln!(out);

    // Bucket by first matching rule, then emit in rule order
    let mut buckets: Vec<Vec<String>> = vec![Vec::new(); RENDER_RULES.len()];
    for (_, prop) in &properties {
        if let Some(i) = RENDER_RULES.iter().position(|rule| (rule.matches)(prop)) {
            buckets[i].push((RENDER_RULES[i].render)(prop, class));
        }
    }
    let mut blocks: Vec<String> = buckets.into_iter().flatten().collect();
    if properties.is_empty() {
        // Name is a quoted string expression, never raw JSX text
        blocks.push(format!(
            "<div className=\"{}__placeholder\">{{{}}}</div>",
            class,
            quoted(&descriptor.name)
        ));
    }

    let _ = writeln!(out, "export function {0}(props: {0}Props) {{", identifier);
    let _ = writeln!(out, "  return (");
    let _ = writeln!(out, "    <div className=\"{}\">", class);
    for block in &blocks {
        let _ = writeln!(out, "{}", indent(block, 6));
    }
    let _ = writeln!(out, "    </div>");
    let _ = writeln!(out, "  );");
    let _ = writeln!(out, "}}");
    let _ = writeln!(out);
    let _ = writeln!(out, "export default {};", identifier);
    out
}

// ============================================================================
// Generator
// ============================================================================

/// Writes component sources through an [`ArtifactStore`]
pub struct ArtifactGenerator {
    store: Arc<dyn ArtifactStore>,
}

impl ArtifactGenerator {
    pub fn new(store: Arc<dyn ArtifactStore>) -> Self {
        Self { store }
    }

    pub fn generate(&self, descriptor: &ComponentDescriptor) -> Result<GenerationOutcome> {
        let identifier = studly_case(&descriptor.id);
        let path = self.store.artifact_path(&identifier);

        if self.store.exists(&path) {
            tracing::info!(identifier = %identifier, path = %path.display(), "Artifact exists, skipped");
            return Ok(GenerationOutcome::Skipped { identifier, path });
        }

        self.store.write(&path, &render_source(descriptor))?;
        tracing::info!(identifier = %identifier, path = %path.display(), "Artifact created");
        Ok(GenerationOutcome::Created { identifier, path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, DescriptorMetadata, EditorKind, TenantScope};
    use crate::storage::FsArtifactStore;
    use chrono::Utc;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn spec(kind: PropertyKind) -> PropertySpec {
        PropertySpec {
            kind,
            description: String::new(),
            editable: true,
            required: false,
            default: None,
        }
    }

    fn descriptor(id: &str, props: &[(&str, PropertyKind)]) -> ComponentDescriptor {
        ComponentDescriptor {
            id: id.to_string(),
            name: "Hero Banner".to_string(),
            component_type: "HeroBanner".to_string(),
            category: Category::Content,
            properties: props
                .iter()
                .map(|(n, k)| (n.to_string(), spec(*k)))
                .collect::<BTreeMap<_, _>>(),
            editor: EditorKind::ContainerEditor,
            version: "1.0.0".to_string(),
            tenant_scope: TenantScope::Tenant,
            tags: vec![],
            description: String::new(),
            metadata: DescriptorMetadata {
                generated_by: "test".to_string(),
                generated_at: Utc::now(),
                usage_count: 1,
                tenant_count: 1,
            },
        }
    }

    #[test]
    fn test_source_structure() {
        let source = render_source(&descriptor(
            "hero-banner",
            &[("title", PropertyKind::String), ("count", PropertyKind::Number)],
        ));

        assert!(source.starts_with("import React from 'react';\n"));
        assert!(source.contains("export interface HeroBannerProps {"));
        assert!(source.contains("  title?: string;"));
        assert!(source.contains("  count?: number;"));
        assert!(source.contains("export function HeroBanner(props: HeroBannerProps) {"));
        assert!(source.trim_end().ends_with("export default HeroBanner;"));
    }

    #[test]
    fn test_prop_type_mapping_and_quoting() {
        let source = render_source(&descriptor(
            "widget",
            &[
                ("items", PropertyKind::Array),
                ("style", PropertyKind::Object),
                ("visible", PropertyKind::Boolean),
                ("data-id", PropertyKind::String),
                ("odd", PropertyKind::Unknown),
            ],
        ));

        assert!(source.contains("  items?: unknown[];"));
        assert!(source.contains("  style?: Record<string, unknown>;"));
        assert!(source.contains("  visible?: boolean;"));
        assert!(source.contains("  \"data-id\"?: string;"));
        assert!(source.contains("  odd?: unknown;"));
    }

    #[test]
    fn test_blocks_follow_rule_priority() {
        // BTreeMap order is alphabetical; rule order must win
        let source = render_source(&descriptor(
            "promo",
            &[
                ("ctaLabel", PropertyKind::String),
                ("heroImage", PropertyKind::String),
                ("subtitle", PropertyKind::String),
                ("bodyText", PropertyKind::String),
                ("slides", PropertyKind::Array),
                ("padding", PropertyKind::Number),
            ],
        ));

        let heading = source.find("<h2>{props.subtitle}</h2>").unwrap();
        let paragraph = source.find("<p>{props.bodyText}</p>").unwrap();
        let image = source.find("<img src={String(props.heroImage)}").unwrap();
        let button = source.find("<button type=\"button\">{props.ctaLabel}</button>").unwrap();
        let grid = source.find("promo__grid").unwrap();

        assert!(heading < paragraph && paragraph < image && image < button && button < grid);
        assert!(!source.contains("{props.padding"));
    }

    #[test]
    fn test_no_properties_placeholder() {
        let source = render_source(&descriptor("spacer", &[]));
        assert!(source.contains("<div className=\"spacer__placeholder\">{\"Hero Banner\"}</div>"));
        assert!(source.contains("export interface SpacerProps {\n}"));
    }

    #[test]
    fn test_placeholder_name_is_string_literal() {
        let mut spacer = descriptor("spacer", &[]);
        spacer.name = "A {b} <c> \"d\"".to_string();
        let source = render_source(&spacer);

        assert!(source.contains(
            "<div className=\"spacer__placeholder\">{\"A {b} <c> \\\"d\\\"\"}</div>"
        ));
        assert!(!source.contains(">A {b}"));
    }

    #[test]
    fn test_digit_leading_identifier() {
        let source = render_source(&descriptor("3d-card", &[]));
        assert!(source.contains("export function Component3dCard("));
    }

    #[test]
    fn test_generate_skips_existing() {
        let temp_dir = TempDir::new().unwrap();
        let generator = ArtifactGenerator::new(Arc::new(FsArtifactStore::new(temp_dir.path())));
        let d = descriptor("hero-banner", &[("title", PropertyKind::String)]);

        let first = generator.generate(&d).unwrap();
        assert!(matches!(first, GenerationOutcome::Created { .. }));
        let written = std::fs::read_to_string(temp_dir.path().join("HeroBanner.tsx")).unwrap();

        let second = generator.generate(&d).unwrap();
        assert!(matches!(second, GenerationOutcome::Skipped { .. }));
        assert_eq!(second.identifier(), "HeroBanner");
        assert_eq!(
            std::fs::read_to_string(temp_dir.path().join("HeroBanner.tsx")).unwrap(),
            written
        );
    }
}
