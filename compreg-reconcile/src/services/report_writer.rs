//! Run report persistence
//!
//! Each run leaves `component-analysis-<stamp>.json` (the serialized
//! [`RunSummary`]) and a markdown summary beside it. Existing reports are
//! never overwritten; a name collision gets a numeric suffix.

use crate::models::{RunSummary, StepStatus};
use crate::storage::write_new_file;
use compreg_common::time::file_stamp;
use compreg_common::Result;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

const REPORT_PREFIX: &str = "component-analysis";

/// Where a run's reports ended up
#[derive(Debug, Clone, PartialEq)]
pub struct ReportPaths {
    pub json: PathBuf,
    pub markdown: PathBuf,
}

/// Writes run reports into one directory
#[derive(Debug, Clone)]
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// First `<prefix>-<stamp>[-n]` with neither file present
    fn free_paths(&self, stamp: &str) -> ReportPaths {
        let mut n = 0usize;
        loop {
            let base = if n == 0 {
                format!("{}-{}", REPORT_PREFIX, stamp)
            } else {
                format!("{}-{}-{}", REPORT_PREFIX, stamp, n)
            };
            let paths = ReportPaths {
                json: self.dir.join(format!("{}.json", base)),
                markdown: self.dir.join(format!("{}.md", base)),
            };
            if !paths.json.exists() && !paths.markdown.exists() {
                return paths;
            }
            n += 1;
        }
    }

    pub fn write(&self, summary: &RunSummary) -> Result<ReportPaths> {
        std::fs::create_dir_all(&self.dir)?;

        let paths = self.free_paths(&file_stamp(&summary.timestamp));
        let mut json = serde_json::to_string_pretty(summary)?;
        json.push('\n');

        write_new_file(&paths.json, &json)?;
        write_new_file(&paths.markdown, &render_markdown(summary))?;

        tracing::info!(
            json = %paths.json.display(),
            markdown = %paths.markdown.display(),
            "Run reports written"
        );
        Ok(paths)
    }
}

fn status_label(status: StepStatus) -> &'static str {
    match status {
        StepStatus::Success => "success",
        StepStatus::Skipped => "skipped",
        StepStatus::Error => "error",
    }
}

/// Human-readable run summary
pub fn render_markdown(summary: &RunSummary) -> String {
    let r = &summary.results;
    let mut md = String::new();

    let _ = writeln!(md, "# Component Analysis Report");
    let _ = writeln!(md);
    let _ = writeln!(md, "- **Run:** `{}`", summary.run_id);
    let _ = writeln!(md, "- **Timestamp:** {}", summary.timestamp.to_rfc3339());
    let _ = writeln!(md, "- **Duration:** {} ms", summary.duration);
    let _ = writeln!(
        md,
        "- **Status:** {}",
        if !summary.completed {
            "incomplete"
        } else if summary.errors.is_empty() {
            "completed"
        } else {
            "completed with errors"
        }
    );
    if r.dry_run {
        let _ = writeln!(md, "- **Mode:** dry run (nothing written except reports)");
    }
    let _ = writeln!(md);

    let _ = writeln!(md, "## Summary");
    let _ = writeln!(md);
    let _ = writeln!(md, "| Metric | Value |");
    let _ = writeln!(md, "|---|---|");
    let _ = writeln!(md, "| Tenants scanned | {} |", r.tenants_scanned);
    let _ = writeln!(md, "| Tenants failed | {} |", r.tenants_failed);
    let _ = writeln!(md, "| Component types in use | {} |", r.component_types_found);
    let _ = writeln!(md, "| Registered types | {} |", r.registered_types);
    let _ = writeln!(md, "| Missing components | {} |", r.missing_components.len());
    let _ = writeln!(md, "| Unused components | {} |", r.unused_components.len());
    let _ = writeln!(
        md,
        "| Descriptors created / skipped / errors | {} / {} / {} |",
        r.descriptors.created, r.descriptors.skipped, r.descriptors.errors
    );
    let _ = writeln!(
        md,
        "| Artifacts created / skipped / errors | {} / {} / {} |",
        r.artifacts.created, r.artifacts.skipped, r.artifacts.errors
    );
    let _ = writeln!(md, "| Registry entries added | {} |", r.registry.new_entries);
    let _ = writeln!(md);

    if !r.tenant_scans.is_empty() {
        let _ = writeln!(md, "## Tenants");
        let _ = writeln!(md);
        for scan in &r.tenant_scans {
            let _ = write!(
                md,
                "- `{}` ({}): {}, {} document(s), {} skipped, {} instance(s)",
                scan.tenant_id,
                scan.topology,
                status_label(scan.status),
                scan.documents_scanned,
                scan.documents_skipped,
                scan.instances
            );
            match &scan.error {
                Some(e) => {
                    let _ = writeln!(md, " - {}", e);
                }
                None => {
                    let _ = writeln!(md);
                }
            }
        }
        let _ = writeln!(md);
    }

    let _ = writeln!(md, "## Missing Components");
    let _ = writeln!(md);
    if r.missing_components.is_empty() {
        let _ = writeln!(md, "Every component in use is registered.");
        let _ = writeln!(md);
    }
    for entry in &r.missing_components {
        let _ = writeln!(md, "### {}", entry.component_type);
        let _ = writeln!(md);
        let _ = writeln!(
            md,
            "Used {} time(s) on {} page(s) across {} tenant(s): {}.",
            entry.total_usage,
            entry.page_count,
            entry.tenant_count,
            entry.tenants.join(", ")
        );
        let _ = writeln!(md);
        let _ = writeln!(
            md,
            "Recommended: id `{}`, category `{}`, editor `{}`, scope `{}`.",
            entry.recommended_id,
            entry.recommended_category,
            entry.recommended_editor,
            entry.recommended_scope.as_str()
        );
        if !entry.inferred_properties.is_empty() {
            let _ = writeln!(md);
            for (name, property) in &entry.inferred_properties {
                let _ = writeln!(md, "- `{}`: {}", name, property.spec.kind);
            }
        }
        if !entry.polymorphic_properties.is_empty() {
            let _ = writeln!(md);
            let _ = writeln!(
                md,
                "> Mixed value kinds observed for: {}. The first observed kind was kept.",
                entry.polymorphic_properties.join(", ")
            );
        }
        let _ = writeln!(md);
    }

    if !r.unused_components.is_empty() {
        let _ = writeln!(md, "## Unused Components");
        let _ = writeln!(md);
        for component_type in &r.unused_components {
            let _ = writeln!(md, "- {}", component_type);
        }
        let _ = writeln!(md);
    }

    let _ = writeln!(md, "## Steps");
    let _ = writeln!(md);
    for step in &summary.steps {
        let _ = writeln!(
            md,
            "- **{}**: {} ({} ms) {}",
            step.name,
            status_label(step.status),
            step.duration_ms,
            step.message
        );
    }
    let _ = writeln!(md);

    if !summary.errors.is_empty() {
        let _ = writeln!(md, "## Errors");
        let _ = writeln!(md);
        for error in &summary.errors {
            match &error.unit {
                Some(unit) => {
                    let _ = writeln!(md, "- [{}] `{}`: {}", error.step, unit, error.message);
                }
                None => {
                    let _ = writeln!(md, "- [{}] {}", error.step, error.message);
                }
            }
        }
        let _ = writeln!(md);
    }

    if !summary.warnings.is_empty() {
        let _ = writeln!(md, "## Warnings");
        let _ = writeln!(md);
        for warning in &summary.warnings {
            let _ = writeln!(md, "- {}", warning);
        }
        let _ = writeln!(md);
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn summary() -> RunSummary {
        let timestamp = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let mut summary = RunSummary::new(timestamp);
        summary.record_step("scan", StepStatus::Success, "1 tenant(s)", 5);
        summary.record_error("scan", Some("t2"), "connection refused");
        summary.warn("broken.json: unparseable descriptor");
        summary.results.unused_components = vec!["Navbar".to_string()];
        summary.completed = true;
        summary
    }

    #[test]
    fn test_writes_json_and_markdown() {
        let temp_dir = TempDir::new().unwrap();
        let writer = ReportWriter::new(temp_dir.path().join("reports"));

        let paths = writer.write(&summary()).unwrap();

        let name = paths.json.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("component-analysis-20260301T120000"));
        assert!(name.ends_with(".json"));

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&paths.json).unwrap()).unwrap();
        assert_eq!(json["completed"], serde_json::json!(true));
        assert_eq!(json["errors"][0]["unit"], serde_json::json!("t2"));

        let md = std::fs::read_to_string(&paths.markdown).unwrap();
        assert!(md.contains("# Component Analysis Report"));
        assert!(md.contains("completed with errors"));
        assert!(md.contains("- Navbar"));
        assert!(md.contains("`t2`: connection refused"));
    }

    #[test]
    fn test_collision_gets_suffix_and_never_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let writer = ReportWriter::new(temp_dir.path());
        let s = summary();

        let first = writer.write(&s).unwrap();
        let first_contents = std::fs::read_to_string(&first.json).unwrap();
        let second = writer.write(&s).unwrap();

        assert_ne!(first.json, second.json);
        assert!(second.json.to_string_lossy().ends_with("-1.json"));
        assert!(second.markdown.to_string_lossy().ends_with("-1.md"));
        assert_eq!(std::fs::read_to_string(&first.json).unwrap(), first_contents);
    }

    #[test]
    fn test_markdown_incomplete_run() {
        let mut s = summary();
        s.completed = false;
        assert!(render_markdown(&s).contains("**Status:** incomplete"));
    }
}
