//! Descriptor files: one pretty-printed `<id>.json` per descriptor

use super::write_new_file;
use crate::models::ComponentDescriptor;
use crate::types::{RawDescriptor, RegistryStore};
use compreg_common::Result;
use std::path::{Path, PathBuf};

/// Registry store rooted at a directory of JSON files
#[derive(Debug, Clone)]
pub struct FsRegistryStore {
    dir: PathBuf,
}

impl FsRegistryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn descriptor_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }
}

impl RegistryStore for FsRegistryStore {
    fn list_descriptors(&self) -> Result<Vec<RawDescriptor>> {
        if !self.dir.exists() {
            tracing::debug!(dir = %self.dir.display(), "Registry directory missing, treating as empty");
            return Ok(Vec::new());
        }

        let mut paths: Vec<PathBuf> = std::fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && p.extension().map(|e| e == "json").unwrap_or(false))
            .collect();
        paths.sort();

        let mut records = Vec::with_capacity(paths.len());
        for path in paths {
            let location = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());
            let body = std::fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|text| serde_json::from_str(&text).map_err(|e| e.to_string()));
            records.push(RawDescriptor { location, body });
        }

        Ok(records)
    }

    fn exists(&self, id: &str) -> bool {
        self.descriptor_path(id).exists()
    }

    fn write_descriptor(&self, id: &str, descriptor: &ComponentDescriptor) -> Result<PathBuf> {
        let path = self.descriptor_path(id);
        let mut body = serde_json::to_string_pretty(descriptor)?;
        body.push('\n');
        write_new_file(&path, &body)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_dir_lists_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsRegistryStore::new(temp_dir.path().join("absent"));
        assert!(store.list_descriptors().unwrap().is_empty());
    }

    #[test]
    fn test_lists_only_json_files_with_parse_errors_kept() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        std::fs::write(dir.join("a.json"), r#"{"id": "a", "type": "A"}"#).unwrap();
        std::fs::write(dir.join("b.json"), "{ not json").unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let store = FsRegistryStore::new(dir);
        let records = store.list_descriptors().unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].location, "a.json");
        assert!(records[0].body.is_ok());
        assert_eq!(records[1].location, "b.json");
        assert!(records[1].body.is_err());
    }

    #[test]
    fn test_exists_keys_by_id() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("hero-banner.json"), "{}").unwrap();

        let store = FsRegistryStore::new(temp_dir.path());
        assert!(store.exists("hero-banner"));
        assert!(!store.exists("site-footer"));
    }
}
