//! Filesystem-backed registry and artifact stores

pub mod artifact_files;
pub mod registry_files;

pub use artifact_files::FsArtifactStore;
pub use registry_files::FsRegistryStore;

use compreg_common::Result;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Create `path` with `contents`, failing if it already exists
///
/// Parent directories are created as needed. `create_new` makes the
/// existence check and the write a single step.
pub(crate) fn write_new_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_new_file_creates_parents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a/b/c.txt");

        write_new_file(&path, "hello").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");
    }

    #[test]
    fn test_write_new_file_refuses_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("existing.txt");
        std::fs::write(&path, "original").unwrap();

        assert!(write_new_file(&path, "replacement").is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "original");
    }
}
