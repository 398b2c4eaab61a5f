//! Generated component source files: `<StudlyName>.tsx`

use super::write_new_file;
use crate::types::ArtifactStore;
use compreg_common::Result;
use std::path::{Path, PathBuf};

/// Artifact store rooted at the generated components directory
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    dir: PathBuf,
    extension: String,
}

impl FsArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            extension: "tsx".to_string(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ArtifactStore for FsArtifactStore {
    fn artifact_path(&self, identifier: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", identifier, self.extension))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn write(&self, path: &Path, source: &str) -> Result<()> {
        write_new_file(path, source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_artifact_path_uses_identifier() {
        let store = FsArtifactStore::new("/srv/generated");
        assert_eq!(
            store.artifact_path("HeroBanner"),
            PathBuf::from("/srv/generated/HeroBanner.tsx")
        );
    }

    #[test]
    fn test_write_then_exists() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsArtifactStore::new(temp_dir.path());
        let path = store.artifact_path("SiteFooter");

        assert!(!store.exists(&path));
        store.write(&path, "export default null;\n").unwrap();
        assert!(store.exists(&path));
        assert!(store.write(&path, "changed").is_err());
    }
}
