use std::path::{Path, PathBuf};

use super::{ResourceCatalog, ResourceHandle};

const CUE_EXTENSION: &str = "wav";

/// Catalog backed by a directory tree: `<root>/<namespace>/<name>.wav`
pub struct DirCatalog {
    root: PathBuf,
}

impl DirCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ResourceCatalog for DirCatalog {
    fn find(&self, namespace: &str, name: &str) -> Option<ResourceHandle> {
        // Reject anything that could escape the catalog root
        if !is_plain_segment(namespace) || !is_plain_segment(name) {
            return None;
        }

        let path = self
            .root
            .join(namespace)
            .join(format!("{}.{}", name, CUE_EXTENSION));

        if path.is_file() {
            Some(ResourceHandle {
                namespace: namespace.to_string(),
                name: name.to_string(),
                path,
            })
        } else {
            None
        }
    }
}

fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty() && segment != ".." && !segment.chars().any(|c| c == '/' || c == '\\')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_files_by_namespace() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("legacy")).unwrap();
        std::fs::write(dir.path().join("legacy").join("num_4.wav"), b"RIFF").unwrap();

        let catalog = DirCatalog::new(dir.path());
        let handle = catalog.find("legacy", "num_4").unwrap();
        assert_eq!(handle.path, dir.path().join("legacy").join("num_4.wav"));
        assert!(catalog.find("base", "num_4").is_none());
        assert!(catalog.find("legacy", "num_5").is_none());
    }

    #[test]
    fn directories_are_not_resources() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("base").join("num_1.wav")).unwrap();
        assert!(DirCatalog::new(dir.path()).find("base", "num_1").is_none());
    }

    #[test]
    fn rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = DirCatalog::new(dir.path());
        assert!(catalog.find("..", "num_1").is_none());
        assert!(catalog.find("base", "../num_1").is_none());
    }
}
