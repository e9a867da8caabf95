//! Local directory object store.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;

use crate::backend::{FetchError, ObjectFetch};

/// Serves objects from files under a root directory.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ObjectFetch for FsObjectStore {
    async fn fetch(&self, path: &str) -> Result<Bytes, FetchError> {
        // Object keys are relative to the root, with or without a leading slash.
        let full_path = self.root.join(path.trim_start_matches('/'));

        match tokio::fs::read(&full_path).await {
            Ok(content) => Ok(Bytes::from(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(FetchError::NotFound(path.to_string()))
            }
            Err(e) => Err(FetchError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_object_relative_to_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("qi")).unwrap();
        std::fs::write(dir.path().join("qi/router.json"), b"[]").unwrap();

        let store = FsObjectStore::new(dir.path());
        assert_eq!(&store.fetch("qi/router.json").await.unwrap()[..], b"[]");
        assert_eq!(&store.fetch("/qi/router.json").await.unwrap()[..], b"[]");
    }

    #[tokio::test]
    async fn test_missing_object_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path());

        let err = store.fetch("missing.json").await.unwrap_err();
        assert!(matches!(err, FetchError::NotFound(p) if p == "missing.json"));
    }
}
