//! Local directory object store.
//!
//! Objects live under `<root>/<container>/<name>` and are served by the API
//! under `MEDIA_BASE_URL`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{StorageError, StorageResult};
use crate::{key_from_url, validate_name, Container, ObjectStore};

#[derive(Debug, Clone)]
pub struct FsStoreConfig {
    /// Directory holding the containers
    pub root: PathBuf,
    /// URL prefix the directory is served under
    pub base_url: String,
}

impl Default for FsStoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./media"),
            base_url: "/media".to_string(),
        }
    }
}

impl FsStoreConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            root: std::env::var("MEDIA_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.root),
            base_url: std::env::var("MEDIA_BASE_URL").unwrap_or(defaults.base_url),
        }
    }
}

/// [`ObjectStore`] writing to a local directory.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
    base_url: String,
}

impl FsObjectStore {
    pub fn new(config: FsStoreConfig) -> Self {
        Self {
            root: config.root,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn target(&self, container: Container, name: &str) -> StorageResult<(String, PathBuf)> {
        validate_name(name)?;
        let key = container.key(name);
        let path = self.root.join(&key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok((key, path))
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(
        &self,
        container: Container,
        name: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> StorageResult<String> {
        let (key, path) = self.target(container, name).await?;
        debug!("Writing {} bytes to {}", data.len(), path.display());

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| StorageError::put(&key, e))?;

        Ok(self.public_url(&key))
    }

    async fn put_file(
        &self,
        container: Container,
        name: &str,
        source: &Path,
        _content_type: &str,
    ) -> StorageResult<String> {
        let (key, path) = self.target(container, name).await?;
        debug!("Copying {} to {}", source.display(), path.display());

        tokio::fs::copy(source, &path)
            .await
            .map_err(|e| StorageError::put(&key, e))?;

        Ok(self.public_url(&key))
    }

    async fn delete(&self, url: &str) -> StorageResult<()> {
        let Some(key) = key_from_url(&self.base_url, url) else {
            warn!(url, "Not an object of this store, skipping delete");
            return Ok(());
        };
        // Keys derived from stored URLs are still untrusted input
        let (container, name) = key
            .split_once('/')
            .ok_or_else(|| StorageError::InvalidKey(key.to_string()))?;
        validate_name(container)?;
        validate_name(name)?;

        match tokio::fs::remove_file(self.root.join(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::delete(key, e)),
        }
    }

    async fn check_connectivity(&self) -> StorageResult<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &Path) -> FsObjectStore {
        FsObjectStore::new(FsStoreConfig {
            root: dir.to_path_buf(),
            base_url: "http://localhost:8000/media/".to_string(),
        })
    }

    #[tokio::test]
    async fn test_put_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        let url = store
            .put(Container::Thumbnails, "abc_thumb.jpg", vec![1, 2, 3], "image/jpeg")
            .await
            .unwrap();
        assert_eq!(url, "http://localhost:8000/media/thumbnails/abc_thumb.jpg");
        assert!(dir.path().join("thumbnails/abc_thumb.jpg").exists());

        store.delete(&url).await.unwrap();
        assert!(!dir.path().join("thumbnails/abc_thumb.jpg").exists());

        // Second delete is a no-op
        store.delete(&url).await.unwrap();
    }

    #[tokio::test]
    async fn test_put_file_copies() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("source.mp4");
        tokio::fs::write(&src, b"video").await.unwrap();

        let store = store(&dir.path().join("blobs"));
        let url = store
            .put_file(Container::Videos, "abc.mp4", &src, "video/mp4")
            .await
            .unwrap();

        assert!(url.ends_with("/media/videos/abc.mp4"));
        assert!(src.exists(), "source must be left in place");
        assert_eq!(
            tokio::fs::read(dir.path().join("blobs/videos/abc.mp4"))
                .await
                .unwrap(),
            b"video"
        );
    }

    #[tokio::test]
    async fn test_delete_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let result = store
            .delete("http://localhost:8000/media/videos/../../secret")
            .await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }
}
