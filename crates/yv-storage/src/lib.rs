//! Object storage for uploaded media.
//!
//! This crate provides:
//! - The [`ObjectStore`] interface the pipeline and API write blobs through
//! - A Cloudflare R2 (S3 API) implementation
//! - A local filesystem implementation for development and tests
//!
//! Stored objects are addressed by their public URL once written, so
//! deleting takes the URL that was saved on the owning row.

pub mod error;
pub mod fs;
pub mod r2;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub use error::{StorageError, StorageResult};
pub use fs::{FsObjectStore, FsStoreConfig};
pub use r2::{R2Config, R2ObjectStore};

/// Logical blob container. Maps to a key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Container {
    Videos,
    Thumbnails,
    Previews,
    Profiles,
}

impl Container {
    pub fn as_str(&self) -> &'static str {
        match self {
            Container::Videos => "videos",
            Container::Thumbnails => "thumbnails",
            Container::Previews => "previews",
            Container::Profiles => "profiles",
        }
    }

    /// Full object key for `name` inside this container.
    pub fn key(&self, name: &str) -> String {
        format!("{}/{}", self.as_str(), name)
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Blob storage with public URLs.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store bytes and return the public URL.
    async fn put(
        &self,
        container: Container,
        name: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String>;

    /// Store a local file and return the public URL.
    async fn put_file(
        &self,
        container: Container,
        name: &str,
        path: &Path,
        content_type: &str,
    ) -> StorageResult<String>;

    /// Delete by public URL. Deleting a missing object succeeds.
    async fn delete(&self, url: &str) -> StorageResult<()>;

    /// Readiness probe.
    async fn check_connectivity(&self) -> StorageResult<()>;
}

/// Content type from a file name, falling back to `application/octet-stream`.
pub fn guess_content_type(name: &str) -> String {
    mime_guess::from_path(name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Reject names that could escape their container.
pub(crate) fn validate_name(name: &str) -> StorageResult<()> {
    if name.is_empty()
        || name.starts_with('/')
        || name.contains('\\')
        || name.split('/').any(|part| part == ".." || part == ".")
    {
        return Err(StorageError::InvalidKey(name.to_string()));
    }
    Ok(())
}

/// Strip `base` from `url` and return the remaining object key.
pub(crate) fn key_from_url<'a>(base: &str, url: &'a str) -> Option<&'a str> {
    let rest = url.strip_prefix(base.trim_end_matches('/'))?;
    let key = rest.strip_prefix('/')?;
    (!key.is_empty()).then_some(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_keys() {
        assert_eq!(Container::Videos.key("abc.mp4"), "videos/abc.mp4");
        assert_eq!(
            Container::Thumbnails.key("abc_thumb.jpg"),
            "thumbnails/abc_thumb.jpg"
        );
    }

    #[test]
    fn test_guess_content_type() {
        assert_eq!(guess_content_type("a.mp4"), "video/mp4");
        assert_eq!(guess_content_type("a_preview.gif"), "image/gif");
        assert_eq!(guess_content_type("a_thumb.jpg"), "image/jpeg");
        assert_eq!(guess_content_type("noext"), "application/octet-stream");
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("abc.mp4").is_ok());
        assert!(validate_name("../etc/passwd").is_err());
        assert!(validate_name("/abs").is_err());
        assert!(validate_name("").is_err());
    }

    #[test]
    fn test_key_from_url() {
        let base = "https://media.example.com/";
        assert_eq!(
            key_from_url(base, "https://media.example.com/videos/a.mp4"),
            Some("videos/a.mp4")
        );
        assert_eq!(key_from_url(base, "https://elsewhere.com/videos/a.mp4"), None);
        assert_eq!(key_from_url(base, "https://media.example.com/"), None);
    }
}
