//! Cloudflare R2 through its S3-compatible API.

use std::path::Path;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, info, warn};

use crate::error::{StorageError, StorageResult};
use crate::{key_from_url, validate_name, Container, ObjectStore};

/// `R2_*` settings. Every field except the region is required.
#[derive(Debug, Clone)]
pub struct R2Config {
    pub endpoint_url: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket_name: String,
    /// R2 ignores regions; the SDK still wants one.
    pub region: String,
    /// Custom domain or r2.dev address the bucket is published at.
    pub public_base_url: String,
}

fn required(name: &str) -> StorageResult<String> {
    std::env::var(name).map_err(|_| StorageError::config(format!("{name} not set")))
}

impl R2Config {
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self {
            endpoint_url: required("R2_ENDPOINT_URL")?,
            access_key_id: required("R2_ACCESS_KEY_ID")?,
            secret_access_key: required("R2_SECRET_ACCESS_KEY")?,
            bucket_name: required("R2_BUCKET_NAME")?,
            region: std::env::var("R2_REGION").unwrap_or_else(|_| "auto".to_string()),
            public_base_url: required("R2_PUBLIC_BASE_URL")?,
        })
    }

    /// R2 is selected as soon as an endpoint is given; the remaining
    /// variables are then mandatory.
    pub fn is_configured() -> bool {
        std::env::var("R2_ENDPOINT_URL").is_ok()
    }
}

#[derive(Clone)]
pub struct R2ObjectStore {
    client: Client,
    bucket: String,
    public_base_url: String,
}

impl R2ObjectStore {
    pub fn new(config: R2Config) -> Self {
        let credentials = Credentials::new(
            config.access_key_id,
            config.secret_access_key,
            None,
            None,
            "r2-env",
        );
        let sdk_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(config.endpoint_url)
            .region(Region::new(config.region))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Self {
            client: Client::from_conf(sdk_config),
            bucket: config.bucket_name,
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_env() -> StorageResult<Self> {
        R2Config::from_env().map(Self::new)
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }

    async fn put_body(&self, key: &str, body: ByteStream, content_type: &str) -> StorageResult<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::put(key, e))?;
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for R2ObjectStore {
    async fn put(
        &self,
        container: Container,
        name: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String> {
        validate_name(name)?;
        let key = container.key(name);
        debug!("Uploading {} bytes to {}", data.len(), key);

        self.put_body(&key, ByteStream::from(data), content_type)
            .await?;

        Ok(self.public_url(&key))
    }

    async fn put_file(
        &self,
        container: Container,
        name: &str,
        path: &Path,
        content_type: &str,
    ) -> StorageResult<String> {
        validate_name(name)?;
        let key = container.key(name);
        debug!("Uploading {} to {}", path.display(), key);

        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| StorageError::put(&key, e))?;
        self.put_body(&key, body, content_type).await?;

        info!("Uploaded {} to {}", path.display(), key);
        Ok(self.public_url(&key))
    }

    async fn delete(&self, url: &str) -> StorageResult<()> {
        let Some(key) = key_from_url(&self.public_base_url, url) else {
            warn!(url, "Not an object of this bucket, skipping delete");
            return Ok(());
        };
        debug!("Deleting {}", key);

        // S3 DeleteObject already succeeds for missing keys; R2 follows that
        match self
            .client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if e.to_string().contains("NoSuchKey") => Ok(()),
            Err(e) => Err(StorageError::delete(key, e)),
        }
    }

    async fn check_connectivity(&self) -> StorageResult<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| StorageError::Unreachable(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> R2Config {
        R2Config {
            endpoint_url: "https://account.r2.cloudflarestorage.com".into(),
            access_key_id: "key".into(),
            secret_access_key: "secret".into(),
            bucket_name: "youview".into(),
            region: "auto".into(),
            public_base_url: "https://media.youview.test/".into(),
        }
    }

    #[tokio::test]
    async fn test_public_urls() {
        let store = R2ObjectStore::new(config());
        assert_eq!(
            store.public_url(&Container::Previews.key("x_preview.gif")),
            "https://media.youview.test/previews/x_preview.gif"
        );
    }

    #[tokio::test]
    async fn test_delete_foreign_url_is_noop() {
        let store = R2ObjectStore::new(config());
        // Never reaches the network
        store
            .delete("https://someone-else.test/videos/a.mp4")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_rejects_traversal_names() {
        let store = R2ObjectStore::new(config());
        let err = store
            .put(Container::Videos, "../x.mp4", vec![1], "video/mp4")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }
}
