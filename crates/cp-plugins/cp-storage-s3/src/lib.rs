//! # cp-storage-s3
//!
//! S3 implementation of `AssetStore`. Objects are served through a CDN
//! distribution, so the public URL is `https://{distribution}/{key}` rather
//! than the bucket endpoint. S3 puts overwrite by key, which keeps retries
//! idempotent.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use cp_core::error::{AppError, Result};
use cp_core::traits::AssetStore;

pub struct S3AssetStore {
    client: Client,
    bucket: String,
    /// CDN distribution domain fronting the bucket.
    distribution_domain: String,
}

impl S3AssetStore {
    /// Credentials and region resolve from the standard AWS environment.
    pub async fn from_env(bucket: String, distribution_domain: String) -> Self {
        let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self {
            client: Client::new(&config),
            bucket,
            distribution_domain,
        }
    }
}

#[async_trait]
impl AssetStore for S3AssetStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| AppError::AssetUpload(e.to_string()))?;

        Ok(format!("https://{}/{}", self.distribution_domain, key))
    }
}
