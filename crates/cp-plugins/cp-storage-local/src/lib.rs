//! # cp-storage-local
//!
//! Local filesystem implementation of `AssetStore`, for development and
//! single-host deployments. Keys map directly to paths under the root
//! directory; the public URL is the configured base joined with the key.

use std::path::PathBuf;

use async_trait::async_trait;
use cp_core::error::{AppError, Result};
use cp_core::traits::AssetStore;
use tokio::fs;

pub struct LocalAssetStore {
    /// Root directory for all objects (e.g., "./data/assets")
    root: PathBuf,
    /// Public URL prefix the web server serves `root` under.
    public_base: String,
}

impl LocalAssetStore {
    pub fn new(root: PathBuf, public_base: String) -> Self {
        Self {
            root,
            public_base: public_base.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl AssetStore for LocalAssetStore {
    /// Writes the object, creating parent directories on demand. Re-putting
    /// the same key overwrites, which makes retries safe.
    async fn put(&self, key: &str, bytes: Vec<u8>, _content_type: &str) -> Result<String> {
        let target = self.root.join(key);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::AssetUpload(e.to_string()))?;
        }
        fs::write(&target, &bytes)
            .await
            .map_err(|e| AppError::AssetUpload(e.to_string()))?;

        Ok(format!("{}/{}", self.public_base, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_store() -> (LocalAssetStore, PathBuf) {
        let root = std::env::temp_dir().join(format!("cp-store-{}", Uuid::new_v4()));
        (
            LocalAssetStore::new(root.clone(), "https://cdn.test/".into()),
            root,
        )
    }

    #[tokio::test]
    async fn put_writes_and_returns_public_url() {
        let (store, root) = temp_store();
        let url = store
            .put("images/a-b-thumbnail.jpg", vec![1, 2, 3], "image/jpeg")
            .await
            .unwrap();
        assert_eq!(url, "https://cdn.test/images/a-b-thumbnail.jpg");
        let on_disk = fs::read(root.join("images/a-b-thumbnail.jpg")).await.unwrap();
        assert_eq!(on_disk, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn reput_overwrites() {
        let (store, root) = temp_store();
        store.put("k.jpg", vec![1], "image/jpeg").await.unwrap();
        store.put("k.jpg", vec![2, 2], "image/jpeg").await.unwrap();
        assert_eq!(fs::read(root.join("k.jpg")).await.unwrap(), vec![2, 2]);
    }
}
