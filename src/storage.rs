//! Blob storage for image bytes, addressed by bucket and key.
//!
//! The filter and detection halves exchange images exclusively through an
//! [`ObjectStore`]; [`FsObjectStore`] keeps each bucket as a directory
//! under a local root.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;
use tokio::fs as async_fs;

/// Key-value blob store accessed by bucket name and object key.
pub trait ObjectStore {
    /// Copy a local file into the store under `bucket`/`key`.
    fn upload(
        &self,
        local_path: &Path,
        bucket: &str,
        key: &str,
    ) -> impl std::future::Future<Output = Result<()>>;

    /// Copy the object at `bucket`/`key` to a local path, creating parent
    /// directories as needed.
    fn download(
        &self,
        bucket: &str,
        key: &str,
        local_path: &Path,
    ) -> impl std::future::Future<Output = Result<()>>;
}

/// Directory-backed object store. Keys may contain `/`, which maps onto
/// subdirectories of the bucket.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    fn object_path(&self, bucket: &str, key: &str) -> PathBuf {
        self.root.join(bucket).join(key)
    }
}

impl ObjectStore for FsObjectStore {
    async fn upload(&self, local_path: &Path, bucket: &str, key: &str) -> Result<()> {
        let dest = self.object_path(bucket, key);
        if let Some(parent) = dest.parent() {
            async_fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create bucket directory {:?}", parent))?;
        }
        async_fs::copy(local_path, &dest)
            .await
            .with_context(|| format!("Failed to upload {:?} to {}/{}", local_path, bucket, key))?;
        info!("Successfully uploaded {:?} to {}/{}", local_path, bucket, key);
        Ok(())
    }

    async fn download(&self, bucket: &str, key: &str, local_path: &Path) -> Result<()> {
        let src = self.object_path(bucket, key);
        if let Some(parent) = local_path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }
        async_fs::copy(&src, local_path)
            .await
            .with_context(|| format!("Failed to download {}/{} to {:?}", bucket, key, local_path))?;
        info!("Successfully downloaded {}/{} from store", bucket, key);
        Ok(())
    }
}
