//! Filesystem-backed [`ObjectStorage`].
//!
//! Layout under the configured root:
//!
//! ```text
//! root/
//!   .buckets/<bucket>.json   bucket settings
//!   <bucket>/<object path>   object bytes
//! ```

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::storage::BucketConfig;
use crate::domain::types::BucketName;
use crate::storage::{ObjectStorage, StorageError, StorageResult};

const METADATA_DIR: &str = ".buckets";

#[derive(Debug, Clone)]
pub struct FsObjectStorage {
    root: PathBuf,
    public_url: String,
}

impl FsObjectStorage {
    pub fn new(root: impl Into<PathBuf>, public_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_url: public_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn metadata_path(&self, bucket: &str) -> PathBuf {
        self.root.join(METADATA_DIR).join(format!("{bucket}.json"))
    }

    fn bucket_dir(&self, bucket: &BucketName) -> StorageResult<PathBuf> {
        let name = bucket.as_str();
        if name.starts_with('.') || name.contains(['/', '\\']) {
            return Err(StorageError::InvalidPath(name.to_string()));
        }
        Ok(self.root.join(name))
    }

    async fn read_config(&self, bucket: &BucketName) -> StorageResult<BucketConfig> {
        match fs::read(self.metadata_path(bucket.as_str())).await {
            Ok(raw) => Ok(serde_json::from_slice(&raw)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::BucketNotFound(bucket.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Only plain relative paths stay inside the bucket directory.
fn relative_object_path(path: &str) -> StorageResult<PathBuf> {
    let candidate = Path::new(path);
    let is_plain = !path.is_empty()
        && candidate
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
    if is_plain {
        Ok(candidate.to_path_buf())
    } else {
        Err(StorageError::InvalidPath(path.to_string()))
    }
}

#[async_trait]
impl ObjectStorage for FsObjectStorage {
    async fn list_buckets(&self) -> StorageResult<Vec<BucketName>> {
        let mut entries = match fs::read_dir(self.root.join(METADATA_DIR)).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut buckets = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(name) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| BucketName::new(stem).ok())
            {
                buckets.push(name);
            }
        }
        buckets.sort();
        Ok(buckets)
    }

    async fn create_bucket(&self, config: &BucketConfig) -> StorageResult<()> {
        let dir = self.bucket_dir(&config.name)?;
        fs::create_dir_all(&self.root).await?;

        let metadata = self.metadata_path(config.name.as_str());

        // The settings file marks a bucket as existing, the same marker
        // `list_buckets` reads. A directory without one is adopted.
        match fs::create_dir(&dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                if fs::try_exists(&metadata).await? {
                    return Err(StorageError::BucketAlreadyExists(config.name.to_string()));
                }
                log::warn!(
                    "Adopting storage directory {} without bucket settings",
                    dir.display()
                );
            }
            Err(e) => return Err(e.into()),
        }

        fs::create_dir_all(self.root.join(METADATA_DIR)).await?;
        let raw = serde_json::to_vec_pretty(config)?;
        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&metadata)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(StorageError::BucketAlreadyExists(config.name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        file.write_all(&raw).await?;
        file.flush().await?;
        Ok(())
    }

    async fn upload(
        &self,
        bucket: &BucketName,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<()> {
        let config = self.read_config(bucket).await?;
        if !config.accepts_mime(content_type) {
            return Err(StorageError::MimeTypeNotAllowed(content_type.to_string()));
        }
        if bytes.len() > config.max_bytes {
            return Err(StorageError::ObjectTooLarge {
                size: bytes.len(),
                max: config.max_bytes,
            });
        }

        let target = self.bucket_dir(bucket)?.join(relative_object_path(path)?);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(target, bytes).await?;
        Ok(())
    }

    fn public_url(&self, bucket: &BucketName, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.public_url,
            bucket,
            path.trim_start_matches('/')
        )
    }

    async fn list(&self, bucket: &BucketName) -> StorageResult<Vec<String>> {
        self.read_config(bucket).await?;
        let dir = self.bucket_dir(bucket)?;

        let mut objects = Vec::new();
        let mut pending = vec![dir.clone()];
        while let Some(current) = pending.pop() {
            let mut entries = fs::read_dir(&current).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    pending.push(path);
                } else if let Ok(relative) = path.strip_prefix(&dir) {
                    objects.push(relative.to_string_lossy().replace('\\', "/"));
                }
            }
        }
        objects.sort();
        Ok(objects)
    }
}
