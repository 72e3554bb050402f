//! Object storage collaborator used for product images and brand logos.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::storage::{BucketConfig, ImageFile, MAX_IMAGE_BYTES};
use crate::domain::types::BucketName;

pub mod fs;

pub use fs::FsObjectStorage;

/// Failures reported by an [`ObjectStorage`] backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("bucket `{0}` not found")]
    BucketNotFound(String),
    #[error("bucket `{0}` already exists")]
    BucketAlreadyExists(String),
    #[error("mime type {0} is not allowed in this bucket")]
    MimeTypeNotAllowed(String),
    #[error("object of {size} bytes exceeds the bucket limit of {max} bytes")]
    ObjectTooLarge { size: usize, max: usize },
    #[error("invalid object path `{0}`")]
    InvalidPath(String),
    #[error("bucket metadata is unreadable: {0}")]
    Metadata(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Any other failure reported by the backend.
    #[error("{0}")]
    Backend(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Bucket-oriented blob store.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn list_buckets(&self) -> StorageResult<Vec<BucketName>>;

    /// Fails with [`StorageError::BucketAlreadyExists`] when the bucket is present.
    async fn create_bucket(&self, config: &BucketConfig) -> StorageResult<()>;

    async fn upload(
        &self,
        bucket: &BucketName,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<()>;

    /// Address the object is publicly readable under. Does not touch the backend.
    fn public_url(&self, bucket: &BucketName, path: &str) -> String;

    /// Object paths stored in `bucket`.
    async fn list(&self, bucket: &BucketName) -> StorageResult<Vec<String>>;
}

/// Reasons a selected file is refused before anything is sent to storage.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("File {file_name} is too large (max 5 MiB)")]
    TooLarge { file_name: String, size: usize },
    #[error("File {file_name} is not a valid image")]
    NotAnImage { file_name: String },
    #[error("No files selected")]
    Empty,
}

/// Local checks every image goes through before upload.
pub fn validate_image(file: &ImageFile) -> Result<(), UploadError> {
    if file.size() > MAX_IMAGE_BYTES {
        return Err(UploadError::TooLarge {
            file_name: file.file_name.clone(),
            size: file.size(),
        });
    }
    match file.content_type.as_deref() {
        Some(content_type) if content_type.starts_with("image/") => Ok(()),
        _ => Err(UploadError::NotAnImage {
            file_name: file.file_name.clone(),
        }),
    }
}
