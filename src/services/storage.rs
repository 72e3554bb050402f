//! Bucket bootstrap and image uploads.

use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use parking_lot::RwLock;
use rand::Rng;
use rand::distributions::Alphanumeric;

use crate::domain::storage::{BootstrapState, BucketConfig, ImageFile, UploadTarget, object_path};
use crate::domain::types::ImageUrl;
use crate::storage::{ObjectStorage, StorageError, UploadError, validate_image};

use super::{ServiceError, ServiceResult};

const SUFFIX_LEN: usize = 7;

/// Process-wide record of whether the image bucket can be used.
#[derive(Debug)]
pub struct StorageBootstrap {
    bucket: BucketConfig,
    state: RwLock<BootstrapState>,
}

impl StorageBootstrap {
    pub fn new(bucket: BucketConfig) -> Self {
        Self {
            bucket,
            state: RwLock::new(BootstrapState::Unchecked),
        }
    }

    pub fn bucket(&self) -> &BucketConfig {
        &self.bucket
    }

    pub fn state(&self) -> BootstrapState {
        self.state.read().clone()
    }

    fn set_state(&self, state: BootstrapState) {
        *self.state.write() = state;
    }

    /// Instructions shown when the bucket has to be provisioned by hand.
    pub fn manual_setup_hint(&self) -> String {
        format!(
            "Please set up storage manually: create a public bucket named `{}` accepting {} up to {} MiB.",
            self.bucket.name,
            self.bucket.allowed_mime_types.join(", "),
            self.bucket.max_bytes / (1024 * 1024)
        )
    }
}

/// Makes sure the image bucket exists, creating it at most once per call.
///
/// A bucket that shows up in the listing is left untouched. A create call
/// reporting that the bucket already exists counts as success. Failures are
/// recorded and not retried until the operator runs the setup again.
pub async fn bootstrap_storage<S>(bootstrap: &StorageBootstrap, storage: &S) -> BootstrapState
where
    S: ObjectStorage + ?Sized,
{
    let name = &bootstrap.bucket().name;

    let state = match storage.list_buckets().await {
        Ok(buckets) if buckets.contains(name) => {
            log::info!("Storage bucket `{name}` is already configured");
            BootstrapState::Ready
        }
        Ok(_) => match storage.create_bucket(bootstrap.bucket()).await {
            Ok(()) => {
                log::info!("Created storage bucket `{name}`");
                BootstrapState::Ready
            }
            Err(StorageError::BucketAlreadyExists(_)) => {
                log::info!("Storage bucket `{name}` was created concurrently");
                BootstrapState::Ready
            }
            Err(e) => {
                log::warn!("Failed to create storage bucket `{name}`: {e}");
                BootstrapState::Failed(e.to_string())
            }
        },
        Err(e) => {
            log::warn!("Failed to list storage buckets: {e}");
            BootstrapState::Failed(e.to_string())
        }
    };

    bootstrap.set_state(state.clone());
    state
}

/// Lists the bucket to prove it is reachable. Returns the number of stored objects.
pub async fn check_storage_access<S>(bootstrap: &StorageBootstrap, storage: &S) -> ServiceResult<usize>
where
    S: ObjectStorage + ?Sized,
{
    match storage.list(&bootstrap.bucket().name).await {
        Ok(objects) => Ok(objects.len()),
        Err(e) => {
            log::warn!("Storage access check failed: {e}");
            Err(ServiceError::StorageUnavailable(e.to_string()))
        }
    }
}

async fn ensure_ready<S>(bootstrap: &StorageBootstrap, storage: &S) -> ServiceResult<()>
where
    S: ObjectStorage + ?Sized,
{
    let state = match bootstrap.state() {
        BootstrapState::Unchecked => bootstrap_storage(bootstrap, storage).await,
        state => state,
    };
    match state {
        BootstrapState::Ready => Ok(()),
        BootstrapState::Failed(reason) => Err(ServiceError::StorageUnavailable(reason)),
        BootstrapState::Unchecked => Err(ServiceError::StorageUnavailable(
            "storage has not been set up".to_string(),
        )),
    }
}

fn random_suffix() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(char::from)
        .collect::<String>()
        .to_lowercase()
}

/// Uploads `files` and returns their public URLs in selection order.
///
/// Every file is validated before the first storage call. Uploads run
/// concurrently; if any of them fails no URL is returned.
pub async fn upload_images<S>(
    files: Vec<ImageFile>,
    target: UploadTarget,
    bootstrap: &StorageBootstrap,
    storage: &S,
) -> ServiceResult<Vec<ImageUrl>>
where
    S: ObjectStorage + ?Sized,
{
    if files.is_empty() {
        return Err(UploadError::Empty.into());
    }
    for file in &files {
        validate_image(file)?;
    }

    ensure_ready(bootstrap, storage).await?;

    let bucket = &bootstrap.bucket().name;
    let timestamp = Utc::now().timestamp_millis();

    let mut pending = files
        .into_iter()
        .enumerate()
        .map(|(index, file)| {
            let path = object_path(target, timestamp, &random_suffix(), &file.extension());
            let content_type = file.content_type.unwrap_or_default();
            async move {
                let result = storage
                    .upload(bucket, &path, file.bytes, &content_type)
                    .await
                    .map(|()| storage.public_url(bucket, &path));
                (index, result)
            }
        })
        .collect::<FuturesUnordered<_>>();

    let mut uploaded = Vec::new();
    while let Some((index, result)) = pending.next().await {
        match result {
            Ok(url) => uploaded.push((index, url)),
            Err(e) => {
                log::error!("Failed to upload image: {e}");
                return Err(ServiceError::StorageUnavailable(e.to_string()));
            }
        }
    }

    uploaded.sort_by_key(|(index, _)| *index);
    uploaded
        .into_iter()
        .map(|(_, url)| {
            ImageUrl::new(url).map_err(|e| {
                log::error!("Storage returned an invalid public url: {e}");
                ServiceError::Internal
            })
        })
        .collect()
}
