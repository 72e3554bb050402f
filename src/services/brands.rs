use crate::domain::brand::NewBrand;
use crate::domain::storage::UploadTarget;
use crate::domain::types::{BrandId, ImageUrl};
use crate::dto::brands::BrandDto;
use crate::forms::brands::BrandFormPayload;
use crate::repository::{BrandReader, BrandWriter, RepositoryError};
use crate::services::storage::{StorageBootstrap, upload_images};
use crate::storage::ObjectStorage;

use super::{ServiceError, ServiceResult};

/// Shown instead of the raw foreign-key failure.
pub const BRAND_IN_USE_MESSAGE: &str = "Cannot delete brand - it's being used by products";

pub fn show_brands<R>(repo: &R) -> ServiceResult<Vec<BrandDto>>
where
    R: BrandReader,
{
    match repo.list_brands() {
        Ok(brands) => Ok(brands.into_iter().map(BrandDto::from).collect()),
        Err(e) => {
            log::error!("Failed to list brands: {e}");
            Err(ServiceError::Internal)
        }
    }
}

fn save_error(e: RepositoryError) -> ServiceError {
    match e {
        RepositoryError::UniqueViolation(_) => {
            ServiceError::Conflict("A brand with this name already exists".to_string())
        }
        e => {
            log::error!("Failed to save brand: {e}");
            ServiceError::Internal
        }
    }
}

async fn upload_logo<S>(
    payload: &mut BrandFormPayload,
    bootstrap: &StorageBootstrap,
    storage: &S,
) -> ServiceResult<Option<ImageUrl>>
where
    S: ObjectStorage + ?Sized,
{
    match payload.logo.take() {
        Some(logo) => {
            let mut urls =
                upload_images(vec![logo], UploadTarget::BrandLogo, bootstrap, storage).await?;
            Ok(urls.pop())
        }
        None => Ok(None),
    }
}

/// Creates a brand, uploading its logo first when one was picked.
pub async fn add_brand<R, S>(
    mut payload: BrandFormPayload,
    bootstrap: &StorageBootstrap,
    storage: &S,
    repo: &R,
) -> ServiceResult<BrandId>
where
    R: BrandWriter,
    S: ObjectStorage + ?Sized,
{
    let logo_url = upload_logo(&mut payload, bootstrap, storage).await?;

    let brand = NewBrand {
        name: payload.name,
        logo_url,
    };
    repo.create_brand(&brand).map_err(save_error)
}

/// Renames a brand and replaces its logo if a new one was picked.
pub async fn update_brand<R, S>(
    brand_id: i32,
    mut payload: BrandFormPayload,
    bootstrap: &StorageBootstrap,
    storage: &S,
    repo: &R,
) -> ServiceResult<()>
where
    R: BrandReader + BrandWriter,
    S: ObjectStorage + ?Sized,
{
    let brand_id = BrandId::new(brand_id).map_err(|_| ServiceError::NotFound)?;
    let existing = match repo.get_brand_by_id(brand_id) {
        Ok(Some(brand)) => brand,
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get brand: {e}");
            return Err(ServiceError::Internal);
        }
    };

    let logo_url = upload_logo(&mut payload, bootstrap, storage)
        .await?
        .or(existing.logo_url);

    let brand = NewBrand {
        name: payload.name,
        logo_url,
    };
    match repo.update_brand(brand_id, &brand) {
        Ok(0) => Err(ServiceError::NotFound),
        Ok(_) => Ok(()),
        Err(e) => Err(save_error(e)),
    }
}

pub fn delete_brand<R>(brand_id: i32, repo: &R) -> ServiceResult<()>
where
    R: BrandWriter,
{
    let brand_id = BrandId::new(brand_id).map_err(|_| ServiceError::NotFound)?;

    match repo.delete_brand(brand_id) {
        Ok(0) => Err(ServiceError::NotFound),
        Ok(_) => Ok(()),
        Err(RepositoryError::ConstraintViolation(_)) => {
            Err(ServiceError::Conflict(BRAND_IN_USE_MESSAGE.to_string()))
        }
        Err(e) => {
            log::error!("Failed to delete brand: {e}");
            Err(ServiceError::Internal)
        }
    }
}
