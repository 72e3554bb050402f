use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use serde::Deserialize;
use thiserror::Error;

use crate::domain::storage::ImageFile;
use crate::domain::types::{BrandName, TypeConstraintError};
use crate::forms::products::read_temp_image;

#[derive(Debug, Error)]
pub enum BrandFormError {
    #[error("Brand form contains invalid data: {0}")]
    TypeConstraint(String),
    #[error("Uploaded file could not be read: {0}")]
    Upload(String),
}

impl From<TypeConstraintError> for BrandFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

/// Create or update a brand. The logo is optional; on update, omitting it
/// keeps the current one.
#[derive(MultipartForm)]
pub struct BrandForm {
    pub name: Text<String>,
    #[multipart(limit = "10MB")]
    pub logo: Option<TempFile>,
}

#[derive(Debug)]
pub struct BrandFormPayload {
    pub name: BrandName,
    pub logo: Option<ImageFile>,
}

impl TryFrom<BrandForm> for BrandFormPayload {
    type Error = BrandFormError;

    fn try_from(value: BrandForm) -> Result<Self, Self::Error> {
        let name = BrandName::new(value.name.into_inner())?;
        let logo = match value.logo.as_ref().filter(|file| file.size > 0) {
            Some(file) => {
                Some(read_temp_image(file).map_err(|e| BrandFormError::Upload(e.to_string()))?)
            }
            None => None,
        };
        Ok(Self { name, logo })
    }
}

/// Quick-add from the product editor: name only.
#[derive(Deserialize)]
pub struct QuickAddBrandForm {
    pub name: String,
}

impl TryFrom<QuickAddBrandForm> for BrandFormPayload {
    type Error = BrandFormError;

    fn try_from(value: QuickAddBrandForm) -> Result<Self, Self::Error> {
        Ok(Self {
            name: BrandName::new(value.name)?,
            logo: None,
        })
    }
}
