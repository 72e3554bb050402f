use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::draft::{DraftAction, DraftField, ImageSlot, ProductDraft};
use crate::domain::storage::ImageFile;
use crate::domain::types::{ProductId, TypeConstraintError};

#[derive(Debug, Error)]
pub enum ProductFormError {
    #[error("Product form validation failed: {0}")]
    Validation(String),
    #[error("Product form contains invalid data: {0}")]
    TypeConstraint(String),
    #[error("Uploaded file could not be read: {0}")]
    Upload(String),
}

impl From<ValidationErrors> for ProductFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for ProductFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

/// Text fields of the product editor as posted by the browser.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ProductDraftForm {
    #[serde(default)]
    #[validate(length(max = 255))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub category: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub subcategory: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub brand: String,
    #[serde(default)]
    #[validate(length(max = 32))]
    pub price: String,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: String,
    #[serde(default)]
    #[validate(length(max = 32))]
    pub discount_percentage: String,
}

impl ProductDraftForm {
    /// Field edits that turn `current` into the posted values.
    ///
    /// Category is applied before subcategory. When the category changes the
    /// posted subcategory belonged to the old category and is dropped.
    pub fn into_actions(self, current: &ProductDraft) -> Result<Vec<DraftAction>, ProductFormError> {
        self.validate()?;

        let category_changed = current.field(DraftField::Category) != self.category;
        let posted = [
            (DraftField::Name, self.name),
            (DraftField::Category, self.category),
            (DraftField::Subcategory, self.subcategory),
            (DraftField::Brand, self.brand),
            (DraftField::Price, self.price),
            (DraftField::Description, self.description),
            (DraftField::DiscountPercentage, self.discount_percentage),
        ];

        Ok(posted
            .into_iter()
            .filter(|(field, value)| current.field(*field) != value)
            .filter(|(field, _)| !(category_changed && *field == DraftField::Subcategory))
            .map(|(field, value)| DraftAction::SetField(field, value))
            .collect())
    }
}

#[derive(Deserialize)]
pub struct ComboModeForm {
    #[serde(default)]
    pub enabled: bool,
}

impl From<ComboModeForm> for DraftAction {
    fn from(value: ComboModeForm) -> Self {
        DraftAction::SetCombo(value.enabled)
    }
}

#[derive(Deserialize, Validate)]
pub struct ToggleComboProductForm {
    #[validate(range(min = 1))]
    pub product_id: i32,
}

impl TryFrom<ToggleComboProductForm> for DraftAction {
    type Error = ProductFormError;

    fn try_from(value: ToggleComboProductForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(DraftAction::ToggleComboProduct(ProductId::new(
            value.product_id,
        )?))
    }
}

#[derive(Deserialize)]
pub struct RemoveImageForm {
    pub slot: String,
    pub index: usize,
}

impl TryFrom<RemoveImageForm> for DraftAction {
    type Error = ProductFormError;

    fn try_from(value: RemoveImageForm) -> Result<Self, Self::Error> {
        let slot = ImageSlot::try_from(value.slot.as_str())?;
        Ok(DraftAction::RemoveImage(slot, value.index))
    }
}

/// Images picked for the main image or the gallery.
///
/// The per-field limit stays above the image cap so oversized files reach
/// validation and get a readable error.
#[derive(MultipartForm)]
pub struct UploadImagesForm {
    #[multipart(limit = "30MB")]
    pub files: Vec<TempFile>,
    pub slot: Text<String>,
}

#[derive(Debug)]
pub struct UploadImagesFormPayload {
    pub slot: ImageSlot,
    pub files: Vec<ImageFile>,
}

/// Reads the spooled temp file into an [`ImageFile`].
pub fn read_temp_image(file: &TempFile) -> Result<ImageFile, ProductFormError> {
    let bytes =
        std::fs::read(file.file.path()).map_err(|e| ProductFormError::Upload(e.to_string()))?;
    Ok(ImageFile::new(
        file.file_name.clone().unwrap_or_default(),
        file.content_type.as_ref().map(|mime| mime.essence_str()),
        bytes,
    ))
}

impl TryFrom<UploadImagesForm> for UploadImagesFormPayload {
    type Error = ProductFormError;

    fn try_from(value: UploadImagesForm) -> Result<Self, Self::Error> {
        let slot = ImageSlot::try_from(value.slot.as_str())?;
        // Browsers post an empty part when nothing was picked.
        let files = value
            .files
            .iter()
            .filter(|file| file.size > 0)
            .map(read_temp_image)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { slot, files })
    }
}
