//! Error conversion glue between layers.
//!
//! The domain layer must not depend on service error types, so the
//! conversions into [`ServiceError`] live here.

use crate::domain::draft::DraftError;
use crate::domain::types::TypeConstraintError;
use crate::forms::brands::BrandFormError;
use crate::forms::categories::CategoryFormError;
use crate::forms::products::ProductFormError;
use crate::services::ServiceError;
use crate::storage::UploadError;

impl From<TypeConstraintError> for ServiceError {
    fn from(val: TypeConstraintError) -> Self {
        ServiceError::TypeConstraint(val.to_string())
    }
}

impl From<DraftError> for ServiceError {
    fn from(val: DraftError) -> Self {
        ServiceError::Form(val.to_string())
    }
}

impl From<UploadError> for ServiceError {
    fn from(val: UploadError) -> Self {
        ServiceError::Form(val.to_string())
    }
}

impl From<ProductFormError> for ServiceError {
    fn from(val: ProductFormError) -> Self {
        ServiceError::Form(val.to_string())
    }
}

impl From<CategoryFormError> for ServiceError {
    fn from(val: CategoryFormError) -> Self {
        ServiceError::Form(val.to_string())
    }
}

impl From<BrandFormError> for ServiceError {
    fn from(val: BrandFormError) -> Self {
        ServiceError::Form(val.to_string())
    }
}
