use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::category::NewCategory;
use crate::domain::types::{CategoryName, SubcategoryName, TypeConstraintError};

#[derive(Debug, Error)]
pub enum CategoryFormError {
    #[error("Category form validation failed: {0}")]
    Validation(String),
    #[error("Category form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for CategoryFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for CategoryFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

fn optional_subcategory(value: Option<String>) -> Result<Option<SubcategoryName>, TypeConstraintError> {
    match value {
        Some(value) if !value.trim().is_empty() => SubcategoryName::new(value).map(Some),
        _ => Ok(None),
    }
}

/// Creates a category, optionally with its first subcategory.
#[derive(Deserialize, Validate)]
pub struct AddCategoryForm {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 100))]
    pub subcategory: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddCategoryFormPayload {
    pub name: CategoryName,
    pub subcategory: Option<SubcategoryName>,
}

impl AddCategoryFormPayload {
    pub fn into_new_category(self) -> NewCategory {
        NewCategory {
            name: self.name,
            subcategories: self.subcategory.into_iter().collect(),
        }
    }
}

impl TryFrom<AddCategoryForm> for AddCategoryFormPayload {
    type Error = CategoryFormError;

    fn try_from(value: AddCategoryForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            name: CategoryName::new(value.name)?,
            subcategory: optional_subcategory(value.subcategory)?,
        })
    }
}

#[derive(Deserialize, Validate)]
pub struct RenameCategoryForm {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenameCategoryFormPayload {
    pub name: CategoryName,
}

impl TryFrom<RenameCategoryForm> for RenameCategoryFormPayload {
    type Error = CategoryFormError;

    fn try_from(value: RenameCategoryForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            name: CategoryName::new(value.name)?,
        })
    }
}

#[derive(Deserialize, Validate)]
pub struct AddSubcategoryForm {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddSubcategoryFormPayload {
    pub name: SubcategoryName,
}

impl TryFrom<AddSubcategoryForm> for AddSubcategoryFormPayload {
    type Error = CategoryFormError;

    fn try_from(value: AddSubcategoryForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            name: SubcategoryName::new(value.name)?,
        })
    }
}
