use crate::domain::category::Category;
use crate::domain::types::CategoryId;
use crate::dto::categories::CategoryDto;
use crate::forms::categories::{
    AddCategoryFormPayload, AddSubcategoryFormPayload, RenameCategoryFormPayload,
};
use crate::repository::{CategoryReader, CategoryWriter, RepositoryError};

use super::{ServiceError, ServiceResult};

pub fn show_categories<R>(repo: &R) -> ServiceResult<Vec<CategoryDto>>
where
    R: CategoryReader,
{
    match repo.list_categories() {
        Ok(categories) => Ok(categories.into_iter().map(CategoryDto::from).collect()),
        Err(e) => {
            log::error!("Failed to list categories: {e}");
            Err(ServiceError::Internal)
        }
    }
}

fn duplicate_name(e: RepositoryError) -> ServiceError {
    match e {
        RepositoryError::UniqueViolation(_) => {
            ServiceError::Conflict("A category with this name already exists".to_string())
        }
        e => {
            log::error!("Failed to save category: {e}");
            ServiceError::Internal
        }
    }
}

fn load_category<R>(category_id: i32, repo: &R) -> ServiceResult<Category>
where
    R: CategoryReader,
{
    let category_id = CategoryId::new(category_id).map_err(|_| ServiceError::NotFound)?;
    match repo.get_category_by_id(category_id) {
        Ok(Some(category)) => Ok(category),
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get category: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Creates a category, with its first subcategory when one is given.
pub fn add_category<R>(payload: AddCategoryFormPayload, repo: &R) -> ServiceResult<CategoryId>
where
    R: CategoryWriter,
{
    repo.create_category(&payload.into_new_category())
        .map_err(duplicate_name)
}

/// Renames a category. Products follow the new name.
pub fn rename_category<R>(
    category_id: i32,
    payload: RenameCategoryFormPayload,
    repo: &R,
) -> ServiceResult<()>
where
    R: CategoryReader + CategoryWriter,
{
    let category = load_category(category_id, repo)?;

    match repo.rename_category(category.id, &payload.name) {
        Ok(0) => Err(ServiceError::NotFound),
        Ok(_) => Ok(()),
        Err(e) => Err(duplicate_name(e)),
    }
}

pub fn delete_category<R>(category_id: i32, repo: &R) -> ServiceResult<()>
where
    R: CategoryReader + CategoryWriter,
{
    let category = load_category(category_id, repo)?;

    match repo.delete_category(category.id) {
        Ok(0) => Err(ServiceError::NotFound),
        Ok(_) => Ok(()),
        Err(RepositoryError::ConstraintViolation(_)) => Err(ServiceError::Conflict(
            "Cannot delete category - it's being used by products".to_string(),
        )),
        Err(e) => {
            log::error!("Failed to delete category: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Appends a subcategory. Names are unique within a category, ignoring case.
pub fn add_subcategory<R>(
    category_id: i32,
    payload: AddSubcategoryFormPayload,
    repo: &R,
) -> ServiceResult<()>
where
    R: CategoryReader + CategoryWriter,
{
    let category = load_category(category_id, repo)?;

    if category.has_subcategory(&payload.name) {
        return Err(ServiceError::Conflict(format!(
            "Subcategory '{}' already exists in '{}'",
            payload.name, category.name
        )));
    }

    let mut subcategories = category.subcategories;
    subcategories.push(payload.name);

    match repo.set_subcategories(category.id, &subcategories) {
        Ok(0) => Err(ServiceError::NotFound),
        Ok(_) => Ok(()),
        Err(e) => {
            log::error!("Failed to add subcategory: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Removes the subcategory at `position` in display order.
pub fn remove_subcategory<R>(category_id: i32, position: usize, repo: &R) -> ServiceResult<()>
where
    R: CategoryReader + CategoryWriter,
{
    let category = load_category(category_id, repo)?;

    let mut subcategories = category.subcategories;
    if position >= subcategories.len() {
        return Err(ServiceError::NotFound);
    }
    subcategories.remove(position);

    match repo.set_subcategories(category.id, &subcategories) {
        Ok(0) => Err(ServiceError::NotFound),
        Ok(_) => Ok(()),
        Err(e) => {
            log::error!("Failed to remove subcategory: {e}");
            Err(ServiceError::Internal)
        }
    }
}
