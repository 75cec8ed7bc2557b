use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::routes::check_role;
use serde::Deserialize;

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::category::{Category, CategoryListQuery};
use crate::forms::categories::{AddCategoryForm, EditCategoryForm};
use crate::repository::{CategoryReader, CategoryWriter};
use crate::services::{ServiceError, ServiceResult};

/// Query parameters accepted by the categories page.
#[derive(Debug, Default, Deserialize)]
pub struct CategoriesQuery {
    /// Optional search string entered by the user.
    pub search: Option<String>,
}

/// Data required to render the categories index template.
pub struct CategoriesPageData {
    /// Categories ordered by name.
    pub categories: Vec<Category>,
    /// Search query echoed back to the view when present.
    pub search: Option<String>,
}

/// Loads the categories overview page.
pub fn load_categories<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: CategoriesQuery,
) -> ServiceResult<CategoriesPageData>
where
    R: CategoryReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let search = query
        .search
        .map(|term| term.trim().to_string())
        .filter(|term| !term.is_empty());

    let mut list_query = CategoryListQuery::new();
    if let Some(term) = search.as_ref() {
        list_query = list_query.search(term);
    }

    let categories = repo.list_categories(list_query)?;

    Ok(CategoriesPageData { categories, search })
}

/// Creates a new category.
pub fn create_category<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: AddCategoryForm,
) -> ServiceResult<Category>
where
    R: CategoryWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let new_category = form.into_new_category()?;

    repo.create_category(&new_category)
        .map_err(ServiceError::from)
}

/// Renames an existing category.
pub fn modify_category<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: EditCategoryForm,
) -> ServiceResult<Category>
where
    R: CategoryWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let payload = form.into_update_category()?;

    repo.update_category(payload.category_id, &payload.update)
        .map_err(ServiceError::from)
}

/// Deletes a category that no product references.
pub fn remove_category<R>(repo: &R, user: &AuthenticatedUser, category_id: i32) -> ServiceResult<()>
where
    R: CategoryWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    match repo.delete_category(category_id).map_err(ServiceError::from) {
        Err(ServiceError::InUse { references }) => {
            log::warn!(
                "Refusing to delete category {category_id}: referenced by {references} product(s)"
            );
            Err(ServiceError::InUse { references })
        }
        other => other,
    }
}
