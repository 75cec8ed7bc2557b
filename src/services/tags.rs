use chrono::Local;
use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::routes::check_role;
use serde::Deserialize;

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::tag::{Tag, TagListQuery};
use crate::forms::tags::{AddTagForm, EditTagForm};
use crate::repository::{TagReader, TagWriter};
use crate::services::{ServiceError, ServiceResult};

/// Query parameters accepted by the tags index page.
#[derive(Debug, Default, Deserialize)]
pub struct TagsQuery {
    /// Optional search string entered by the user.
    pub search: Option<String>,
}

/// Data required to render the tags index template.
pub struct TagsPageData {
    /// Tags ordered by name.
    pub tags: Vec<Tag>,
    /// Search query echoed back to the view when present.
    pub search: Option<String>,
}

/// Loads the tags overview page.
pub fn load_tags<R>(repo: &R, user: &AuthenticatedUser, query: TagsQuery) -> ServiceResult<TagsPageData>
where
    R: TagReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let search = query
        .search
        .map(|term| term.trim().to_string())
        .filter(|term| !term.is_empty());

    let mut list_query = TagListQuery::new();
    if let Some(term) = search.as_ref() {
        list_query = list_query.search(term);
    }

    let tags = repo.list_tags(list_query)?;

    Ok(TagsPageData { tags, search })
}

/// Creates a new tag.
pub fn create_tag<R>(repo: &R, user: &AuthenticatedUser, form: AddTagForm) -> ServiceResult<Tag>
where
    R: TagWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let new_tag = form.into_new_tag()?;

    repo.create_tag(&new_tag).map_err(ServiceError::from)
}

/// Renames an existing tag.
pub fn modify_tag<R>(repo: &R, user: &AuthenticatedUser, form: EditTagForm) -> ServiceResult<Tag>
where
    R: TagWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let tag_id = form.tag_id;
    let updates = form.into_update_tag(Local::now().naive_utc())?;

    repo.update_tag(tag_id, &updates).map_err(ServiceError::from)
}

/// Deletes a tag and detaches it from every product.
pub fn remove_tag<R>(repo: &R, user: &AuthenticatedUser, tag_id: i32) -> ServiceResult<()>
where
    R: TagWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    repo.delete_tag(tag_id).map_err(ServiceError::from)
}
