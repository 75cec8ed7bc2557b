use std::collections::BTreeSet;

use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use pushkind_common::routes::check_role;
use serde::Deserialize;

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::category::{Category, CategoryListQuery};
use crate::domain::product::{Product, ProductListQuery, ProductSort};
use crate::domain::product_detail::ProductDetail;
use crate::domain::tag::{Tag, TagListQuery};
use crate::forms::products::{ProductDetailForm, ProductForm};
use crate::forms::{FieldErrors, parse_identifier};
use crate::repository::{
    CategoryReader, ProductDetailWriter, ProductReader, ProductWriter, RepositoryError, TagReader,
};
use crate::services::{ServiceError, ServiceResult};

/// Query parameters accepted by the products index page and the products API.
#[derive(Debug, Default, Deserialize)]
pub struct ProductsQuery {
    /// Optional search string matched against name and description.
    pub search: Option<String>,
    /// Optional category filter; blank means every category.
    pub category_id: Option<String>,
    /// Page requested by the UI (1-based).
    pub page: Option<usize>,
    /// Ordering of the listing.
    #[serde(default)]
    pub sort: ProductSort,
}

impl ProductsQuery {
    fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_string)
    }

    fn category_filter(&self) -> Option<i32> {
        parse_identifier(self.category_id.as_deref())
    }

    fn list_query(&self) -> ProductListQuery {
        let mut list_query = ProductListQuery::new().sort(self.sort);

        if let Some(term) = self.search_term() {
            list_query = list_query.search(term);
        }

        if let Some(category_id) = self.category_filter() {
            list_query = list_query.category(category_id);
        }

        list_query
    }
}

/// Data required to render the products index template.
pub struct ProductsPageData {
    /// Paginated list of products displayed in the table.
    pub products: Paginated<Product>,
    /// Every category, used for the filter and for category names.
    pub categories: Vec<Category>,
    /// Search query echoed back to the view when present.
    pub search: Option<String>,
    /// Category filter echoed back to the view when present.
    pub category_id: Option<i32>,
    pub sort: ProductSort,
}

/// Data required to render a single product page.
pub struct ProductPageData {
    pub product: Product,
    /// Category the product belongs to.
    pub category: Option<Category>,
}

/// Data required to render the product create/edit form.
pub struct ProductFormData {
    /// Identifier of the edited product; `None` on the create page.
    pub product_id: Option<i32>,
    pub form: ProductForm,
    pub errors: FieldErrors,
    pub categories: Vec<Category>,
    pub tags: Vec<Tag>,
}

/// Loads the products overview page.
pub fn load_products_page<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: ProductsQuery,
) -> ServiceResult<ProductsPageData>
where
    R: ProductReader + CategoryReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let page = query.page.unwrap_or(1).max(1);
    let list_query = query.list_query().paginate(page, DEFAULT_ITEMS_PER_PAGE);

    let (total, items) = repo.list_products(list_query)?;
    let categories = repo.list_categories(CategoryListQuery::new())?;

    let total_pages = total.div_ceil(DEFAULT_ITEMS_PER_PAGE);
    let products = Paginated::new(items, page, total_pages);

    Ok(ProductsPageData {
        products,
        categories,
        search: query.search_term(),
        category_id: query.category_filter(),
        sort: query.sort,
    })
}

/// Lists every product matching the query without pagination.
pub fn load_products<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: ProductsQuery,
) -> ServiceResult<Vec<Product>>
where
    R: ProductReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let (_, products) = repo.list_products(query.list_query())?;

    Ok(products)
}

/// Loads a single product with its tags, detail and category.
pub fn load_product<R>(
    repo: &R,
    user: &AuthenticatedUser,
    product_id: i32,
) -> ServiceResult<ProductPageData>
where
    R: ProductReader + CategoryReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let product = repo
        .get_product_by_id(product_id)?
        .ok_or(ServiceError::NotFound)?;
    let category = repo.get_category_by_id(product.category_id)?;

    Ok(ProductPageData { product, category })
}

/// Loads the product form, prefilled when `product_id` names an existing product.
pub fn load_product_form<R>(
    repo: &R,
    user: &AuthenticatedUser,
    product_id: Option<i32>,
) -> ServiceResult<ProductFormData>
where
    R: ProductReader + CategoryReader + TagReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let form = match product_id {
        Some(product_id) => {
            let product = repo
                .get_product_by_id(product_id)?
                .ok_or(ServiceError::NotFound)?;
            ProductForm::from_product(&product)
        }
        None => ProductForm::default(),
    };

    form_data(repo, product_id, form, FieldErrors::new())
}

/// Rebuilds the product form around rejected input so it can be shown again.
pub fn reload_product_form<R>(
    repo: &R,
    user: &AuthenticatedUser,
    product_id: Option<i32>,
    form: ProductForm,
    errors: FieldErrors,
) -> ServiceResult<ProductFormData>
where
    R: CategoryReader + TagReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    form_data(repo, product_id, form, errors)
}

/// Creates a product with its tags and measurements.
pub fn create_product<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: &ProductForm,
) -> ServiceResult<Product>
where
    R: ProductWriter + CategoryReader + TagReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let new_product = form.into_new_product()?;
    check_references(repo, new_product.category_id, &new_product.tag_ids)?;

    let product = repo
        .create_product(&new_product)
        .map_err(product_write_error)?;

    log::info!("Created product {} `{}`", product.id, product.name);

    Ok(product)
}

/// Replaces every field of an existing product, including tags and measurements.
pub fn modify_product<R>(
    repo: &R,
    user: &AuthenticatedUser,
    product_id: i32,
    form: &ProductForm,
) -> ServiceResult<Product>
where
    R: ProductWriter + CategoryReader + TagReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let updates = form.into_update_product()?;
    check_references(repo, updates.category_id, &updates.tag_ids)?;

    repo.update_product(product_id, &updates)
        .map_err(product_write_error)
}

/// Deletes a product along with its detail and tag associations.
pub fn remove_product<R>(repo: &R, user: &AuthenticatedUser, product_id: i32) -> ServiceResult<()>
where
    R: ProductWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    repo.delete_product(product_id).map_err(ServiceError::from)
}

/// Overwrites the measurements of a product's detail record.
///
/// Returns `None` when the product has no detail and no value was submitted.
pub fn sync_product_detail<R>(
    repo: &R,
    user: &AuthenticatedUser,
    product_id: i32,
    form: &ProductDetailForm,
) -> ServiceResult<Option<ProductDetail>>
where
    R: ProductDetailWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let measurements = form.into_measurements()?;

    repo.sync_product_detail(product_id, &measurements)
        .map_err(ServiceError::from)
}

fn form_data<R>(
    repo: &R,
    product_id: Option<i32>,
    form: ProductForm,
    errors: FieldErrors,
) -> ServiceResult<ProductFormData>
where
    R: CategoryReader + TagReader + ?Sized,
{
    let categories = repo.list_categories(CategoryListQuery::new())?;
    let tags = repo.list_tags(TagListQuery::new())?;

    Ok(ProductFormData {
        product_id,
        form,
        errors,
        categories,
        tags,
    })
}

fn check_references<R>(repo: &R, category_id: i32, tag_ids: &[i32]) -> ServiceResult<()>
where
    R: CategoryReader + TagReader + ?Sized,
{
    let mut errors = FieldErrors::new();

    if repo.get_category_by_id(category_id)?.is_none() {
        errors.add("category_id", "Choose an existing category.");
    }

    let requested: BTreeSet<i32> = tag_ids.iter().copied().collect();
    if !requested.is_empty() {
        let ids: Vec<i32> = requested.iter().copied().collect();
        let found = repo.get_tags_by_ids(&ids)?;
        if found.len() < requested.len() {
            errors.add("tag_ids", "One or more selected tags no longer exist.");
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::Form(errors))
    }
}

/// A category or tag removed between the reference check and the write.
fn product_write_error(err: RepositoryError) -> ServiceError {
    match err {
        RepositoryError::ForeignKeyViolation(message) => {
            log::warn!("Product write rolled back: {message}");
            let mut errors = FieldErrors::new();
            errors.add("category_id", "The selected category may no longer exist.");
            errors.add("tag_ids", "The selected tags may no longer exist.");
            ServiceError::Form(errors)
        }
        other => ServiceError::from(other),
    }
}
