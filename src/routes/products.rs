use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::models::config::CommonServerConfig;
use pushkind_common::routes::{redirect, render_template};
use tera::{Context, Tera};

use crate::forms::FieldErrors;
use crate::forms::products::{ProductDetailForm, ProductForm};
use crate::repository::DieselRepository;
use crate::routes::{not_found_page, page_context, parse_form};
use crate::services::products::ProductFormData;
use crate::services::{ServiceError, products};

#[get("/products")]
pub async fn show_products(
    params: web::Query<products::ProductsQuery>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<CommonServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match products::load_products_page(repo.get_ref(), &user, params.0) {
        Ok(data) => {
            let mut context = page_context(&flash_messages, &user, "products", &server_config);
            let has_active_filters = data.search.is_some() || data.category_id.is_some();
            context.insert("products", &data.products);
            context.insert("categories", &data.categories);
            context.insert("search", &data.search);
            context.insert("category_id", &data.category_id);
            context.insert("sort", &data.sort);
            context.insert("has_active_filters", &has_active_filters);
            render_template(&tera, "products/index.html", &context)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/na")
        }
        Err(err) => {
            log::error!("Failed to list products: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/products/new")]
pub async fn new_product(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<CommonServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match products::load_product_form(repo.get_ref(), &user, None) {
        Ok(data) => {
            let context = page_context(&flash_messages, &user, "products", &server_config);
            render_product_form(&tera, context, &data)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/na")
        }
        Err(err) => {
            log::error!("Failed to load product form: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/products")]
pub async fn add_product(
    body: web::Bytes,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<CommonServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let form: ProductForm = match parse_form(&body) {
        Ok(form) => form,
        Err(err) => {
            log::warn!("Rejected malformed product form: {err}");
            FlashMessage::error("The submitted form could not be read.").send();
            return redirect("/products/new");
        }
    };

    match products::create_product(repo.get_ref(), &user, &form) {
        Ok(product) => {
            FlashMessage::success(format!("Product `{}` created.", product.name)).send();
            redirect(&format!("/products/{}", product.id))
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/na")
        }
        Err(err) => match err.field_errors() {
            Some(errors) => {
                let context = page_context(&flash_messages, &user, "products", &server_config);
                rerender_product_form(&repo, &user, &tera, context, None, form, errors)
            }
            None => {
                log::error!("Failed to create product: {err}");
                FlashMessage::error("Could not create the product.").send();
                redirect("/products")
            }
        },
    }
}

#[get("/products/{product_id}")]
pub async fn show_product(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<CommonServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let product_id = path.into_inner();
    let mut context = page_context(&flash_messages, &user, "products", &server_config);

    match products::load_product(repo.get_ref(), &user, product_id) {
        Ok(data) => {
            let measurements = data
                .product
                .detail
                .as_ref()
                .map(|detail| detail.measurements())
                .unwrap_or_default();
            context.insert("product", &data.product);
            context.insert("category", &data.category);
            context.insert("measurements", &measurements);
            render_template(&tera, "products/detail.html", &context)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/na")
        }
        Err(ServiceError::NotFound) => not_found_page(&tera, &context),
        Err(err) => {
            log::error!("Failed to load product {product_id}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/products/{product_id}/edit")]
pub async fn edit_product(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<CommonServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let product_id = path.into_inner();
    let context = page_context(&flash_messages, &user, "products", &server_config);

    match products::load_product_form(repo.get_ref(), &user, Some(product_id)) {
        Ok(data) => render_product_form(&tera, context, &data),
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/na")
        }
        Err(ServiceError::NotFound) => not_found_page(&tera, &context),
        Err(err) => {
            log::error!("Failed to load product form for {product_id}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/products/{product_id}/edit")]
pub async fn update_product(
    path: web::Path<i32>,
    body: web::Bytes,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<CommonServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let product_id = path.into_inner();
    let edit_url = format!("/products/{product_id}/edit");

    let form: ProductForm = match parse_form(&body) {
        Ok(form) => form,
        Err(err) => {
            log::warn!("Rejected malformed product form: {err}");
            FlashMessage::error("The submitted form could not be read.").send();
            return redirect(&edit_url);
        }
    };

    match products::modify_product(repo.get_ref(), &user, product_id, &form) {
        Ok(product) => {
            FlashMessage::success(format!("Product `{}` updated.", product.name)).send();
            redirect(&format!("/products/{}", product.id))
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/na")
        }
        Err(ServiceError::NotFound) => {
            let context = page_context(&flash_messages, &user, "products", &server_config);
            not_found_page(&tera, &context)
        }
        Err(err) => match err.field_errors() {
            Some(errors) => {
                let context = page_context(&flash_messages, &user, "products", &server_config);
                rerender_product_form(&repo, &user, &tera, context, Some(product_id), form, errors)
            }
            None => {
                log::error!("Failed to update product {product_id}: {err}");
                FlashMessage::error("Could not update the product.").send();
                redirect(&edit_url)
            }
        },
    }
}

#[post("/products/{product_id}/detail")]
pub async fn update_product_detail(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Form<ProductDetailForm>,
) -> impl Responder {
    let product_id = path.into_inner();
    let product_url = format!("/products/{product_id}");

    match products::sync_product_detail(repo.get_ref(), &user, product_id, &form) {
        Ok(Some(_)) => {
            FlashMessage::success("Measurements saved.").send();
            redirect(&product_url)
        }
        Ok(None) => {
            FlashMessage::info("No measurements to save.").send();
            redirect(&product_url)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/na")
        }
        Err(ServiceError::Form(errors)) => {
            FlashMessage::error(errors.to_string()).send();
            redirect(&product_url)
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Product not found.").send();
            redirect("/products")
        }
        Err(err) => {
            log::error!("Failed to save measurements for product {product_id}: {err}");
            FlashMessage::error("Could not save the measurements.").send();
            redirect(&product_url)
        }
    }
}

#[post("/products/{product_id}/delete")]
pub async fn delete_product(
    path: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let product_id = path.into_inner();

    match products::remove_product(repo.get_ref(), &user, product_id) {
        Ok(()) => {
            FlashMessage::success("Product deleted.").send();
            redirect("/products")
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/na")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Product not found or already deleted.").send();
            redirect("/products")
        }
        Err(err) => {
            log::error!("Failed to delete product {product_id}: {err}");
            FlashMessage::error("Could not delete the product.").send();
            redirect("/products")
        }
    }
}

fn render_product_form(tera: &Tera, mut context: Context, data: &ProductFormData) -> HttpResponse {
    context.insert("product_id", &data.product_id);
    context.insert("form", &data.form);
    context.insert("errors", &data.errors);
    context.insert("categories", &data.categories);
    context.insert("tags", &data.tags);
    render_template(tera, "products/form.html", &context)
}

fn rerender_product_form(
    repo: &DieselRepository,
    user: &AuthenticatedUser,
    tera: &Tera,
    context: Context,
    product_id: Option<i32>,
    form: ProductForm,
    errors: FieldErrors,
) -> HttpResponse {
    match products::reload_product_form(repo, user, product_id, form, errors) {
        Ok(data) => render_product_form(tera, context, &data),
        Err(err) => {
            log::error!("Failed to reload product form: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
