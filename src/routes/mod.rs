use actix_web::{HttpResponse, web};
use actix_web_flash_messages::{IncomingFlashMessages, Level};
use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::models::config::CommonServerConfig;
use pushkind_common::routes::base_context;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tera::{Context, Tera};

pub mod api;
pub mod categories;
pub mod main;
pub mod products;
pub mod tags;

/// Flash message prepared for the layout template.
#[derive(Debug, Serialize)]
struct Alert<'a> {
    class: &'static str,
    message: &'a str,
}

fn alert_class(level: Level) -> &'static str {
    match level {
        Level::Error => "danger",
        Level::Warning => "warning",
        Level::Success => "success",
        Level::Info | Level::Debug => "info",
    }
}

/// Shared context for every HTML page: the common base plus the flash alerts.
pub(crate) fn page_context(
    flash_messages: &IncomingFlashMessages,
    user: &AuthenticatedUser,
    current_page: &str,
    server_config: &CommonServerConfig,
) -> Context {
    let mut context = base_context(
        flash_messages,
        user,
        current_page,
        &server_config.auth_service_url,
    );

    let alerts: Vec<Alert<'_>> = flash_messages
        .iter()
        .map(|message| Alert {
            class: alert_class(message.level()),
            message: message.content(),
        })
        .collect();
    context.insert("alerts", &alerts);
    context.insert("section", current_page);
    context
}

/// Render the 404 page.
pub(crate) fn not_found_page(tera: &Tera, context: &Context) -> HttpResponse {
    match tera.render("errors/404.html", context) {
        Ok(body) => HttpResponse::NotFound()
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(err) => {
            log::error!("Failed to render 404 page: {err}");
            HttpResponse::NotFound().finish()
        }
    }
}

/// Decode an urlencoded body that may repeat keys, such as a multi-select.
pub(crate) fn parse_form<T: DeserializeOwned>(body: &web::Bytes) -> Result<T, String> {
    serde_html_form::from_bytes(body).map_err(|err| err.to_string())
}
