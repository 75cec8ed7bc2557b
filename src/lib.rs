pub mod db;
pub mod domain;
pub mod forms;
pub mod models;
pub mod repository;
pub mod routes;
pub mod schema;
pub mod services;

/// Role a user must hold to manage the catalog.
pub const SERVICE_ACCESS_ROLE: &str = "catalog";
