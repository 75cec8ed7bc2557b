use chrono::{Local, NaiveDateTime};
use pushkind_common::pagination::Pagination;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product_detail::{Measurements, ProductDetail};
use crate::domain::tag::Tag;

/// Domain representation of a catalog product.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Product {
    /// Unique identifier of the product.
    pub id: i32,
    /// Human-readable name of the product, unique across the catalog.
    pub name: String,
    /// Longer description shown to users.
    pub description: String,
    /// Unit price with two decimal places.
    pub price: Decimal,
    /// Units in stock.
    pub stock: i32,
    /// Category the product belongs to.
    pub category_id: i32,
    /// Tags attached to the product, sorted by name.
    pub tags: Vec<Tag>,
    /// Physical details, when any were recorded.
    pub detail: Option<ProductDetail>,
    /// Timestamp for when the product record was created.
    pub created_at: NaiveDateTime,
    /// Timestamp for the last update to the product record.
    pub updated_at: NaiveDateTime,
}

/// Payload required to insert a new product together with its tags and details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    /// Human-readable name of the product.
    pub name: String,
    /// Longer description shown to users.
    pub description: String,
    /// Unit price with two decimal places.
    pub price: Decimal,
    /// Units in stock.
    pub stock: i32,
    /// Category the product belongs to.
    pub category_id: i32,
    /// Identifiers of the tags to attach.
    pub tag_ids: Vec<i32>,
    /// Measurements handed to the detail synchronizer.
    pub measurements: Measurements,
}

impl NewProduct {
    /// Build a new product payload with no stock, tags or measurements.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: Decimal,
        category_id: i32,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            price,
            stock: 0,
            category_id,
            tag_ids: Vec::new(),
            measurements: Measurements::default(),
        }
    }

    /// Set the number of units in stock.
    pub fn with_stock(mut self, stock: i32) -> Self {
        self.stock = stock;
        self
    }

    /// Replace the set of attached tags.
    pub fn with_tag_ids(mut self, tag_ids: impl Into<Vec<i32>>) -> Self {
        self.tag_ids = tag_ids.into();
        self
    }

    /// Attach measurements for the detail synchronizer.
    pub fn with_measurements(mut self, measurements: Measurements) -> Self {
        self.measurements = measurements;
        self
    }
}

/// Full replacement applied when editing an existing product.
///
/// Category and tags are replaced, not merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    pub category_id: i32,
    pub tag_ids: Vec<i32>,
    pub measurements: Measurements,
    /// Timestamp captured when the patch was created.
    pub updated_at: NaiveDateTime,
}

impl From<NewProduct> for UpdateProduct {
    fn from(value: NewProduct) -> Self {
        Self {
            name: value.name,
            description: value.description,
            price: value.price,
            stock: value.stock,
            category_id: value.category_id,
            tag_ids: value.tag_ids,
            measurements: value.measurements,
            updated_at: Local::now().naive_utc(),
        }
    }
}

/// Ordering applied to product listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    /// Most recently created first.
    #[default]
    Newest,
    /// Alphabetical by name.
    Name,
}

/// Query definition used to list products.
#[derive(Debug, Clone, Default)]
pub struct ProductListQuery {
    /// Optional name or description search term.
    pub search: Option<String>,
    /// Optional category filter.
    pub category_id: Option<i32>,
    /// Ordering of the results.
    pub sort: ProductSort,
    /// Optional pagination options applied to the query.
    pub pagination: Option<Pagination>,
}

impl ProductListQuery {
    /// Construct a query that targets all products, newest first.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter the results by a search term applied to the name or description.
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Restrict the results to a single category.
    pub fn category(mut self, category_id: i32) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Change the ordering of the results.
    pub fn sort(mut self, sort: ProductSort) -> Self {
        self.sort = sort;
        self
    }

    /// Apply pagination to the query with the given page number and page size.
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}
