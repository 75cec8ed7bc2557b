use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::product_detail::{Measurements, ProductDetail as DomainProductDetail};
use crate::models::{decimal_to_hundredths, hundredths_to_decimal};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::product_details)]
pub struct ProductDetail {
    pub id: i32,
    pub product_id: i32,
    pub weight_kg_hundredths: Option<i64>,
    pub height_cm_hundredths: Option<i64>,
    pub width_cm_hundredths: Option<i64>,
    pub length_cm_hundredths: Option<i64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::product_details)]
pub struct NewProductDetail {
    pub product_id: i32,
    pub weight_kg_hundredths: Option<i64>,
    pub height_cm_hundredths: Option<i64>,
    pub width_cm_hundredths: Option<i64>,
    pub length_cm_hundredths: Option<i64>,
}

/// Overwrite of every measurement column; `None` writes NULL.
#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::product_details)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateProductDetail {
    pub weight_kg_hundredths: Option<i64>,
    pub height_cm_hundredths: Option<i64>,
    pub width_cm_hundredths: Option<i64>,
    pub length_cm_hundredths: Option<i64>,
    pub updated_at: NaiveDateTime,
}

impl NewProductDetail {
    pub fn new(product_id: i32, measurements: &Measurements) -> Self {
        Self {
            product_id,
            weight_kg_hundredths: measurements.weight_kg.map(decimal_to_hundredths),
            height_cm_hundredths: measurements.height_cm.map(decimal_to_hundredths),
            width_cm_hundredths: measurements.width_cm.map(decimal_to_hundredths),
            length_cm_hundredths: measurements.length_cm.map(decimal_to_hundredths),
        }
    }
}

impl UpdateProductDetail {
    pub fn new(measurements: &Measurements, updated_at: NaiveDateTime) -> Self {
        Self {
            weight_kg_hundredths: measurements.weight_kg.map(decimal_to_hundredths),
            height_cm_hundredths: measurements.height_cm.map(decimal_to_hundredths),
            width_cm_hundredths: measurements.width_cm.map(decimal_to_hundredths),
            length_cm_hundredths: measurements.length_cm.map(decimal_to_hundredths),
            updated_at,
        }
    }
}

impl From<ProductDetail> for DomainProductDetail {
    fn from(value: ProductDetail) -> Self {
        Self {
            id: value.id,
            product_id: value.product_id,
            weight_kg: value.weight_kg_hundredths.map(hundredths_to_decimal),
            height_cm: value.height_cm_hundredths.map(hundredths_to_decimal),
            width_cm: value.width_cm_hundredths.map(hundredths_to_decimal),
            length_cm: value.length_cm_hundredths.map(hundredths_to_decimal),
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}
