use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::product::{NewProduct, Product, UpdateProduct};
use crate::domain::product_detail::Measurements;
use crate::forms::{
    FieldErrors, FormResult, NAME_MAX_LEN_VALIDATOR, parse_decimal, parse_identifier,
    parse_optional_decimal, sanitize_inline_text, sanitize_multiline_text,
};

/// Total digits allowed for a price: eight before the point, two after.
pub const PRICE_MAX_DIGITS: u32 = 10;

/// Total digits allowed for a measurement: four before the point, two after.
pub const MEASUREMENT_MAX_DIGITS: u32 = 6;

/// Form payload used by both the "New product" and "Edit product" pages.
///
/// Every field is kept as raw text so the form can be re-rendered with the
/// user's input when validation fails.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct ProductForm {
    #[serde(default)]
    #[validate(length(max = NAME_MAX_LEN_VALIDATOR, message = "Name is too long."))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: String,
    /// Blank means zero units.
    #[serde(default)]
    pub stock: String,
    #[serde(default)]
    pub category_id: String,
    /// Selected tags; the field repeats once per checked box.
    #[serde(default)]
    pub tag_ids: Vec<i32>,
    #[serde(default)]
    pub weight_kg: String,
    #[serde(default)]
    pub height_cm: String,
    #[serde(default)]
    pub width_cm: String,
    #[serde(default)]
    pub length_cm: String,
}

impl ProductForm {
    /// Prefill the form from a stored product.
    pub fn from_product(product: &Product) -> Self {
        let measurements = product
            .detail
            .as_ref()
            .map(|detail| detail.measurements())
            .unwrap_or_default();

        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
            stock: product.stock.to_string(),
            category_id: product.category_id.to_string(),
            tag_ids: product.tags.iter().map(|tag| tag.id).collect(),
            weight_kg: format_optional(measurements.weight_kg),
            height_cm: format_optional(measurements.height_cm),
            width_cm: format_optional(measurements.width_cm),
            length_cm: format_optional(measurements.length_cm),
        }
    }

    /// Validates and sanitizes the payload into a domain `NewProduct`.
    ///
    /// All field problems are reported together.
    pub fn into_new_product(&self) -> FormResult<NewProduct> {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(validation) => FieldErrors::from(validation),
        };

        let name = sanitize_inline_text(&self.name);
        if name.is_empty() {
            errors.add("name", "Enter a product name.");
        }

        let description = sanitize_multiline_text(&self.description);
        if description.is_empty() {
            errors.add("description", "Enter a description.");
        }

        let price = if self.price.trim().is_empty() {
            errors.add("price", "Enter a price.");
            None
        } else {
            match parse_decimal(&self.price, PRICE_MAX_DIGITS) {
                Ok(value) => Some(value),
                Err(message) => {
                    errors.add("price", message);
                    None
                }
            }
        };

        let stock = match parse_stock(&self.stock) {
            Ok(value) => value,
            Err(message) => {
                errors.add("stock", message);
                0
            }
        };

        let category_id = parse_identifier(Some(self.category_id.as_str()));
        if category_id.is_none() {
            errors.add("category_id", "Choose a category.");
        }

        let measurements = match MeasurementFields::from_form(self).parse() {
            Ok(measurements) => measurements,
            Err(measurement_errors) => {
                for (field, message) in measurement_errors.iter() {
                    errors.add(field, message);
                }
                Measurements::default()
            }
        };

        match (price, category_id) {
            (Some(price), Some(category_id)) if errors.is_empty() => {
                Ok(NewProduct::new(name, description, price, category_id)
                    .with_stock(stock)
                    .with_tag_ids(self.tag_ids.clone())
                    .with_measurements(measurements))
            }
            _ => Err(errors),
        }
    }

    /// Validates and sanitizes the payload into a full `UpdateProduct` replacement.
    pub fn into_update_product(&self) -> FormResult<UpdateProduct> {
        self.into_new_product().map(UpdateProduct::from)
    }
}

/// Form payload posted from the product page to replace its measurements.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProductDetailForm {
    #[serde(default)]
    pub weight_kg: String,
    #[serde(default)]
    pub height_cm: String,
    #[serde(default)]
    pub width_cm: String,
    #[serde(default)]
    pub length_cm: String,
}

impl ProductDetailForm {
    /// Parse the submitted values; blank fields clear the stored measurement.
    pub fn into_measurements(&self) -> FormResult<Measurements> {
        MeasurementFields {
            weight_kg: &self.weight_kg,
            height_cm: &self.height_cm,
            width_cm: &self.width_cm,
            length_cm: &self.length_cm,
        }
        .parse()
    }
}

struct MeasurementFields<'a> {
    weight_kg: &'a str,
    height_cm: &'a str,
    width_cm: &'a str,
    length_cm: &'a str,
}

impl<'a> MeasurementFields<'a> {
    fn from_form(form: &'a ProductForm) -> Self {
        Self {
            weight_kg: &form.weight_kg,
            height_cm: &form.height_cm,
            width_cm: &form.width_cm,
            length_cm: &form.length_cm,
        }
    }

    fn parse(&self) -> FormResult<Measurements> {
        let mut errors = FieldErrors::new();
        let mut parse = |field: &str, raw: &str| {
            parse_optional_decimal(Some(raw), MEASUREMENT_MAX_DIGITS).unwrap_or_else(|message| {
                errors.add(field, message);
                None
            })
        };

        let measurements = Measurements {
            weight_kg: parse("weight_kg", self.weight_kg),
            height_cm: parse("height_cm", self.height_cm),
            width_cm: parse("width_cm", self.width_cm),
            length_cm: parse("length_cm", self.length_cm),
        };

        if errors.is_empty() {
            Ok(measurements)
        } else {
            Err(errors)
        }
    }
}

fn parse_stock(raw: &str) -> Result<i32, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }

    match trimmed.parse::<i32>() {
        Ok(value) if value >= 0 => Ok(value),
        _ => Err("Stock must be a whole number of 0 or more.".to_string()),
    }
}

fn format_optional(value: Option<Decimal>) -> String {
    value.map(|value| value.to_string()).unwrap_or_default()
}
