use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Physical details recorded for a single product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductDetail {
    /// Unique identifier of the detail record.
    pub id: i32,
    /// Identifier of the owning product; at most one detail exists per product.
    pub product_id: i32,
    /// Weight in kilograms.
    pub weight_kg: Option<Decimal>,
    /// Height in centimetres.
    pub height_cm: Option<Decimal>,
    /// Width in centimetres.
    pub width_cm: Option<Decimal>,
    /// Length in centimetres.
    pub length_cm: Option<Decimal>,
    /// Timestamp for when the detail record was created.
    pub created_at: NaiveDateTime,
    /// Timestamp for the last overwrite of the detail record.
    pub updated_at: NaiveDateTime,
}

impl ProductDetail {
    /// Measurements currently stored on the record.
    pub fn measurements(&self) -> Measurements {
        Measurements {
            weight_kg: self.weight_kg,
            height_cm: self.height_cm,
            width_cm: self.width_cm,
            length_cm: self.length_cm,
        }
    }
}

/// Complete set of measurements written by the detail synchronizer.
///
/// Every field is written on each sync: a `None` clears the stored value.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Measurements {
    pub weight_kg: Option<Decimal>,
    pub height_cm: Option<Decimal>,
    pub width_cm: Option<Decimal>,
    pub length_cm: Option<Decimal>,
}

impl Measurements {
    /// Measurements with every value absent.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn weight_kg(mut self, value: Decimal) -> Self {
        self.weight_kg = Some(value);
        self
    }

    pub fn height_cm(mut self, value: Decimal) -> Self {
        self.height_cm = Some(value);
        self
    }

    pub fn width_cm(mut self, value: Decimal) -> Self {
        self.width_cm = Some(value);
        self
    }

    pub fn length_cm(mut self, value: Decimal) -> Self {
        self.length_cm = Some(value);
        self
    }

    /// Whether no measurement was supplied at all.
    pub fn is_empty(&self) -> bool {
        self.weight_kg.is_none()
            && self.height_cm.is_none()
            && self.width_cm.is_none()
            && self.length_cm.is_none()
    }
}
