use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;
use validator::ValidationErrors;

pub mod categories;
pub mod products;
pub mod tags;

/// Maximum allowed length for category, tag and product names.
pub const NAME_MAX_LEN: usize = 255;
pub(crate) const NAME_MAX_LEN_VALIDATOR: u64 = NAME_MAX_LEN as u64;

/// Result type returned by the form helpers.
pub type FormResult<T> = Result<T, FieldErrors>;

/// Validation failures keyed by form field name.
///
/// Only the first message reported for a field is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors consisting of a single field message.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(field, message)| (field.as_str(), message.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (field, message)) in self.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

impl From<ValidationErrors> for FieldErrors {
    fn from(value: ValidationErrors) -> Self {
        let mut errors = FieldErrors::new();
        for (field, field_errors) in value.field_errors() {
            if let Some(error) = field_errors.first() {
                let message = error
                    .message
                    .as_ref()
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                errors.add(field.to_string(), message);
            }
        }
        errors
    }
}

/// Collapse whitespace runs and strip control characters from single-line input.
pub(crate) fn sanitize_inline_text(input: &str) -> String {
    let mut sanitized = String::with_capacity(input.len());
    let mut previous_whitespace = false;

    for ch in input.trim().chars() {
        if ch.is_whitespace() {
            if !previous_whitespace {
                sanitized.push(' ');
                previous_whitespace = true;
            }
        } else if ch.is_control() {
            continue;
        } else {
            sanitized.push(ch);
            previous_whitespace = false;
        }
    }

    sanitized
}

/// Sanitize every line and squeeze consecutive blank lines into one.
pub(crate) fn sanitize_multiline_text(input: &str) -> String {
    let mut lines: Vec<String> = input.lines().map(sanitize_inline_text).collect();

    while matches!(lines.first(), Some(line) if line.is_empty()) {
        lines.remove(0);
    }

    while matches!(lines.last(), Some(line) if line.is_empty()) {
        lines.pop();
    }

    if lines.is_empty() {
        return String::new();
    }

    let mut result = Vec::with_capacity(lines.len());
    let mut previous_empty = false;
    for line in lines {
        let is_empty = line.is_empty();
        if is_empty {
            if previous_empty {
                continue;
            }
            previous_empty = true;
            result.push(String::new());
        } else {
            previous_empty = false;
            result.push(line);
        }
    }

    result.join("\n")
}

/// Parse a non-negative decimal with at most two decimal places and
/// `max_digits` significant digits in total.
pub(crate) fn parse_decimal(raw: &str, max_digits: u32) -> Result<Decimal, String> {
    let trimmed = raw.trim();
    let mut value =
        Decimal::from_str(trimmed).map_err(|_| format!("`{trimmed}` is not a valid number."))?;

    if value.is_zero() {
        value = Decimal::ZERO;
    } else if value.is_sign_negative() {
        return Err("Must not be negative.".to_string());
    }

    if value.normalize().scale() > 2 {
        return Err("Use at most 2 decimal places.".to_string());
    }

    let integer_digits = max_digits.saturating_sub(2);
    if value.trunc() >= Decimal::from(10_i64.pow(integer_digits)) {
        return Err(format!(
            "Use at most {integer_digits} digits before the decimal point."
        ));
    }

    value.rescale(2);
    Ok(value)
}

/// Parse an optional decimal field; blank input means "no value".
pub(crate) fn parse_optional_decimal(
    raw: Option<&str>,
    max_digits: u32,
) -> Result<Option<Decimal>, String> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_decimal(value, max_digits).map(Some),
    }
}

/// Parse a required positive identifier submitted as text.
pub(crate) fn parse_identifier(raw: Option<&str>) -> Option<i32> {
    raw.map(str::trim)
        .and_then(|value| value.parse::<i32>().ok())
        .filter(|value| *value > 0)
}
