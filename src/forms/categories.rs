use serde::Deserialize;
use validator::Validate;

use crate::domain::category::{NewCategory, UpdateCategory};
use crate::forms::{FieldErrors, FormResult, NAME_MAX_LEN_VALIDATOR, sanitize_inline_text};

/// Form payload emitted when submitting the "Add category" form.
#[derive(Debug, Deserialize, Validate)]
pub struct AddCategoryForm {
    /// Name entered by the user.
    #[validate(length(max = NAME_MAX_LEN_VALIDATOR, message = "Name is too long."))]
    pub name: String,
}

impl AddCategoryForm {
    /// Validates and sanitizes the payload into a domain `NewCategory`.
    pub fn into_new_category(self) -> FormResult<NewCategory> {
        self.validate()?;

        let name = sanitize_name(&self.name)?;

        Ok(NewCategory::new(name))
    }
}

/// Normalized payload produced by the "Edit category" form.
#[derive(Debug)]
pub struct EditCategoryPayload {
    /// Identifier of the category to update.
    pub category_id: i32,
    /// Patch data that should be applied to the category.
    pub update: UpdateCategory,
}

/// Form payload emitted when renaming an existing category.
#[derive(Debug, Deserialize, Validate)]
pub struct EditCategoryForm {
    /// Identifier of the category to update.
    #[validate(range(min = 1, message = "Unknown category."))]
    pub category_id: i32,
    /// Name submitted by the user.
    #[validate(length(max = NAME_MAX_LEN_VALIDATOR, message = "Name is too long."))]
    pub name: String,
}

impl EditCategoryForm {
    /// Validates and sanitizes the payload into a domain `UpdateCategory`.
    pub fn into_update_category(self) -> FormResult<EditCategoryPayload> {
        self.validate()?;

        let name = sanitize_name(&self.name)?;

        Ok(EditCategoryPayload {
            category_id: self.category_id,
            update: UpdateCategory::new(name),
        })
    }
}

fn sanitize_name(raw: &str) -> FormResult<String> {
    let sanitized = sanitize_inline_text(raw);
    if sanitized.is_empty() {
        return Err(FieldErrors::single("name", "Enter a category name."));
    }
    Ok(sanitized)
}
