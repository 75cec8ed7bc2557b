use chrono::NaiveDateTime;
use serde::Deserialize;
use validator::Validate;

use crate::domain::tag::{NewTag, UpdateTag};
use crate::forms::{FieldErrors, FormResult, NAME_MAX_LEN_VALIDATOR, sanitize_inline_text};

/// Form payload emitted when submitting the "Add tag" form.
#[derive(Debug, Deserialize, Validate)]
pub struct AddTagForm {
    /// Name entered by the user.
    #[validate(length(max = NAME_MAX_LEN_VALIDATOR, message = "Name is too long."))]
    pub name: String,
}

impl AddTagForm {
    /// Validates and sanitizes the payload into a domain `NewTag`.
    pub fn into_new_tag(self) -> FormResult<NewTag> {
        self.validate()?;

        let sanitized_name = sanitize_inline_text(&self.name);
        if sanitized_name.is_empty() {
            return Err(FieldErrors::single("name", "Enter a tag name."));
        }

        Ok(NewTag::new(sanitized_name))
    }
}

/// Form payload emitted when editing an existing tag.
#[derive(Debug, Deserialize, Validate)]
pub struct EditTagForm {
    /// Identifier of the tag to update.
    #[validate(range(min = 1, message = "Unknown tag."))]
    pub tag_id: i32,
    /// Updated name supplied by the user.
    #[validate(length(max = NAME_MAX_LEN_VALIDATOR, message = "Name is too long."))]
    pub name: String,
}

impl EditTagForm {
    /// Validates and sanitizes the payload into a domain `UpdateTag`.
    pub fn into_update_tag(self, updated_at: NaiveDateTime) -> FormResult<UpdateTag> {
        self.validate()?;

        let sanitized_name = sanitize_inline_text(&self.name);
        if sanitized_name.is_empty() {
            return Err(FieldErrors::single("name", "Enter a tag name."));
        }

        Ok(UpdateTag {
            name: sanitized_name,
            updated_at,
        })
    }
}
