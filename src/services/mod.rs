use thiserror::Error;

use crate::forms::FieldErrors;
use crate::repository::RepositoryError;

pub mod categories;
pub mod products;
pub mod tags;

/// Result type returned by every service function.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failures reported by the service layer to the HTTP handlers.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The user lacks the role required to use the catalog.
    #[error("unauthorized")]
    Unauthorized,
    /// The requested record does not exist.
    #[error("not found")]
    NotFound,
    /// Submitted data failed validation.
    #[error("invalid input: {0}")]
    Form(FieldErrors),
    /// Another record already uses the value of `field`.
    #[error("`{field}` is already taken")]
    Conflict { field: String },
    /// The record is still referenced and cannot be deleted.
    #[error("in use by {references} record(s)")]
    InUse { references: usize },
    /// Unexpected storage failure.
    #[error("internal error: {0}")]
    Internal(#[source] RepositoryError),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ServiceError::NotFound,
            RepositoryError::UniqueViolation { column } => ServiceError::Conflict { field: column },
            RepositoryError::InUse { references } => ServiceError::InUse { references },
            other => ServiceError::Internal(other),
        }
    }
}

impl From<FieldErrors> for ServiceError {
    fn from(errors: FieldErrors) -> Self {
        ServiceError::Form(errors)
    }
}

impl ServiceError {
    /// Field errors to show next to the form inputs, if the failure is tied to input.
    pub fn field_errors(&self) -> Option<FieldErrors> {
        match self {
            ServiceError::Form(errors) => Some(errors.clone()),
            ServiceError::Conflict { field } => Some(FieldErrors::single(
                field.clone(),
                "This name is already taken.",
            )),
            _ => None,
        }
    }
}
