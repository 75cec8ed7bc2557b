use diesel::r2d2::PoolError;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

/// Result type returned by repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors surfaced by the storage layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The targeted record does not exist.
    #[error("record not found")]
    NotFound,
    /// A unique index rejected the write.
    #[error("unique constraint violated on `{column}`")]
    UniqueViolation { column: String },
    /// A write referenced a record that does not exist.
    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),
    /// The record cannot be deleted while other records reference it.
    #[error("record is referenced by {references} other record(s)")]
    InUse { references: usize },
    /// No connection could be checked out of the pool.
    #[error("connection pool error: {0}")]
    Pool(#[from] PoolError),
    /// Any other database failure.
    #[error("database error: {0}")]
    Database(DieselError),
}

impl From<DieselError> for RepositoryError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => RepositoryError::NotFound,
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                RepositoryError::UniqueViolation {
                    column: unique_violation_column(info.message()),
                }
            }
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                RepositoryError::ForeignKeyViolation(info.message().to_string())
            }
            other => RepositoryError::Database(other),
        }
    }
}

/// Extract the offending column from a SQLite unique violation message such as
/// `UNIQUE constraint failed: categories.name`.
///
/// Composite indexes report every column; the last one is kept.
fn unique_violation_column(message: &str) -> String {
    message
        .rsplit([':', ',', '.'])
        .next()
        .map(str::trim)
        .filter(|column| !column.is_empty())
        .unwrap_or(message)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_column_is_parsed_from_sqlite_message() {
        assert_eq!(
            unique_violation_column("UNIQUE constraint failed: categories.name"),
            "name"
        );
        assert_eq!(
            unique_violation_column(
                "UNIQUE constraint failed: product_tags.product_id, product_tags.tag_id"
            ),
            "tag_id"
        );
    }

    #[test]
    fn unique_violation_column_falls_back_to_message() {
        assert_eq!(unique_violation_column("constraint failed"), "constraint failed");
    }

    #[test]
    fn diesel_not_found_maps_to_not_found() {
        let err = RepositoryError::from(DieselError::NotFound);
        assert!(matches!(err, RepositoryError::NotFound));
    }
}
