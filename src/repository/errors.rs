use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

use crate::domain::types::TypeConstraintError;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    /// A foreign key still points at the record.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
    #[error("duplicate value: {0}")]
    UniqueViolation(String),
    #[error("validation error: {0}")]
    ValidationError(String),
    #[error("connection error: {0}")]
    Connection(String),
    #[error("database error: {0}")]
    Database(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<DieselError> for RepositoryError {
    fn from(value: DieselError) -> Self {
        match value {
            DieselError::NotFound => Self::NotFound,
            DieselError::DatabaseError(kind, info) => {
                let message = info.message().to_string();
                match kind {
                    DatabaseErrorKind::ForeignKeyViolation => Self::ConstraintViolation(message),
                    DatabaseErrorKind::UniqueViolation => Self::UniqueViolation(message),
                    // Older SQLite builds report only the primary result code.
                    _ if message.contains("FOREIGN KEY constraint failed") => {
                        Self::ConstraintViolation(message)
                    }
                    _ if message.contains("UNIQUE constraint failed") => {
                        Self::UniqueViolation(message)
                    }
                    _ => Self::Database(message),
                }
            }
            other => Self::Database(other.to_string()),
        }
    }
}

impl From<diesel::r2d2::PoolError> for RepositoryError {
    fn from(value: diesel::r2d2::PoolError) -> Self {
        Self::Connection(value.to_string())
    }
}

impl From<TypeConstraintError> for RepositoryError {
    fn from(value: TypeConstraintError) -> Self {
        Self::ValidationError(value.to_string())
    }
}
