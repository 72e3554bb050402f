use thiserror::Error;

/// Generic error type used by service layer functions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// Requested resource was not found.
    #[error("not found")]
    NotFound,
    /// Operator input was rejected; the message is meant for display.
    #[error("{0}")]
    Form(String),
    /// A value failed domain constraints.
    #[error("{0}")]
    TypeConstraint(String),
    /// The operation clashes with existing data.
    #[error("{0}")]
    Conflict(String),
    /// Object storage is not ready or refused the request.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
    /// An unexpected internal error occurred.
    #[error("internal error")]
    Internal,
}

/// Convenient alias for results returned from service functions.
pub type ServiceResult<T> = Result<T, ServiceError>;
