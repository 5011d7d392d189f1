//! Infrastructure and service-level error types.

use thiserror::Error;

use galley_auth::{AuthzError, CredentialError};
use galley_core::DomainError;

pub type StoreResult<T> = Result<T, StoreError>;
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Storage operation error.
///
/// These are **infrastructure errors** as opposed to domain errors
/// (validation, shortfalls). They are surfaced verbatim and never retried.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be decoded into a domain value.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    /// The in-memory store's lock was poisoned by a panicking writer.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn corrupt(msg: impl Into<String>) -> Self {
        Self::Corrupt(msg.into())
    }
}

/// Failure of the atomic serve operation: either the domain rejected the
/// portion (nothing was written) or storage failed (the transaction was
/// rolled back).
#[derive(Debug, Error)]
pub enum ServeFailure {
    #[error(transparent)]
    Rejected(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<sqlx::Error> for ServeFailure {
    fn from(value: sqlx::Error) -> Self {
        Self::Store(StoreError::Database(value))
    }
}

/// Error returned by every kitchen operation to its caller.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    PermissionDenied(#[from] AuthzError),

    #[error("persistence error: {0}")]
    Persistence(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Domain(DomainError::Validation(_)) => "validation_error",
            ServiceError::Domain(DomainError::RecipeNotFound(_)) => "recipe_not_found",
            ServiceError::Domain(DomainError::InsufficientStock(_)) => "insufficient_stock",
            ServiceError::Domain(DomainError::NotFound(_)) => "not_found",
            ServiceError::PermissionDenied(_) => "permission_denied",
            ServiceError::Persistence(_) => "persistence_error",
            ServiceError::Internal(_) => "internal_error",
        }
    }

    /// Ordered, human-readable messages for the caller.
    pub fn messages(&self) -> Vec<String> {
        match self {
            ServiceError::Domain(e) => e.messages(),
            other => vec![other.to_string()],
        }
    }
}

impl From<ServeFailure> for ServiceError {
    fn from(value: ServeFailure) -> Self {
        match value {
            ServeFailure::Rejected(e) => ServiceError::Domain(e),
            ServeFailure::Store(e) => ServiceError::Persistence(e),
        }
    }
}

impl From<CredentialError> for ServiceError {
    fn from(value: CredentialError) -> Self {
        ServiceError::Internal(value.to_string())
    }
}
