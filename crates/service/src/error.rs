use thiserror::Error;

use yad_auth::AuthzError;
use yad_core::DomainError;
use yad_infra::RepositoryError;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure of an engine operation.
///
/// Every failure is detected before the call persists anything, except
/// `Repository`, which reports that the store itself could not be reached.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The referenced order/item/courier does not exist, or does not belong to
    /// the resource it was addressed through.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("validation failed: {0}")]
    Validation(String),

    /// Status delta other than +1, or an actor not entitled to the target status.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// Collides with current state: delete after payment, courier jump or
    /// double-booking, lost optimistic write, assignment search exhausted.
    #[error("conflict: {0}")]
    Conflict(String),

    /// No courier is waiting.
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// Timeout or poisoned lock in the repository.
    #[error("repository failure: {0}")]
    Repository(RepositoryError),
}

impl ServiceError {
    /// Stable machine-readable error code for transport layers.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::NotFound(_) => "not_found",
            ServiceError::Forbidden(_) => "forbidden",
            ServiceError::Validation(_) => "validation_error",
            ServiceError::InvalidTransition(_) => "invalid_transition",
            ServiceError::Conflict(_) => "conflict",
            ServiceError::Unavailable(_) => "unavailable",
            ServiceError::Repository(_) => "repository_error",
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => {
                ServiceError::Validation(msg)
            }
            DomainError::InvariantViolation(msg) | DomainError::Conflict(msg) => {
                ServiceError::Conflict(msg)
            }
            DomainError::NotFound(msg) => ServiceError::NotFound(msg),
            DomainError::Forbidden(msg) => ServiceError::Forbidden(msg),
            DomainError::InvalidTransition(msg) => ServiceError::InvalidTransition(msg),
            DomainError::Unavailable(msg) => ServiceError::Unavailable(msg),
        }
    }
}

impl From<AuthzError> for ServiceError {
    fn from(value: AuthzError) -> Self {
        ServiceError::Forbidden(value.to_string())
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Concurrency(msg) | RepositoryError::Duplicate(msg) => {
                ServiceError::Conflict(msg)
            }
            RepositoryError::NotFound(msg) => ServiceError::NotFound(msg),
            RepositoryError::Overflow(msg) => ServiceError::Validation(msg),
            RepositoryError::Timeout(_) | RepositoryError::Poisoned => {
                ServiceError::Repository(value)
            }
        }
    }
}
