//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Deterministic business failures only (validation, invariants, authorization,
/// lifecycle rules). Every variant carries which rule failed so the caller can
/// decide whether to retry, prompt the user, or alert an operator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (out-of-range quantity, unknown status code).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A referenced order/item/courier does not exist, or does not belong to
    /// the resource it was addressed through.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request collides with current state (delete after payment, courier
    /// double-booking, stale write).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The actor is not allowed to touch this resource.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A status change that is not exactly one step forward, or that the acting
    /// role is not entitled to request.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// A required resource is temporarily unavailable (no waiting courier).
    #[error("unavailable: {0}")]
    Unavailable(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn invalid_transition(msg: impl Into<String>) -> Self {
        Self::InvalidTransition(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}
