//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// missing records, conflicts). Backend connectivity faults travel in the
/// `Storage` variant and must never be confused with a business-rule failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed or missing input. Raised before storage is touched.
    #[error("{0}")]
    Validation(String),

    /// A requested record does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A unique-create conflicted with an existing record.
    #[error("{0}")]
    AlreadyExists(String),

    /// A conditional stock decrement failed at write time.
    #[error("insufficient stock for {sku}")]
    InsufficientStock { sku: String },

    /// The storage backend failed. Retryable by the caller, never retried here.
    #[error("storage backend error: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn already_exists(msg: impl Into<String>) -> Self {
        Self::AlreadyExists(msg.into())
    }

    pub fn insufficient_stock(sku: impl Into<String>) -> Self {
        Self::InsufficientStock { sku: sku.into() }
    }

    pub fn storage(err: impl core::fmt::Display) -> Self {
        Self::Storage(err.to_string())
    }
}
