//! Error taxonomy shared by the persistence gateway, the write services, and
//! callers of the cache-read services.
//!
//! Expected business conditions (missing record, duplicate key, invalid
//! input) travel as values of this type; exceptions never cross the module
//! boundary for those cases.

use thiserror::Error;

/// Stable machine-readable classification for an [`InventoryError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Malformed or missing required data.
    InvalidInput,
    /// Entity absent at the expected partition.
    NotFound,
    /// Unique-field collision within the active partition.
    DuplicateKey,
    /// Business-rule violation (e.g. invalid soft-delete transition).
    ConstraintViolation,
    /// Declarative validation rule failed.
    ValidationFailure,
    /// Bulk operation with mixed per-item outcomes.
    PartialFailure,
    /// Caught unexpected failure.
    UnexpectedError,
}

/// Error type for inventory cache and write-service operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InventoryError {
    /// Required input was missing or malformed.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// Entity not found in the expected partition.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    /// A unique field value is already claimed by an active record.
    #[error("{entity} with {field} '{value}' already exists")]
    DuplicateKey {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    /// A business rule rejected the operation.
    #[error("constraint violation: {message}")]
    ConstraintViolation { message: String },

    /// A declarative validation rule failed.
    #[error("validation failed: {message}")]
    ValidationFailure { message: String },

    /// A bulk operation completed with one or more per-item failures.
    #[error("partial failure: {}", failures.join("; "))]
    PartialFailure { failures: Vec<String> },

    /// An unexpected failure was caught at a boundary.
    #[error("unexpected error: {message}")]
    Unexpected { message: String },
}

impl InventoryError {
    /// Create an invalid-input error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a not-found error for the given entity kind and id.
    #[must_use]
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    /// Create a duplicate-key error for a unique field collision.
    #[must_use]
    pub fn duplicate_key(entity: &'static str, field: &'static str, value: impl Into<String>) -> Self {
        Self::DuplicateKey {
            entity,
            field,
            value: value.into(),
        }
    }

    /// Create a constraint-violation error.
    #[must_use]
    pub fn constraint(message: impl Into<String>) -> Self {
        Self::ConstraintViolation {
            message: message.into(),
        }
    }

    /// Create a validation-failure error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailure {
            message: message.into(),
        }
    }

    /// Create a partial-failure error from per-item failure messages.
    #[must_use]
    pub fn partial_failure(failures: Vec<String>) -> Self {
        Self::PartialFailure { failures }
    }

    /// Create an unexpected error.
    #[must_use]
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }

    /// The stable classification code for this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidInput { .. } => ErrorCode::InvalidInput,
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::DuplicateKey { .. } => ErrorCode::DuplicateKey,
            Self::ConstraintViolation { .. } => ErrorCode::ConstraintViolation,
            Self::ValidationFailure { .. } => ErrorCode::ValidationFailure,
            Self::PartialFailure { .. } => ErrorCode::PartialFailure,
            Self::Unexpected { .. } => ErrorCode::UnexpectedError,
        }
    }
}
