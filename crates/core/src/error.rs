//! Error types for the Kennel domain layer.
//!
//! This module defines two layers of errors:
//!
//! - [`StorageError`] - Database/repository errors raised by adapters
//! - [`ResolveError`] - Caller-facing errors from resolvers and mutations
//!
//! `StorageError` converts into `ResolveError` via `From`, so `?` works
//! across the storage boundary.

use thiserror::Error;

// =============================================================================
// Storage Errors
// =============================================================================

/// Database and repository errors.
///
/// These errors originate from storage operations like queries,
/// transactions, and row decoding.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Failed to establish database connection.
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    /// SQL query execution failed.
    #[error("Query execution error: {0}")]
    QueryError(String),

    /// Requested record was not found.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Database constraint was violated (unique, foreign key, etc.).
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Database migration failed.
    #[error("Migration error: {0}")]
    MigrationError(String),

    /// Transaction begin/commit failed.
    #[error("Transaction error: {0}")]
    TransactionError(String),
}

// =============================================================================
// Resolve Errors
// =============================================================================

/// Errors surfaced to callers of the query layer.
///
/// A failed resolution never yields a partial connection; the first error
/// encountered is returned as-is.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Pagination token is malformed or was not produced by this service.
    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),

    /// The underlying storage fetch failed.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A parent or windowed entity vanished between fetches.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A caller-supplied argument is out of range or missing.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl ResolveError {
    /// Stable machine-readable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            ResolveError::InvalidCursor(_) => "INVALID_CURSOR",
            ResolveError::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
            ResolveError::NotFound(_) => "NOT_FOUND",
            ResolveError::InvalidArgument(_) => "INVALID_ARGUMENT",
        }
    }
}

impl From<StorageError> for ResolveError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(what) => ResolveError::NotFound(what),
            other => ResolveError::StorageUnavailable(other.to_string()),
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type for resolver operations.
pub type ResolveResult<T> = Result<T, ResolveError>;
