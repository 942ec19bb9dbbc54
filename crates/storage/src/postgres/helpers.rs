//! Shared helpers for PostgreSQL error and row conversion.

use sqlx::error::ErrorKind;

use kennel_core::error::StorageError;

/// Map a sqlx error onto the storage error taxonomy.
///
/// `RowNotFound` becomes `NotFound` so resolvers can tell a vanished
/// entity from an unavailable database.
pub fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    match err {
        sqlx::Error::RowNotFound => StorageError::NotFound("no rows returned".to_string()),
        sqlx::Error::Database(db_err) => match db_err.kind() {
            ErrorKind::UniqueViolation
            | ErrorKind::ForeignKeyViolation
            | ErrorKind::NotNullViolation
            | ErrorKind::CheckViolation => StorageError::ConstraintViolation(db_err.to_string()),
            _ => StorageError::QueryError(db_err.to_string()),
        },
        pool_err @ (sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed) => {
            StorageError::ConnectionError(pool_err.to_string())
        }
        other => StorageError::QueryError(other.to_string()),
    }
}

/// Map a transaction begin/commit error.
pub fn map_tx_error(err: sqlx::Error) -> StorageError {
    StorageError::TransactionError(err.to_string())
}
