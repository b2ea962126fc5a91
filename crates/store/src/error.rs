use thiserror::Error;

/// Errors that can occur when interacting with storage.
///
/// Storage faults are infrastructure errors: fatal to the enclosing request,
/// always rolled back, and safe to retry from the caller.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored value could not be decoded into its domain type.
    #[error("Corrupt stored value: {0}")]
    Decode(String),
}

impl StoreError {
    /// Returns true if retrying the whole operation may succeed.
    ///
    /// Lock acquisition in the order workflows follows cart order rather than
    /// a global protocol, so PostgreSQL may abort one of two concurrent
    /// transactions with a deadlock (40P01) or lock-wait (55P03) fault.
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Database(sqlx::Error::Database(db_err)) => {
                matches!(db_err.code().as_deref(), Some("40P01") | Some("55P03"))
            }
            _ => false,
        }
    }
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;
