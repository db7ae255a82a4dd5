use domain::RepositoryError;
use thiserror::Error;

/// Errors raised inside the storage adapters.
///
/// Converted into [`RepositoryError::Persistence`] at the port boundary; id
/// misses never go through this type.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored row could not be turned back into a domain value.
    #[error("Corrupt {table} row {id}: {reason}")]
    Corrupt {
        table: &'static str,
        id: String,
        reason: String,
    },

    /// The adapter was told to fail (in-memory failure injection).
    #[error("Injected failure: {0}")]
    Injected(&'static str),
}

impl StoreError {
    pub(crate) fn corrupt(table: &'static str, id: impl ToString, reason: impl ToString) -> Self {
        Self::Corrupt {
            table,
            id: id.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<StoreError> for RepositoryError {
    fn from(err: StoreError) -> Self {
        RepositoryError::persistence(err)
    }
}

/// Result type for adapter internals.
pub type Result<T> = std::result::Result<T, StoreError>;
