//! Domain error types.

use std::fmt::Display;

use thiserror::Error;

/// A value was rejected by a value object or entity constructor.
///
/// Carries the name of the offending field so callers can report which part
/// of their input was bad.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors returned by repository and query ports.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No entity with the given id exists.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The storage layer failed for a reason unrelated to the caller's input.
    #[error("persistence error: {0}")]
    Persistence(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl RepositoryError {
    pub fn not_found(entity: &'static str, id: impl Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn persistence(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Persistence(err.into())
    }

    /// Returns true if this is an id lookup miss.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type for repository operations.
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;
