//! Use case error types.

use std::time::Duration;

use common::ProductId;
use domain::{ReconcileError, RepositoryError, ValidationError};
use thiserror::Error;

/// A caller-supplied value was rejected.
#[derive(Debug, Error)]
pub enum InvalidParam {
    /// A field failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A referenced id does not resolve to an entity.
    #[error(transparent)]
    NotFound(RepositoryError),
}

impl From<ReconcileError> for InvalidParam {
    fn from(err: ReconcileError) -> Self {
        match err {
            ReconcileError::Validation(e) => InvalidParam::Validation(e),
            ReconcileError::UnknownBrew(id) => {
                InvalidParam::NotFound(RepositoryError::not_found("ProductCoffeeBrew", id))
            }
            ReconcileError::DuplicateBrew(id) => InvalidParam::Validation(ValidationError::new(
                "coffee_brews",
                format!("brew {id} listed more than once"),
            )),
        }
    }
}

/// Errors returned by [`crate::UpdateProduct::execute`].
#[derive(Debug, Error)]
pub enum UpdateProductError {
    /// The product to update does not exist.
    #[error("product not found: {0}")]
    NotFound(ProductId),

    /// The request carried an invalid value or an unresolvable reference.
    #[error("invalid parameter: {0}")]
    InvalidParam(#[from] InvalidParam),

    /// A storage call failed.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// The update did not finish before its deadline.
    #[error("update timed out after {0:?}")]
    Timeout(Duration),
}

impl UpdateProductError {
    /// Short label used for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            UpdateProductError::NotFound(_) => "not_found",
            UpdateProductError::InvalidParam(_) => "invalid_param",
            UpdateProductError::Repository(_) => "repository",
            UpdateProductError::Timeout(_) => "timeout",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::CoffeeBrewId;

    #[test]
    fn unknown_brew_is_a_not_found_param() {
        let err = InvalidParam::from(ReconcileError::UnknownBrew(CoffeeBrewId::new()));
        assert!(matches!(
            err,
            InvalidParam::NotFound(RepositoryError::NotFound { entity: "ProductCoffeeBrew", .. })
        ));
    }

    #[test]
    fn duplicate_brew_is_a_validation_param() {
        let id = CoffeeBrewId::new();
        let err = InvalidParam::from(ReconcileError::DuplicateBrew(id));
        match err {
            InvalidParam::Validation(v) => {
                assert_eq!(v.field, "coffee_brews");
                assert!(v.reason.contains(&id.to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn reasons_are_stable_labels() {
        let err = UpdateProductError::Timeout(Duration::from_millis(10));
        assert_eq!(err.reason(), "timeout");
        let err = UpdateProductError::NotFound(ProductId::new());
        assert_eq!(err.reason(), "not_found");
    }
}
