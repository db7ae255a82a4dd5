//! API error types with HTTP response mapping.

use application::UpdateProductError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::RepositoryError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client.
    BadRequest(String),
    /// Product update error.
    Update(UpdateProductError),
    /// Storage error outside the update use case.
    Repository(RepositoryError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Update(err) => update_error_to_response(err),
            ApiError::Repository(err) => repository_error_to_response(err),
        };

        if status.is_server_error() {
            tracing::error!(%status, error = %message, "request failed");
        }

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn update_error_to_response(err: UpdateProductError) -> (StatusCode, String) {
    match &err {
        UpdateProductError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        UpdateProductError::InvalidParam(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        UpdateProductError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, err.to_string()),
        UpdateProductError::Repository(_) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

fn repository_error_to_response(err: RepositoryError) -> (StatusCode, String) {
    match &err {
        RepositoryError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
        RepositoryError::Persistence(_) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

impl From<UpdateProductError> for ApiError {
    fn from(err: UpdateProductError) -> Self {
        ApiError::Update(err)
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        ApiError::Repository(err)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use application::InvalidParam;
    use common::ProductId;
    use domain::ValidationError;

    use super::*;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn update_errors_map_to_statuses() {
        let invalid = InvalidParam::from(ValidationError::new("product_name", "must not be empty"));

        assert_eq!(
            status_of(UpdateProductError::NotFound(ProductId::new()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(UpdateProductError::from(invalid).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(UpdateProductError::Timeout(Duration::from_secs(5)).into()),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            status_of(UpdateProductError::Repository(RepositoryError::persistence("down")).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn repository_miss_is_not_found() {
        let err = ApiError::from(RepositoryError::not_found("Product", "x"));
        assert_eq!(status_of(err), StatusCode::NOT_FOUND);
    }
}
