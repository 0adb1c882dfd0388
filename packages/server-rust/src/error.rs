//! Handler-level error type and its HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::service::ServiceError;

/// Errors surfaced by request handlers.
///
/// Instrumentation upstream has already logged these by the time they reach
/// the router; the mapping here only decides the HTTP representation. The
/// error text reaches the client unchanged.
#[derive(Debug, Error)]
pub enum AppError {
    /// A roster operation failed.
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Service(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn service_errors_map_to_500_with_the_original_message() {
        let error = AppError::from(ServiceError::Synthetic);
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"Hello, Exception!!!");
    }
}
