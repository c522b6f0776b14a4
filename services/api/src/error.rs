//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service and how each
//! kind is rendered as an HTTP response.

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use classroom_core::ports::PortError;
use serde::Serialize;
use utoipa::ToSchema;

use crate::config::ConfigError;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a failure to apply the embedded migrations at startup.
    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The request could not be read (bad JSON, bad multipart body, bad encoding).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An optional collaborator is not configured.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// The JSON body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub status: u16,
    pub detail: String,
}

impl ApiError {
    fn status_and_detail(&self) -> (StatusCode, String) {
        match self {
            ApiError::Port(err) => match err {
                PortError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{what} not found")),
                PortError::DuplicateKey(what) => {
                    (StatusCode::CONFLICT, format!("{what} already exists"))
                }
                PortError::MalformedPayload(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                PortError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
                PortError::StoreUnavailable(_) => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "The data store is unavailable".to_string(),
                ),
                PortError::Unexpected(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred".to_string(),
                ),
            },
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected error occurred".to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = self.status_and_detail();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }
        (
            status,
            Json(ErrorResponse {
                status: status.as_u16(),
                detail,
            }),
        )
            .into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_errors_map_to_distinct_statuses() {
        let cases = [
            (PortError::NotFound("Timetable for T1".into()), StatusCode::NOT_FOUND),
            (PortError::DuplicateKey("T1".into()), StatusCode::CONFLICT),
            (PortError::MalformedPayload("bad".into()), StatusCode::BAD_REQUEST),
            (PortError::Validation("bad".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (PortError::StoreUnavailable("down".into()), StatusCode::SERVICE_UNAVAILABLE),
            (PortError::Unexpected("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), expected);
        }
    }

    #[test]
    fn store_failures_do_not_leak_details() {
        let (_, detail) =
            ApiError::from(PortError::StoreUnavailable("password auth failed".into())).status_and_detail();
        assert!(!detail.contains("password"));
    }
}
