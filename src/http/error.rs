//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::repository::RepositoryError;
use crate::services::ServiceError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    /// Invalid request (validation error)
    BadRequest(String),
    /// Missing or unknown caller identity
    Unauthorized(String),
    Forbidden(String),
    Conflict(String),
    Internal(String),
    Repository(RepositoryError),
    Service(ServiceError),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ApiError) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg)),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
            }
            AppError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, ApiError::new("UNAUTHORIZED", msg))
            }
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, ApiError::new("FORBIDDEN", msg)),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, ApiError::new("CONFLICT", msg)),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", msg),
            ),
            AppError::Repository(e) => repository_status(e),
            AppError::Service(e) => match e {
                ServiceError::Validation(msg) => AppError::BadRequest(msg).status_and_body(),
                ServiceError::NotFound(msg) => AppError::NotFound(msg).status_and_body(),
                ServiceError::Forbidden(msg) => AppError::Forbidden(msg).status_and_body(),
                ServiceError::Conflict(msg) => AppError::Conflict(msg).status_and_body(),
                ServiceError::Internal(msg) => AppError::Internal(msg).status_and_body(),
                ServiceError::Repository(e) => repository_status(e),
            },
        }
    }
}

fn repository_status(e: RepositoryError) -> (StatusCode, ApiError) {
    let details = e.context().to_string();
    let (status, code) = match &e {
        RepositoryError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        RepositoryError::ConflictError { .. } => (StatusCode::CONFLICT, "CONFLICT"),
        RepositoryError::ValidationError { .. } => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
        RepositoryError::ConnectionError { .. } => {
            (StatusCode::SERVICE_UNAVAILABLE, "DATABASE_UNAVAILABLE")
        }
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "REPOSITORY_ERROR"),
    };

    if status.is_server_error() {
        tracing::error!("Repository failure: {}", e);
    }

    let body = ApiError::new(code, e.to_string());
    if details.is_empty() {
        (status, body)
    } else {
        (status, body.with_details(details))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = self.status_and_body();
        (status, Json(error)).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Repository(err)
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        AppError::Service(err)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::BadRequest(errors.to_string())
    }
}

impl From<crate::models::time::TimeParseError> for AppError {
    fn from(err: crate::models::time::TimeParseError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_service_errors_map_to_statuses() {
        assert_eq!(
            status_of(ServiceError::validation("bad").into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ServiceError::forbidden("no").into()),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(ServiceError::conflict("taken").into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(ServiceError::not_found("gone").into()),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_repository_errors_map_to_statuses() {
        assert_eq!(
            status_of(RepositoryError::not_found("missing").into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(RepositoryError::connection("down").into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(RepositoryError::query("boom").into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(AppError::Unauthorized("who?".into())),
            StatusCode::UNAUTHORIZED
        );
    }
}
