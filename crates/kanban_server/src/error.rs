//! HTTP error taxonomy and its translation into response bodies.
//!
//! # Responsibility
//! - Classify every failure a handler can return into one `ApiError`.
//! - Render the final `{status, message, timestamp}` body in exactly one
//!   place, the `translate_errors` middleware.
//!
//! # Invariants
//! - Server-side (5xx) messages never reach clients in production.
//! - Diagnostic error logging happens only outside production.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use kanban_core::db::DbError;
use kanban_core::{CardServiceError, ValidationError};
use log::{error, warn};
use serde::Serialize;
use thiserror::Error;

use crate::config::Environment;

/// Message shown for masked server-side failures.
pub const MASKED_MESSAGE: &str = "Internal Error";

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    MethodNotAllowed(String),
    #[error("Database error: {0}")]
    Database(String),
    #[error("{0}")]
    Internal(String),
    /// Failure outside the known taxonomy, such as a panicked worker.
    #[error("{0}")]
    Unexpected(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Database(_) | Self::Internal(_) | Self::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Operational errors are anticipated failures of a known kind.
    pub fn is_operational(&self) -> bool {
        !matches!(self, Self::Unexpected(_))
    }

    fn is_masked_in_production(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::Internal(_) | Self::Unexpected(_)
        )
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::BadRequest(_) => "bad_request",
            Self::NotFound(_) => "not_found",
            Self::MethodNotAllowed(_) => "method_not_allowed",
            Self::Database(_) => "database",
            Self::Internal(_) => "internal",
            Self::Unexpected(_) => "unexpected",
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<CardServiceError> for ApiError {
    fn from(err: CardServiceError) -> Self {
        match err {
            CardServiceError::NotFound(id) => Self::NotFound(format!("card not found: {id}")),
            CardServiceError::Database(inner) => Self::Database(inner.to_string()),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(format!("Validation Error: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Unexpected(format!("blocking task failed: {err}"))
    }
}

/// Leaves the error in the response extensions for `translate_errors`.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = self.status_code().into_response();
        response.extensions_mut().insert(self);
        response
    }
}

/// Wire shape of every error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub status: u16,
    pub message: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

/// Renders `ApiError`s according to the deployment environment.
#[derive(Debug, Clone, Copy)]
pub struct ErrorTranslator {
    environment: Environment,
}

impl ErrorTranslator {
    pub fn new(environment: Environment) -> Self {
        Self { environment }
    }

    /// Message a client is allowed to see for `err`.
    pub fn public_message(&self, err: &ApiError) -> String {
        if self.environment.is_production() && err.is_masked_in_production() {
            MASKED_MESSAGE.to_string()
        } else {
            err.to_string()
        }
    }

    pub fn body(&self, err: &ApiError) -> ErrorBody {
        ErrorBody {
            status: err.status_code().as_u16(),
            message: self.public_message(err),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn render(&self, err: &ApiError) -> Response {
        if !self.environment.is_production() {
            if err.is_operational() {
                warn!(
                    "event=api_error module=http kind=operational error_kind={} status={} message={}",
                    err.kind(),
                    err.status_code().as_u16(),
                    err
                );
            } else {
                error!(
                    "event=api_error module=http kind=non_operational error_kind={} status={} message={}",
                    err.kind(),
                    err.status_code().as_u16(),
                    err
                );
            }
        }
        (err.status_code(), Json(self.body(err))).into_response()
    }
}

/// Replaces any response carrying an `ApiError` with the rendered body.
pub async fn translate_errors(
    State(translator): State<ErrorTranslator>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    match response.extensions().get::<ApiError>() {
        Some(err) => translator.render(err),
        None => response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kanban_core::RepoError;

    #[test]
    fn service_errors_are_reclassified() {
        let not_found: ApiError = CardServiceError::NotFound("c1".to_string()).into();
        assert!(matches!(not_found, ApiError::NotFound(_)));
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);

        let database: ApiError =
            CardServiceError::Database(RepoError::MissingRequiredTable("cards")).into();
        assert_eq!(database.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(database.to_string().starts_with("Database error: "));
        assert!(database.is_operational());
    }

    #[test]
    fn production_masks_only_server_faults() {
        let prod = ErrorTranslator::new(Environment::Production);
        let dev = ErrorTranslator::new(Environment::Development);
        let database = ApiError::Database("disk I/O error".to_string());
        let validation = ApiError::Validation("Validation Error: title: Title is long".to_string());

        assert_eq!(prod.public_message(&database), MASKED_MESSAGE);
        assert_eq!(prod.public_message(&ApiError::Unexpected("boom".to_string())), MASKED_MESSAGE);
        assert_eq!(prod.public_message(&validation), validation.to_string());
        assert_eq!(dev.public_message(&database), "Database error: disk I/O error");
    }

    #[test]
    fn body_carries_status_and_timestamp() {
        let body = ErrorTranslator::new(Environment::Test)
            .body(&ApiError::NotFound("card not found: c1".to_string()));
        assert_eq!(body.status, 404);
        assert_eq!(body.message, "card not found: c1");
        assert!(body.timestamp > 0);
    }

    #[test]
    fn unexpected_errors_are_non_operational() {
        let err = ApiError::Unexpected("worker panicked".to_string());
        assert!(!err.is_operational());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
