//! HTTP routes.
//!
//! Every successful response is wrapped as `{ "data": ... }`.

pub mod cards;
pub mod health;

use axum::Router;
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

/// Success envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// All API routes, without middleware or state.
pub fn router() -> Router<AppState> {
    Router::new().merge(cards::router()).merge(health::router())
}

/// Fallback for paths no route matches.
pub async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}

/// Fallback for known paths requested with an unsupported method.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed("Method not allowed".to_string())
}
