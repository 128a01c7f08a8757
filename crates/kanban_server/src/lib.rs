//! HTTP surface of the kanban card board.
//!
//! The router is assembled here so the binary and the integration tests
//! serve exactly the same stack.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod state;

use axum::http::{header, Method};
use axum::{middleware as axum_middleware, Router};
use tower_http::cors::CorsLayer;

pub use config::{Config, ConfigError, Environment};
pub use error::{ApiError, ApiResult, ErrorBody, ErrorTranslator};
pub use state::AppState;

/// Builds the fully layered application.
///
/// Layer order, outermost first: CORS, request logging, error translation.
pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(state.client_origin().clone())
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    api::router()
        .fallback(api::route_not_found)
        .method_not_allowed_fallback(api::method_not_allowed)
        .layer(axum_middleware::from_fn_with_state(
            state.translator(),
            error::translate_errors,
        ))
        .layer(axum_middleware::from_fn(middleware::log_requests))
        .layer(cors)
        .with_state(state)
}
