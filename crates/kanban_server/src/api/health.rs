use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use super::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/health", get(health))
}

/// GET /api/health
pub async fn health() -> Json<DataResponse<Health>> {
    Json(DataResponse::new(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    }))
}
