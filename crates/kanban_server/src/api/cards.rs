//! Card endpoints.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::routing::{get, patch};
use axum::{Json, Router};
use kanban_core::{
    validate_delete, Card, CreateCardInput, ReorderCardsInput, ReorderItem, UpdateCardInput,
};

use super::DataResponse;
use crate::error::ApiResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/cards", get(list).post(create).patch(reorder))
        .route("/api/cards/{id}", patch(update).delete(delete))
}

/// GET /api/cards
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<DataResponse<Vec<Card>>>> {
    let cards = state.with_cards(|service| service.list()).await?;
    Ok(Json(DataResponse::new(cards)))
}

/// POST /api/cards
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CreateCardInput>, JsonRejection>,
) -> ApiResult<Json<DataResponse<Card>>> {
    let Json(input) = payload?;
    let request = input.validate()?;
    let card = state
        .with_cards(move |service| service.create(request))
        .await?;
    Ok(Json(DataResponse::new(card)))
}

/// PATCH /api/cards/{id}
pub async fn update(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    payload: Result<Json<UpdateCardInput>, JsonRejection>,
) -> ApiResult<Json<DataResponse<Card>>> {
    let Path(id) = id?;
    let Json(input) = payload?;
    let request = input.validate(Some(&id))?;
    let card = state
        .with_cards(move |service| service.update(request))
        .await?;
    Ok(Json(DataResponse::new(card)))
}

/// PATCH /api/cards
pub async fn reorder(
    State(state): State<AppState>,
    payload: Result<Json<ReorderCardsInput>, JsonRejection>,
) -> ApiResult<Json<DataResponse<Vec<ReorderItem>>>> {
    let Json(input) = payload?;
    let request = input.validate()?;
    let placed = state
        .with_cards(move |service| service.reorder(request))
        .await?;
    Ok(Json(DataResponse::new(placed)))
}

/// DELETE /api/cards/{id}
pub async fn delete(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<DataResponse<Card>>> {
    let Path(id) = id?;
    let request = validate_delete(Some(&id))?;
    let card = state
        .with_cards(move |service| service.delete(request))
        .await?;
    Ok(Json(DataResponse::new(card)))
}
