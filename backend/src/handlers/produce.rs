//! Produce type HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::AdminUser;
use crate::services::produce::{CreateProduceTypeInput, ProduceService, UpdateProduceTypeInput};
use crate::AppState;

/// List produce types with their category names, ordered by name
pub async fn list_produce_types(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let produce_types = ProduceService::new(state.db.clone()).find_produce_types().await?;
    Ok(Json(serde_json::json!({ "produceTypes": produce_types })))
}

pub async fn get_produce_type(
    State(state): State<AppState>,
    Path(produce_type_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let produce_type = ProduceService::new(state.db.clone())
        .get_produce_type(produce_type_id)
        .await?;
    Ok(Json(produce_type))
}

pub async fn create_produce_type(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(input): Json<CreateProduceTypeInput>,
) -> AppResult<impl IntoResponse> {
    let produce_type = ProduceService::new(state.db.clone())
        .create_produce_type(input)
        .await?;
    Ok((StatusCode::CREATED, Json(produce_type)))
}

pub async fn update_produce_type(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(produce_type_id): Path<Uuid>,
    Json(input): Json<UpdateProduceTypeInput>,
) -> AppResult<impl IntoResponse> {
    let produce_type = ProduceService::new(state.db.clone())
        .update_produce_type(produce_type_id, input)
        .await?;
    Ok(Json(produce_type))
}

pub async fn delete_produce_type(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(produce_type_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    ProduceService::new(state.db.clone())
        .delete_produce_type(produce_type_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
