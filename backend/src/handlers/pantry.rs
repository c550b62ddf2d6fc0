//! Food pantry HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::AdminUser;
use crate::services::pantry::{CreatePantryInput, PantryService, UpdatePantryInput};
use crate::AppState;

pub async fn list_food_pantries(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let pantries = PantryService::new(state.db.clone()).find_food_pantries().await?;
    Ok(Json(serde_json::json!({ "foodPantries": pantries })))
}

pub async fn get_food_pantry(
    State(state): State<AppState>,
    Path(pantry_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let pantry = PantryService::new(state.db.clone()).get_pantry(pantry_id).await?;
    Ok(Json(pantry))
}

pub async fn create_food_pantry(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(input): Json<CreatePantryInput>,
) -> AppResult<impl IntoResponse> {
    let pantry = PantryService::new(state.db.clone()).create_pantry(input).await?;
    Ok((StatusCode::CREATED, Json(pantry)))
}

pub async fn update_food_pantry(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(pantry_id): Path<Uuid>,
    Json(input): Json<UpdatePantryInput>,
) -> AppResult<impl IntoResponse> {
    let pantry = PantryService::new(state.db.clone())
        .update_pantry(pantry_id, input)
        .await?;
    Ok(Json(pantry))
}

/// Delete a pantry; entries delivered to it are kept without the link
pub async fn delete_food_pantry(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(pantry_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    PantryService::new(state.db.clone()).delete_pantry(pantry_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
