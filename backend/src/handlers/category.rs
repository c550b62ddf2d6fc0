//! Produce category HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::AdminUser;
use crate::services::category::{CategoryService, CreateCategoryInput, UpdateCategoryInput};
use crate::AppState;

/// List categories in display order
pub async fn list_categories(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let categories = CategoryService::new(state.db.clone()).find_categories().await?;
    Ok(Json(serde_json::json!({ "categories": categories })))
}

pub async fn get_category(
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let category = CategoryService::new(state.db.clone()).get_category(category_id).await?;
    Ok(Json(category))
}

pub async fn create_category(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(input): Json<CreateCategoryInput>,
) -> AppResult<impl IntoResponse> {
    let category = CategoryService::new(state.db.clone()).create_category(input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(category_id): Path<Uuid>,
    Json(input): Json<UpdateCategoryInput>,
) -> AppResult<impl IntoResponse> {
    let category = CategoryService::new(state.db.clone())
        .update_category(category_id, input)
        .await?;
    Ok(Json(category))
}

/// Delete a category that no produce type references
pub async fn delete_category(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(category_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    CategoryService::new(state.db.clone()).delete_category(category_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
