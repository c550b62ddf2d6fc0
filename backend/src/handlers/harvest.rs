//! Harvest entry HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::harvest::{
    CreateHarvestInput, HarvestListQuery, HarvestService, UpdateHarvestInput,
};
use crate::AppState;

/// List harvest entries with filters, sorting and pagination
pub async fn list_harvests(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Query(query): Query<HarvestListQuery>,
) -> AppResult<impl IntoResponse> {
    let page = HarvestService::new(state.db.clone())
        .find_harvest_entries(&query)
        .await?;
    Ok(Json(page))
}

pub async fn get_harvest(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(harvest_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let harvest = HarvestService::new(state.db.clone()).get_harvest(harvest_id).await?;
    Ok(Json(harvest))
}

/// Record a new harvest
pub async fn record_harvest(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateHarvestInput>,
) -> AppResult<impl IntoResponse> {
    let harvest = HarvestService::new(state.db.clone()).create_harvest(input).await?;
    tracing::info!(
        harvest_id = %harvest.entry.id,
        recorded_by = %user.email,
        "harvest recorded"
    );
    Ok((StatusCode::CREATED, Json(harvest)))
}

pub async fn update_harvest(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(harvest_id): Path<Uuid>,
    Json(input): Json<UpdateHarvestInput>,
) -> AppResult<impl IntoResponse> {
    let harvest = HarvestService::new(state.db.clone())
        .update_harvest(harvest_id, input)
        .await?;
    Ok(Json(harvest))
}

pub async fn delete_harvest(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(harvest_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    HarvestService::new(state.db.clone()).delete_harvest(harvest_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
