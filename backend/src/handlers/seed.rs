//! Seed data handler

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::middleware::AdminUser;
use crate::services::seed::{SeedReport, SeedService};
use crate::AppState;

/// Load the standard catalog and partner pantries
pub async fn seed_database(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> AppResult<Json<SeedReport>> {
    tracing::info!(requested_by = %admin.email, "seeding database");
    let report = SeedService::new(state.db.clone()).seed().await?;
    Ok(Json(report))
}
