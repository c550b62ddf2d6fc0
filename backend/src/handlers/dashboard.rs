//! Dashboard HTTP handlers

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::DashboardService;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    /// Reference day; defaults to today (UTC)
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProgressQuery {
    #[serde(default)]
    pub year: Option<i32>,
}

fn service(state: &AppState) -> DashboardService {
    DashboardService::new(state.db.clone(), state.config.dashboard.clone())
}

/// Daily, weekly, monthly and yearly totals
pub async fn get_summary(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Query(query): Query<SummaryQuery>,
) -> AppResult<impl IntoResponse> {
    let today = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let summary = service(&state).summary(today).await?;
    Ok(Json(summary))
}

/// Progress of each pantry that has received produce this year
pub async fn get_pantry_progress(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Query(query): Query<ProgressQuery>,
) -> AppResult<impl IntoResponse> {
    let year = query.year.unwrap_or_else(|| Utc::now().year());
    let progress = shared::visible_progress(service(&state).pantry_progress(year).await?);
    Ok(Json(serde_json::json!({ "year": year, "pantries": progress })))
}

pub async fn get_charts(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> AppResult<impl IntoResponse> {
    let charts = service(&state).charts().await?;
    Ok(Json(charts))
}
