//! Report export HTTP handlers

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::ReportingService;
use crate::AppState;
use shared::{ExportFormat, ExportOptions};

/// Query parameters for report export
#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
    #[serde(default, alias = "startDate")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, alias = "endDate")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, alias = "includeImages")]
    pub include_images: bool,
    /// Return only the named sheet
    pub sheet: Option<String>,
    /// `json` (default) or `csv`
    pub output: Option<String>,
}

impl ExportQuery {
    fn options(&self) -> AppResult<ExportOptions> {
        let format = match self.format.as_deref().map(str::trim).filter(|f| !f.is_empty()) {
            Some(f) => f
                .parse::<ExportFormat>()
                .map_err(|e| AppError::invalid("format", e.to_string()))?,
            None => ExportFormat::default(),
        };
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(AppError::invalid("startDate", "Start date must not be after end date"));
            }
        }
        Ok(ExportOptions {
            start_date: self.start_date,
            end_date: self.end_date,
            format,
            include_images: self.include_images,
        })
    }
}

/// Export harvest data as report sheets (JSON) or a CSV download
pub async fn export_report(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Query(query): Query<ExportQuery>,
) -> AppResult<Response> {
    let options = query.options()?;
    let service = ReportingService::new(state.db.clone(), state.config.export.file_prefix.clone());

    let mut report = service.export(&options, Utc::now().date_naive()).await?;
    if let Some(sheet) = query.sheet.as_deref().filter(|s| !s.trim().is_empty()) {
        report = ReportingService::select_sheet(report, sheet)?;
    }

    match query.output.as_deref().unwrap_or("json") {
        "csv" => {
            let csv = ReportingService::render_csv(&report.sheets)?;
            let disposition = format!("attachment; filename=\"{}\"", report.filename);
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                csv,
            )
                .into_response())
        }
        "json" => Ok(Json(report).into_response()),
        other => Err(AppError::invalid(
            "output",
            format!("Unknown output '{}', expected json or csv", other),
        )),
    }
}
