//! Reporting service for harvest exports
//! Builds report sheets through the shared exporter and renders them as CSV

use chrono::NaiveDate;
use sqlx::PgPool;

use super::category::CategoryService;
use super::harvest::HarvestService;
use super::pantry::PantryService;
use super::produce::ProduceService;
use crate::error::{AppError, AppResult};
use shared::{export_report, ExportFormat, ExportOptions, ExportedReport, Sheet};

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
    file_prefix: String,
}

impl ReportingService {
    pub fn new(db: PgPool, file_prefix: impl Into<String>) -> Self {
        Self {
            db,
            file_prefix: file_prefix.into(),
        }
    }

    /// Load the records the report needs and build its sheets
    pub async fn export(&self, options: &ExportOptions, today: NaiveDate) -> AppResult<ExportedReport> {
        let entries = HarvestService::new(self.db.clone()).find_all().await?;
        let produce_types: Vec<_> = ProduceService::new(self.db.clone())
            .find_produce_types()
            .await?
            .into_iter()
            .map(|pt| pt.produce_type)
            .collect();
        let categories = CategoryService::new(self.db.clone()).find_categories().await?;

        let pantries = if options.format == ExportFormat::Pantry {
            Some(PantryService::new(self.db.clone()).find_food_pantries().await?)
        } else {
            None
        };

        let report = export_report(
            &entries,
            &produce_types,
            &categories,
            pantries.as_deref(),
            options,
            &self.file_prefix,
            today,
        );

        tracing::info!(
            filename = %report.filename,
            records = report.record_count,
            sheets = report.sheets.len(),
            "built harvest report"
        );
        Ok(report)
    }

    /// Restrict a report to the sheet called `name` (case-insensitive)
    pub fn select_sheet(report: ExportedReport, name: &str) -> AppResult<ExportedReport> {
        let sheet = report
            .sheets
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name.trim()))
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Sheet '{}'", name)))?;

        Ok(ExportedReport {
            sheets: vec![sheet],
            ..report
        })
    }

    /// Render sheets as one CSV document. When there is more than one sheet,
    /// each starts with a single-cell row holding its name.
    pub fn render_csv(sheets: &[Sheet]) -> AppResult<String> {
        let mut wtr = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(vec![]);

        let titled = sheets.len() > 1;
        for sheet in sheets {
            if titled {
                wtr.write_record([sheet.name.as_str()]).map_err(|e| {
                    AppError::Internal(format!("CSV serialization error: {}", e))
                })?;
            }
            wtr.write_record(&sheet.headers)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
            for row in &sheet.rows {
                wtr.write_record(row)
                    .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
            }
        }

        let csv_data = String::from_utf8(
            wtr.into_inner()
                .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?,
        )
        .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(name: &str) -> Sheet {
        Sheet {
            name: name.to_string(),
            headers: vec!["Report Type".to_string(), "Total Entries".to_string()],
            rows: vec![
                vec!["Overall Summary".to_string(), "2".to_string()],
                vec![String::new(), String::new()],
            ],
        }
    }

    #[test]
    fn test_single_sheet_has_no_title_row() {
        let csv = ReportingService::render_csv(&[sheet("Summary")]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Report Type,Total Entries");
        assert_eq!(lines[1], "Overall Summary,2");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_multiple_sheets_are_titled() {
        let csv = ReportingService::render_csv(&[sheet("Summary"), sheet("Detailed Entries")])
            .unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Summary");
        assert_eq!(lines[4], "Detailed Entries");
    }

    #[test]
    fn test_select_sheet() {
        let report = ExportedReport {
            filename: "garden_for_all_detailed_2024-06-01.csv".to_string(),
            record_count: 2,
            date_range: Default::default(),
            sheets: vec![sheet("Summary"), sheet("Produce Types")],
        };
        let picked = ReportingService::select_sheet(report.clone(), "produce types").unwrap();
        assert_eq!(picked.sheets.len(), 1);
        assert_eq!(picked.sheets[0].name, "Produce Types");
        assert!(ReportingService::select_sheet(report, "Pantry Commitments").is_err());
    }
}
