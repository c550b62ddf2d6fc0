//! Dashboard service
//!
//! Loads harvest entries, pantries and the produce catalog from the record
//! store and hands them to the shared aggregation engine.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;

use super::harvest::{HarvestEntryView, HarvestService};
use super::pantry::PantryService;
use crate::config::DashboardConfig;
use crate::error::{AppError, AppResult};
use shared::{
    breakdown, progress, trend, DashboardSummary, DashboardWindows, PantryProgress, Period,
    ProduceBreakdown, TrendPoint,
};

/// Dashboard service computing summaries on request
#[derive(Clone)]
pub struct DashboardService {
    db: PgPool,
    settings: DashboardConfig,
}

/// Chart data shown below the dashboard totals
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCharts {
    pub recent_entries: Vec<HarvestEntryView>,
    pub produce_breakdown: Vec<ProduceBreakdown>,
    pub production_trends: Vec<TrendPoint>,
}

impl DashboardService {
    pub fn new(db: PgPool, settings: DashboardConfig) -> Self {
        Self { db, settings }
    }

    fn harvests(&self) -> HarvestService {
        HarvestService::new(self.db.clone())
    }

    /// Daily, weekly, monthly and yearly totals as of `today`
    pub async fn summary(&self, today: NaiveDate) -> AppResult<DashboardSummary> {
        let windows = DashboardWindows::for_today(today);
        let range = windows.fetch_range();

        let harvests = self.harvests();
        let entries = harvests.find_in_range(range.start, range.end, None).await?;
        let catalog = harvests.catalog().await?;

        let summary = DashboardSummary::compute(&entries, &catalog, &windows);
        tracing::debug!(
            %today,
            entries = entries.len(),
            skipped = summary.yearly.skipped,
            "computed dashboard summary"
        );
        Ok(summary)
    }

    /// Commitment progress for every committed pantry during `year`
    pub async fn pantry_progress(&self, year: i32) -> AppResult<Vec<PantryProgress>> {
        let period = Period::calendar_year(year)
            .ok_or_else(|| AppError::invalid("year", format!("{} is out of range", year)))?;

        let harvests = self.harvests();
        let entries = harvests.find_in_range(period.start, period.end, None).await?;
        let catalog = harvests.catalog().await?;
        let pantries = PantryService::new(self.db.clone()).find_food_pantries().await?;

        Ok(progress(&pantries, &entries, &catalog, year))
    }

    /// Recent entries, produce breakdown and production trend
    pub async fn charts(&self) -> AppResult<DashboardCharts> {
        let harvests = self.harvests();
        let catalog = harvests.catalog().await?;

        // Latest entries first; the fetch limit bounds the chart inputs
        let entries = harvests.find_recent(self.settings.harvest_fetch_limit).await?;
        let recent_entries = entries
            .iter()
            .take(self.settings.recent_entries)
            .cloned()
            .map(|entry| HarvestEntryView::build(entry, &catalog))
            .collect();

        Ok(DashboardCharts {
            recent_entries,
            produce_breakdown: breakdown(&entries, &catalog),
            production_trends: trend(&entries, &catalog, self.settings.trend_points),
        })
    }
}
