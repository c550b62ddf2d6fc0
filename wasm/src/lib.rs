//! WebAssembly module for the Garden for All harvest tracker
//!
//! Provides client-side dashboard state and computation:
//! - Holding the fetched summary, harvest data and pantries per page session
//! - Recent entries, produce breakdown and production trend charts
//! - Pantry commitment progress
//! - Single-entry normalization and period totals for offline use
//!
//! Every input and output crosses the boundary as a JSON string.

use chrono::NaiveDate;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use shared::{
    breakdown, format_amount, progress, recent_entries, summarize, trend, visible_progress,
    Catalog, DashboardSummary, FoodPantry, HarvestEntry, Period, PeriodSummary, ProduceCategory,
    ProduceType, DEFAULT_RECENT_ENTRIES, DEFAULT_TREND_POINTS,
};

fn to_js(message: String) -> JsValue {
    JsValue::from_str(&message)
}

fn parse<T: serde::de::DeserializeOwned>(what: &str, json: &str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid {} JSON: {}", what, e))
}

fn render<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization failed: {}", e))
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, String> {
    value
        .trim()
        .parse()
        .map_err(|e| format!("Invalid {} '{}': {}", field, value, e))
}

fn current_year() -> i32 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::new_0().get_full_year() as i32
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        use chrono::Datelike;
        chrono::Utc::now().year()
    }
}

/// Quantity and value of one period as display strings
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FormattedPeriod {
    pub quantity: String,
    pub value: String,
}

impl From<&PeriodSummary> for FormattedPeriod {
    fn from(summary: &PeriodSummary) -> Self {
        Self {
            quantity: format_amount(summary.total_quantity),
            value: format_amount(summary.total_value),
        }
    }
}

/// Dashboard totals keyed the way the summary cards read them
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FormattedSummary {
    pub today: FormattedPeriod,
    pub week: FormattedPeriod,
    pub month: FormattedPeriod,
    pub year: FormattedPeriod,
}

impl From<&DashboardSummary> for FormattedSummary {
    fn from(summary: &DashboardSummary) -> Self {
        Self {
            today: (&summary.daily).into(),
            week: (&summary.weekly).into(),
            month: (&summary.monthly).into(),
            year: (&summary.yearly).into(),
        }
    }
}

/// Dashboard data owned by one page session.
///
/// Setters replace the held data and record the failure message when the
/// payload cannot be read; the previous data is kept in that case.
#[wasm_bindgen]
#[derive(Debug, Default)]
pub struct DashboardState {
    summary: DashboardSummary,
    entries: Vec<HarvestEntry>,
    catalog: Catalog,
    pantries: Vec<FoodPantry>,
    error: Option<String>,
}

#[wasm_bindgen]
impl DashboardState {
    #[wasm_bindgen(constructor)]
    pub fn new() -> DashboardState {
        DashboardState::default()
    }

    /// Replace the dashboard totals
    pub fn set_summary(&mut self, summary_json: &str) -> Result<(), JsValue> {
        self.load_summary(summary_json).map_err(to_js)
    }

    /// Replace the harvest entries and the catalog used to normalize them
    pub fn set_harvest_data(
        &mut self,
        entries_json: &str,
        produce_types_json: &str,
        categories_json: &str,
    ) -> Result<(), JsValue> {
        self.load_harvest_data(entries_json, produce_types_json, categories_json)
            .map_err(to_js)
    }

    pub fn set_pantries(&mut self, pantries_json: &str) -> Result<(), JsValue> {
        self.load_pantries(pantries_json).map_err(to_js)
    }

    /// The ten most recently harvested entries
    pub fn recent_entries(&self) -> Result<String, JsValue> {
        render(&recent_entries(&self.entries, DEFAULT_RECENT_ENTRIES)).map_err(to_js)
    }

    pub fn produce_breakdown(&self) -> Result<String, JsValue> {
        render(&breakdown(&self.entries, &self.catalog)).map_err(to_js)
    }

    pub fn production_trends(&self) -> Result<String, JsValue> {
        render(&trend(&self.entries, &self.catalog, DEFAULT_TREND_POINTS)).map_err(to_js)
    }

    /// Progress of pantries that received produce in `year` (default: this year)
    pub fn pantry_progress(&self, year: Option<i32>) -> Result<String, JsValue> {
        render(&self.visible_pantry_progress(year.unwrap_or_else(current_year))).map_err(to_js)
    }

    pub fn summary_formatted(&self) -> Result<String, JsValue> {
        render(&FormattedSummary::from(&self.summary)).map_err(to_js)
    }

    #[wasm_bindgen(getter)]
    pub fn error(&self) -> Option<String> {
        self.error.clone()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}

impl DashboardState {
    fn record_error(&mut self, message: String) -> String {
        #[cfg(target_arch = "wasm32")]
        web_sys::console::warn_1(&JsValue::from_str(&message));
        self.error = Some(message.clone());
        message
    }

    fn load_summary(&mut self, summary_json: &str) -> Result<(), String> {
        match parse::<DashboardSummary>("summary", summary_json) {
            Ok(summary) => {
                self.summary = summary;
                Ok(())
            }
            Err(e) => Err(self.record_error(e)),
        }
    }

    fn load_harvest_data(
        &mut self,
        entries_json: &str,
        produce_types_json: &str,
        categories_json: &str,
    ) -> Result<(), String> {
        let parsed = parse::<Vec<HarvestEntry>>("harvest entries", entries_json).and_then(|entries| {
            let produce_types = parse::<Vec<ProduceType>>("produce types", produce_types_json)?;
            let categories = parse::<Vec<ProduceCategory>>("categories", categories_json)?;
            Ok((entries, Catalog::new(produce_types, categories)))
        });

        match parsed {
            Ok((entries, catalog)) => {
                self.entries = entries;
                self.catalog = catalog;
                Ok(())
            }
            Err(e) => Err(self.record_error(e)),
        }
    }

    fn load_pantries(&mut self, pantries_json: &str) -> Result<(), String> {
        match parse::<Vec<FoodPantry>>("food pantries", pantries_json) {
            Ok(pantries) => {
                self.pantries = pantries;
                Ok(())
            }
            Err(e) => Err(self.record_error(e)),
        }
    }

    fn visible_pantry_progress(&self, year: i32) -> Vec<shared::PantryProgress> {
        visible_progress(progress(&self.pantries, &self.entries, &self.catalog, year))
    }
}

/// Normalize one entry against its produce type; `null` or an absent produce
/// type yields an unresolved result
#[wasm_bindgen]
pub fn normalize_entry(entry_json: &str, produce_type_json: Option<String>) -> Result<String, JsValue> {
    normalize_entry_json(entry_json, produce_type_json.as_deref()).map_err(to_js)
}

/// Totals for entries harvested in `[start, end)`
#[wasm_bindgen]
pub fn summarize_period(
    entries_json: &str,
    produce_types_json: &str,
    start: &str,
    end: &str,
) -> Result<String, JsValue> {
    summarize_period_json(entries_json, produce_types_json, start, end).map_err(to_js)
}

fn normalize_entry_json(entry_json: &str, produce_type_json: Option<&str>) -> Result<String, String> {
    let entry: HarvestEntry = parse("harvest entry", entry_json)?;
    let produce_type: Option<ProduceType> = match produce_type_json {
        Some(json) => parse("produce type", json)?,
        None => None,
    };
    render(&shared::normalize(&entry, produce_type.as_ref()))
}

fn summarize_period_json(
    entries_json: &str,
    produce_types_json: &str,
    start: &str,
    end: &str,
) -> Result<String, String> {
    let entries: Vec<HarvestEntry> = parse("harvest entries", entries_json)?;
    let produce_types: Vec<ProduceType> = parse("produce types", produce_types_json)?;
    let period = Period::new(parse_date("start", start)?, parse_date("end", end)?);
    let catalog = Catalog::from_produce_types(produce_types);
    render(&summarize(&entries, &catalog, period))
}
