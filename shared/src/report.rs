//! Report exporter
//!
//! Builds tabular report sheets from harvest entries. Rendering the sheets
//! into a document is left to the caller.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::aggregation::percent_of;
use crate::models::{FoodPantry, HarvestEntry, ProduceCategory, ProduceType};
use crate::normalize::Catalog;
use crate::types::DateRange;

/// Default prefix for exported file names
pub const DEFAULT_FILE_PREFIX: &str = "garden_for_all";

pub const SUMMARY_SHEET: &str = "Summary";
pub const DETAILED_SHEET: &str = "Detailed Entries";
pub const PRODUCE_TYPES_SHEET: &str = "Produce Types";
pub const PANTRY_SHEET: &str = "Pantry Commitments";

const UNKNOWN: &str = "Unknown";

/// Which sheets a report contains
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Summary,
    #[default]
    Detailed,
    Pantry,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Summary => "summary",
            ExportFormat::Detailed => "detailed",
            ExportFormat::Pantry => "pantry",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown export format '{0}', expected one of summary, detailed, pantry")]
pub struct UnknownExportFormat(pub String);

impl FromStr for ExportFormat {
    type Err = UnknownExportFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "summary" => Ok(ExportFormat::Summary),
            "detailed" => Ok(ExportFormat::Detailed),
            "pantry" => Ok(ExportFormat::Pantry),
            other => Err(UnknownExportFormat(other.to_string())),
        }
    }
}

/// Export request options
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExportOptions {
    #[serde(default, alias = "start_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, alias = "end_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub format: ExportFormat,
    /// Accepted for compatibility; reports carry no image columns
    #[serde(default, alias = "include_images")]
    pub include_images: bool,
}

impl ExportOptions {
    pub fn date_range(&self) -> DateRange {
        DateRange {
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

/// One named table of string cells
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    fn new(name: &str, headers: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    fn blank_row(&self) -> Vec<String> {
        vec![String::new(); self.headers.len()]
    }
}

/// Sheets plus metadata for one export
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExportedReport {
    pub filename: String,
    pub record_count: usize,
    pub date_range: DateRange,
    pub sheets: Vec<Sheet>,
}

impl ExportedReport {
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

/// Money and weight formatting: two decimals, halves away from zero
pub fn format_amount(amount: Decimal) -> String {
    format!(
        "{:.2}",
        amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}

/// `{prefix}_{format}{range}.csv`
pub fn report_filename(prefix: &str, options: &ExportOptions, today: NaiveDate) -> String {
    let range = match (options.start_date, options.end_date) {
        (Some(start), Some(end)) => format!("_{start}_to_{end}"),
        (Some(start), None) => format!("_from_{start}"),
        (None, Some(end)) => format!("_to_{end}"),
        (None, None) => format!("_{today}"),
    };
    format!("{prefix}_{}{range}.csv", options.format)
}

/// Build the sheets for `options.format`.
///
/// The pantry sheet is only produced when `pantries` is supplied.
pub fn export_report(
    entries: &[HarvestEntry],
    produce_types: &[ProduceType],
    categories: &[ProduceCategory],
    pantries: Option<&[FoodPantry]>,
    options: &ExportOptions,
    file_prefix: &str,
    today: NaiveDate,
) -> ExportedReport {
    let range = options.date_range();
    let filtered: Vec<&HarvestEntry> = entries
        .iter()
        .filter(|e| range.contains(e.harvest_date))
        .collect();

    let catalog = Catalog::new(produce_types.to_vec(), categories.to_vec());

    let mut sheets = Vec::new();
    if matches!(options.format, ExportFormat::Summary | ExportFormat::Detailed) {
        sheets.push(summary_sheet(&filtered, &catalog));
    }
    if options.format == ExportFormat::Detailed {
        sheets.push(detailed_sheet(&filtered, &catalog));
        sheets.push(produce_types_sheet(produce_types, &catalog));
    }
    if options.format == ExportFormat::Pantry {
        if let Some(pantries) = pantries {
            sheets.push(pantry_sheet(&filtered, &catalog, pantries));
        }
    }

    ExportedReport {
        filename: report_filename(file_prefix, options, today),
        record_count: filtered.len(),
        date_range: range,
        sheets,
    }
}

#[derive(Default)]
struct Totals {
    entries: usize,
    quantity: Decimal,
    value: Decimal,
}

impl Totals {
    fn record(&mut self, weight: Decimal, value: Decimal) {
        self.entries += 1;
        self.quantity = self.quantity.saturating_add(weight);
        self.value = self.value.saturating_add(value);
    }

    fn row(&self, label: &str) -> Vec<String> {
        vec![
            label.to_string(),
            self.entries.to_string(),
            format_amount(self.quantity),
            format_amount(self.value),
            String::new(),
        ]
    }
}

/// Totals keyed by name, remembering first-seen order
#[derive(Default)]
struct Grouped {
    order: Vec<String>,
    totals: HashMap<String, Totals>,
}

impl Grouped {
    fn record(&mut self, name: &str, weight: Decimal, value: Decimal) {
        if !self.totals.contains_key(name) {
            self.order.push(name.to_string());
        }
        self.totals
            .entry(name.to_string())
            .or_default()
            .record(weight, value);
    }

    fn rows(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        self.order
            .iter()
            .filter_map(|name| self.totals.get(name).map(|t| t.row(name)))
    }
}

/// Blank separator row followed by a section label
fn push_heading(sheet: &mut Sheet, label: &str) {
    let blank = sheet.blank_row();
    let mut row = blank.clone();
    row[0] = label.to_string();
    sheet.rows.push(blank);
    sheet.rows.push(row);
}

fn summary_sheet(entries: &[&HarvestEntry], catalog: &Catalog) -> Sheet {
    let mut sheet = Sheet::new(
        SUMMARY_SHEET,
        &[
            "Report Type",
            "Total Entries",
            "Total Quantity (lb)",
            "Total Value ($)",
            "Date Range",
        ],
    );

    let mut overall = Totals::default();
    let mut by_category = Grouped::default();
    let mut by_produce = Grouped::default();

    for entry in entries {
        let normalized = catalog.normalize(entry);
        overall.record(normalized.weight_lb, normalized.value_usd);

        if let Some(category) = catalog.category_for(entry) {
            by_category.record(&category.name, normalized.weight_lb, normalized.value_usd);
        }
        if let Some(produce_type) = catalog.produce_type(entry.produce_type_id) {
            by_produce.record(&produce_type.name, normalized.weight_lb, normalized.value_usd);
        }
    }

    let first = entries.iter().map(|e| e.harvest_date).min();
    let last = entries.iter().map(|e| e.harvest_date).max();
    let span = match (first, last) {
        (Some(first), Some(last)) => format!("{first} to {last}"),
        _ => "N/A to N/A".to_string(),
    };

    let mut overall_row = overall.row("Overall Summary");
    overall_row[4] = span;
    sheet.rows.push(overall_row);

    push_heading(&mut sheet, "BY CATEGORY");
    sheet.rows.extend(by_category.rows());
    push_heading(&mut sheet, "BY PRODUCE TYPE");
    sheet.rows.extend(by_produce.rows());

    sheet
}

fn detailed_sheet(entries: &[&HarvestEntry], catalog: &Catalog) -> Sheet {
    let mut sheet = Sheet::new(
        DETAILED_SHEET,
        &[
            "Date",
            "Category",
            "Produce Type",
            "Quantity",
            "Unit",
            "Weight (lb)",
            "Value per Lb ($)",
            "Total Value ($)",
            "Harvester",
            "Notes",
            "Entry ID",
        ],
    );

    for entry in entries {
        let normalized = catalog.normalize(entry);
        let produce_type = catalog.produce_type(entry.produce_type_id);
        sheet.rows.push(vec![
            entry.harvest_date.to_string(),
            catalog
                .category_for(entry)
                .map_or(UNKNOWN, |c| c.name.as_str())
                .to_string(),
            produce_type.map_or(UNKNOWN, |pt| pt.name.as_str()).to_string(),
            entry.quantity.normalize().to_string(),
            entry.unit.clone(),
            format_amount(normalized.weight_lb),
            format_amount(produce_type.map_or(Decimal::ZERO, |pt| pt.price_per_lb)),
            format_amount(normalized.value_usd),
            entry.harvester_name.clone().unwrap_or_default(),
            entry.notes.clone().unwrap_or_default(),
            entry.id.to_string(),
        ]);
    }

    sheet
}

fn produce_types_sheet(produce_types: &[ProduceType], catalog: &Catalog) -> Sheet {
    let mut sheet = Sheet::new(
        PRODUCE_TYPES_SHEET,
        &[
            "Produce Name",
            "Category",
            "Unit Type",
            "Conversion Factor",
            "Price per Lb ($)",
        ],
    );

    for pt in produce_types {
        sheet.rows.push(vec![
            pt.name.clone(),
            catalog
                .category(pt.category_id)
                .map_or(UNKNOWN, |c| c.name.as_str())
                .to_string(),
            pt.unit_type.to_string(),
            pt.conversion_factor.normalize().to_string(),
            format_amount(pt.price_per_lb),
        ]);
    }

    sheet
}

fn pantry_sheet(entries: &[&HarvestEntry], catalog: &Catalog, pantries: &[FoodPantry]) -> Sheet {
    let mut sheet = Sheet::new(
        PANTRY_SHEET,
        &[
            "Pantry Name",
            "Phone",
            "Email",
            "Address",
            "Total Commitment ($)",
            "Vegetables Commitment ($)",
            "Fruits Commitment ($)",
            "Herbs Commitment ($)",
            "Flowers Commitment ($)",
            "Production Available ($)",
            "Commitment vs Production",
        ],
    );

    // Production counts only entries that resolve to a category
    let production: Decimal = entries
        .iter()
        .filter(|e| catalog.category_for(e).is_some())
        .map(|e| catalog.normalize(e).value_usd)
        .fold(Decimal::ZERO, Decimal::saturating_add);

    for pantry in pantries {
        let amounts = &pantry.commitment_amounts;
        let ratio = match percent_of(production, amounts.total) {
            Some(pct) if amounts.total > Decimal::ZERO => {
                let pct = pct.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
                format!("{pct:.1}%")
            }
            _ => "N/A".to_string(),
        };

        sheet.rows.push(vec![
            pantry.name.clone(),
            pantry.contact_info.phone.clone().unwrap_or_default(),
            pantry.contact_info.email.clone().unwrap_or_default(),
            pantry.contact_info.address.clone().unwrap_or_default(),
            format_amount(amounts.total),
            format_amount(amounts.vegetables),
            format_amount(amounts.fruits),
            format_amount(amounts.herbs),
            format_amount(amounts.flowers),
            format_amount(production),
            ratio,
        ]);
    }

    sheet
}
