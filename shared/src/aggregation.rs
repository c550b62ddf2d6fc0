//! Dashboard aggregation engine
//!
//! Deterministic summaries over an already-fetched batch of harvest entries:
//! period totals, per-produce breakdowns, production trends and pantry
//! commitment progress. Every function here is pure; the caller supplies
//! "today" and the produce catalog.

use std::collections::HashMap;
use std::iter::Sum;
use std::ops::Add;

use chrono::{Datelike, Days, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{CommitmentAmounts, ContactInfo, FoodPantry, HarvestEntry, PantryDistribution};
use crate::normalize::{Catalog, Normalized};

/// Default number of points kept in a production trend
pub const DEFAULT_TREND_POINTS: usize = 500;

/// Default number of entries shown as "recent"
pub const DEFAULT_RECENT_ENTRIES: usize = 10;

// ============================================================================
// Periods
// ============================================================================

/// Half-open calendar window `[start, end)` in UTC dates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }

    pub fn day(today: NaiveDate) -> Self {
        Self::new(today, today.succ_opt().unwrap_or(NaiveDate::MAX))
    }

    /// Week starting on the most recent Sunday
    pub fn week(today: NaiveDate) -> Self {
        let offset = u64::from(today.weekday().num_days_from_sunday());
        let start = today.checked_sub_days(Days::new(offset)).unwrap_or(NaiveDate::MIN);
        let end = start.checked_add_days(Days::new(7)).unwrap_or(NaiveDate::MAX);
        Self::new(start, end)
    }

    pub fn month(today: NaiveDate) -> Self {
        let start = today
            .checked_sub_days(Days::new(u64::from(today.day0())))
            .unwrap_or(NaiveDate::MIN);
        let end = start.checked_add_months(Months::new(1)).unwrap_or(NaiveDate::MAX);
        Self::new(start, end)
    }

    pub fn year(today: NaiveDate) -> Self {
        let start = today
            .checked_sub_days(Days::new(u64::from(today.ordinal0())))
            .unwrap_or(NaiveDate::MIN);
        let end = start.checked_add_months(Months::new(12)).unwrap_or(NaiveDate::MAX);
        Self::new(start, end)
    }

    /// Calendar year `year`, or `None` when out of chrono's range
    pub fn calendar_year(year: i32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1)?;
        let end = NaiveDate::from_ymd_opt(year + 1, 1, 1)?;
        Some(Self::new(start, end))
    }

    /// Smallest period covering both
    pub fn union(&self, other: &Period) -> Self {
        Self::new(self.start.min(other.start), self.end.max(other.end))
    }
}

/// The four standard dashboard windows derived from "today"
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardWindows {
    pub daily: Period,
    pub weekly: Period,
    pub monthly: Period,
    pub yearly: Period,
}

impl DashboardWindows {
    pub fn for_today(today: NaiveDate) -> Self {
        Self {
            daily: Period::day(today),
            weekly: Period::week(today),
            monthly: Period::month(today),
            yearly: Period::year(today),
        }
    }

    /// Range to fetch so that every window is fully covered.
    ///
    /// Early in January the week can reach back into the previous year.
    pub fn fetch_range(&self) -> Period {
        self.daily
            .union(&self.weekly)
            .union(&self.monthly)
            .union(&self.yearly)
    }
}

// ============================================================================
// Period summaries
// ============================================================================

/// Totals for one period
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSummary {
    /// Sum of normalized weight in pounds
    pub total_quantity: Decimal,
    pub total_value: Decimal,
    /// Entries harvested in the period
    pub count: u64,
    /// Entries in the period whose produce type could not be resolved
    pub skipped: u64,
}

impl Add for PeriodSummary {
    type Output = PeriodSummary;

    fn add(self, rhs: PeriodSummary) -> PeriodSummary {
        PeriodSummary {
            total_quantity: self.total_quantity.saturating_add(rhs.total_quantity),
            total_value: self.total_value.saturating_add(rhs.total_value),
            count: self.count.saturating_add(rhs.count),
            skipped: self.skipped.saturating_add(rhs.skipped),
        }
    }
}

impl Sum for PeriodSummary {
    fn sum<I: Iterator<Item = PeriodSummary>>(iter: I) -> Self {
        iter.fold(PeriodSummary::default(), Add::add)
    }
}

impl PeriodSummary {
    /// Add one entry's figures; an entry that would overflow the totals is
    /// counted as skipped instead
    fn record(&mut self, entry: &HarvestEntry, catalog: &Catalog) {
        self.count += 1;
        let normalized = catalog.normalize(entry);
        if !normalized.resolved {
            self.skipped += 1;
            return;
        }
        match (
            self.total_quantity.checked_add(normalized.weight_lb),
            self.total_value.checked_add(normalized.value_usd),
        ) {
            (Some(quantity), Some(value)) => {
                self.total_quantity = quantity;
                self.total_value = value;
            }
            _ => {
                tracing::warn!(entry_id = %entry.id, "period totals overflowed, skipping entry");
                self.skipped += 1;
            }
        }
    }
}

/// Totals over the entries harvested within `period`
pub fn summarize(entries: &[HarvestEntry], catalog: &Catalog, period: Period) -> PeriodSummary {
    let mut summary = PeriodSummary::default();
    for entry in entries.iter().filter(|e| period.contains(e.harvest_date)) {
        summary.record(entry, catalog);
    }
    summary
}

/// Add `weight` and `value` to a running pair of totals, leaving both
/// untouched when either would overflow
fn accumulate(
    quantity_lb: &mut Decimal,
    value_usd: &mut Decimal,
    normalized: &Normalized,
    entry: &HarvestEntry,
) {
    match (
        quantity_lb.checked_add(normalized.weight_lb),
        value_usd.checked_add(normalized.value_usd),
    ) {
        (Some(w), Some(v)) => {
            *quantity_lb = w;
            *value_usd = v;
        }
        _ => tracing::warn!(entry_id = %entry.id, "harvest totals overflowed, skipping entry"),
    }
}

/// Daily, weekly, monthly and yearly totals
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardSummary {
    pub daily: PeriodSummary,
    pub weekly: PeriodSummary,
    pub monthly: PeriodSummary,
    pub yearly: PeriodSummary,
}

impl DashboardSummary {
    pub fn compute(entries: &[HarvestEntry], catalog: &Catalog, windows: &DashboardWindows) -> Self {
        Self {
            daily: summarize(entries, catalog, windows.daily),
            weekly: summarize(entries, catalog, windows.weekly),
            monthly: summarize(entries, catalog, windows.monthly),
            yearly: summarize(entries, catalog, windows.yearly),
        }
    }
}

// ============================================================================
// Produce breakdown
// ============================================================================

/// Harvest totals for one produce type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProduceBreakdown {
    pub name: String,
    pub quantity_lb: Decimal,
    pub value_usd: Decimal,
}

/// Totals grouped by produce type name, heaviest first.
///
/// Entries with no normalized weight are left out. Equal quantities keep the
/// order in which their names were first seen.
pub fn breakdown(entries: &[HarvestEntry], catalog: &Catalog) -> Vec<ProduceBreakdown> {
    let mut rows: Vec<ProduceBreakdown> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for entry in entries {
        let normalized = catalog.normalize(entry);
        if !normalized.has_weight() {
            continue;
        }
        let Some(produce_type) = catalog.produce_type(entry.produce_type_id) else {
            continue;
        };

        let slot = *index.entry(produce_type.name.clone()).or_insert_with(|| {
            rows.push(ProduceBreakdown {
                name: produce_type.name.clone(),
                quantity_lb: Decimal::ZERO,
                value_usd: Decimal::ZERO,
            });
            rows.len() - 1
        });
        let row = &mut rows[slot];
        accumulate(&mut row.quantity_lb, &mut row.value_usd, &normalized, entry);
    }

    rows.sort_by(|a, b| b.quantity_lb.cmp(&a.quantity_lb));
    rows
}

// ============================================================================
// Production trend
// ============================================================================

/// Harvest totals for one calendar date
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub quantity_lb: Decimal,
    pub value_usd: Decimal,
}

/// One point per harvest date, oldest first, keeping the latest `max_points`.
///
/// Every resolved entry with a positive quantity or weight contributes, so a
/// date harvested only in zero-factor produce still gets a 0 lb point.
pub fn trend(entries: &[HarvestEntry], catalog: &Catalog, max_points: usize) -> Vec<TrendPoint> {
    let mut by_date: HashMap<NaiveDate, TrendPoint> = HashMap::new();

    for entry in entries {
        let normalized = catalog.normalize(entry);
        if !normalized.resolved
            || (entry.quantity <= Decimal::ZERO && normalized.weight_lb <= Decimal::ZERO)
        {
            continue;
        }
        let point = by_date.entry(entry.harvest_date).or_insert(TrendPoint {
            date: entry.harvest_date,
            quantity_lb: Decimal::ZERO,
            value_usd: Decimal::ZERO,
        });
        accumulate(&mut point.quantity_lb, &mut point.value_usd, &normalized, entry);
    }

    let mut points: Vec<TrendPoint> = by_date.into_values().collect();
    points.sort_by_key(|p| p.date);
    if points.len() > max_points {
        points.drain(..points.len() - max_points);
    }
    points
}

/// The `limit` most recently harvested entries, newest first
pub fn recent_entries(entries: &[HarvestEntry], limit: usize) -> Vec<HarvestEntry> {
    let mut sorted: Vec<&HarvestEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| {
        b.harvest_date
            .cmp(&a.harvest_date)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
    sorted.into_iter().take(limit).cloned().collect()
}

// ============================================================================
// Pantry progress
// ============================================================================

/// Pantry details carried alongside its progress
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PantryRef {
    pub id: Uuid,
    pub name: String,
    pub contact_info: ContactInfo,
    pub commitment_amounts: CommitmentAmounts,
}

impl From<&FoodPantry> for PantryRef {
    fn from(pantry: &FoodPantry) -> Self {
        Self {
            id: pantry.id,
            name: pantry.name.clone(),
            contact_info: pantry.contact_info.clone(),
            commitment_amounts: pantry.commitment_amounts.clone(),
        }
    }
}

/// Commitment versus delivery for one pantry.
///
/// `committed` is the pantry's dollar commitment and is compared directly
/// with delivered pounds, without conversion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PantryProgress {
    pub pantry: PantryRef,
    pub committed: Decimal,
    pub delivered_lb: Decimal,
    pub remaining_lb: Decimal,
    pub percentage: Decimal,
}

/// Deliveries derived from entries that name a pantry.
///
/// Entries whose produce type cannot be resolved are skipped.
pub fn distributions(entries: &[HarvestEntry], catalog: &Catalog) -> Vec<PantryDistribution> {
    entries
        .iter()
        .filter_map(|entry| {
            let pantry_id = entry.pantry_id?;
            let normalized = catalog.normalize(entry);
            normalized.resolved.then(|| PantryDistribution {
                pantry_id,
                harvest_entry_id: entry.id,
                quantity_distributed_lb: normalized.weight_lb,
                distribution_date: entry.harvest_date,
            })
        })
        .collect()
}

/// Progress of every pantry with a non-zero commitment during `year`,
/// most-delivered first.
///
/// Pantries with nothing delivered are still returned; hiding them is up to
/// the presentation layer (see [`visible_progress`]).
pub fn progress(
    pantries: &[FoodPantry],
    entries: &[HarvestEntry],
    catalog: &Catalog,
    year: i32,
) -> Vec<PantryProgress> {
    let Some(period) = Period::calendar_year(year) else {
        return Vec::new();
    };

    let mut delivered: HashMap<Uuid, Decimal> = HashMap::new();
    for distribution in distributions(entries, catalog) {
        if !period.contains(distribution.distribution_date) {
            continue;
        }
        let total = delivered.entry(distribution.pantry_id).or_default();
        match total.checked_add(distribution.quantity_distributed_lb) {
            Some(sum) => *total = sum,
            None => tracing::warn!(
                pantry_id = %distribution.pantry_id,
                entry_id = %distribution.harvest_entry_id,
                "pantry deliveries overflowed, skipping entry"
            ),
        }
    }

    let mut rows: Vec<PantryProgress> = pantries
        .iter()
        .filter(|pantry| pantry.commitment_amounts.has_commitment())
        .map(|pantry| {
            let committed = pantry.commitment_amounts.total;
            let delivered_lb = delivered.get(&pantry.id).copied().unwrap_or_default();
            PantryProgress {
                pantry: PantryRef::from(pantry),
                committed,
                delivered_lb,
                remaining_lb: committed.saturating_sub(delivered_lb).max(Decimal::ZERO),
                percentage: percent_of(delivered_lb, committed).unwrap_or(Decimal::MAX),
            }
        })
        .collect();

    rows.sort_by(|a, b| b.delivered_lb.cmp(&a.delivered_lb));
    rows
}

/// `part` as a percentage of `whole`; `None` for a zero whole or when the
/// result does not fit in a `Decimal`
pub fn percent_of(part: Decimal, whole: Decimal) -> Option<Decimal> {
    if whole.is_zero() {
        return None;
    }
    part.checked_div(whole)?.checked_mul(Decimal::ONE_HUNDRED)
}

/// Pantries that have received something; used when displaying progress
pub fn visible_progress(progress: Vec<PantryProgress>) -> Vec<PantryProgress> {
    progress
        .into_iter()
        .filter(|row| row.delivered_lb > Decimal::ZERO)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_week_starts_on_sunday() {
        // 2024-03-06 is a Wednesday
        let week = Period::week(d(2024, 3, 6));
        assert_eq!(week.start, d(2024, 3, 3));
        assert_eq!(week.end, d(2024, 3, 10));

        // A Sunday is the start of its own week
        let sunday = Period::week(d(2024, 3, 3));
        assert_eq!(sunday.start, d(2024, 3, 3));
    }

    #[test]
    fn test_month_and_year_windows() {
        let month = Period::month(d(2024, 12, 15));
        assert_eq!(month, Period::new(d(2024, 12, 1), d(2025, 1, 1)));

        let feb = Period::month(d(2024, 2, 29));
        assert_eq!(feb, Period::new(d(2024, 2, 1), d(2024, 3, 1)));

        let year = Period::year(d(2024, 7, 4));
        assert_eq!(year, Period::new(d(2024, 1, 1), d(2025, 1, 1)));
    }

    #[test]
    fn test_period_is_half_open() {
        let day = Period::day(d(2024, 3, 1));
        assert!(day.contains(d(2024, 3, 1)));
        assert!(!day.contains(d(2024, 3, 2)));
        assert!(!day.contains(d(2024, 2, 29)));
    }

    #[test]
    fn test_fetch_range_covers_week_across_new_year() {
        // 2025-01-02 is a Thursday; its week starts 2024-12-29
        let windows = DashboardWindows::for_today(d(2025, 1, 2));
        let range = windows.fetch_range();
        assert_eq!(range.start, d(2024, 12, 29));
        assert_eq!(range.end, d(2026, 1, 1));
    }

    #[test]
    fn test_calendar_year() {
        let year = Period::calendar_year(2024).unwrap();
        assert!(year.contains(d(2024, 12, 31)));
        assert!(!year.contains(d(2023, 12, 31)));
        assert!(!year.contains(d(2025, 1, 1)));
    }

    #[test]
    fn test_summary_addition() {
        let a = PeriodSummary {
            total_quantity: Decimal::new(15, 1),
            total_value: Decimal::new(300, 2),
            count: 2,
            skipped: 1,
        };
        let total: PeriodSummary = vec![a, a, PeriodSummary::default()].into_iter().sum();
        assert_eq!(total.total_quantity, Decimal::new(30, 1));
        assert_eq!(total.count, 4);
        assert_eq!(total.skipped, 2);
    }

    fn produce(name: &str, factor: Decimal, price: Decimal) -> crate::models::ProduceType {
        crate::models::ProduceType {
            id: Uuid::new_v4(),
            category_id: Uuid::new_v4(),
            name: name.to_string(),
            unit_type: crate::models::UnitType::Bunches,
            conversion_factor: factor,
            price_per_lb: price,
            serving_weight_oz: Decimal::ZERO,
            servings_per_lb: Decimal::ZERO,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn harvest(
        produce_type: &crate::models::ProduceType,
        quantity: Decimal,
        weight: Option<Decimal>,
        date: NaiveDate,
    ) -> HarvestEntry {
        HarvestEntry {
            id: Uuid::new_v4(),
            produce_type_id: produce_type.id,
            pantry_id: None,
            quantity,
            unit: "stems".to_string(),
            weight_lb: weight,
            weight_estimated: weight.is_none(),
            harvest_date: date,
            harvester_name: None,
            notes: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_trend_keeps_zero_factor_dates() {
        let sunflowers = produce("Sunflowers", Decimal::ZERO, Decimal::ZERO);
        let entries = vec![harvest(&sunflowers, Decimal::new(12, 0), None, d(2024, 6, 1))];
        let catalog = Catalog::from_produce_types(vec![sunflowers]);

        let points = trend(&entries, &catalog, DEFAULT_TREND_POINTS);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].date, d(2024, 6, 1));
        assert_eq!(points[0].quantity_lb, Decimal::ZERO);
    }

    #[test]
    fn test_trend_skips_unresolved_and_empty_entries() {
        let sunflowers = produce("Sunflowers", Decimal::ZERO, Decimal::ZERO);
        let orphan = produce("Gone", Decimal::ONE, Decimal::ONE);
        let entries = vec![
            harvest(&orphan, Decimal::new(5, 0), None, d(2024, 6, 2)),
            harvest(&sunflowers, Decimal::ZERO, None, d(2024, 6, 3)),
        ];
        let catalog = Catalog::from_produce_types(vec![sunflowers]);
        assert!(trend(&entries, &catalog, DEFAULT_TREND_POINTS).is_empty());
    }

    #[test]
    fn test_overflowing_entries_are_skipped() {
        let squash = produce("Squash", Decimal::new(1000, 0), Decimal::ONE);
        let today = d(2024, 6, 1);
        let entries = vec![
            harvest(&squash, Decimal::MAX, None, today),
            harvest(&squash, Decimal::ONE, Some(Decimal::MAX), today),
            harvest(&squash, Decimal::ONE, Some(Decimal::MAX), today),
        ];
        let catalog = Catalog::from_produce_types(vec![squash]);

        let summary = summarize(&entries, &catalog, Period::day(today));
        assert_eq!(summary.count, 3);
        // First cannot be normalized, third would overflow the running total
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.total_quantity, Decimal::MAX);

        let rows = breakdown(&entries, &catalog);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].quantity_lb, Decimal::MAX);

        let points = trend(&entries, &catalog, DEFAULT_TREND_POINTS);
        assert_eq!(points[0].quantity_lb, Decimal::MAX);
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(
            percent_of(Decimal::new(25, 0), Decimal::new(200, 0)),
            Some(Decimal::new(125, 1))
        );
        assert_eq!(percent_of(Decimal::ONE, Decimal::ZERO), None);
        assert_eq!(percent_of(Decimal::MAX, Decimal::new(1, 2)), None);
    }

    mod window_props {
        use super::*;
        use chrono::{Datelike, Weekday};
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn windows_nest_around_today(offset in 0i64..20_000) {
                let today = d(1990, 1, 1) + chrono::Duration::days(offset);
                let windows = DashboardWindows::for_today(today);

                prop_assert!(windows.daily.contains(today));
                prop_assert!(windows.weekly.contains(today));
                prop_assert!(windows.monthly.contains(today));
                prop_assert!(windows.yearly.contains(today));

                prop_assert_eq!(windows.weekly.start.weekday(), Weekday::Sun);
                prop_assert_eq!((windows.weekly.end - windows.weekly.start).num_days(), 7);
                prop_assert_eq!(windows.monthly.start.day(), 1);
                prop_assert_eq!(windows.yearly.start.ordinal(), 1);

                let range = windows.fetch_range();
                prop_assert!(range.start <= windows.weekly.start);
                prop_assert!(range.start <= windows.yearly.start);
                prop_assert!(range.end >= windows.weekly.end);
                prop_assert!(range.end >= windows.yearly.end);
            }
        }
    }
}
