//! Dashboard aggregation property-based and unit tests
//!
//! Covers:
//! - Period totals are additive across any partition of the entries
//! - Normalization is deterministic and honours the weight policy
//! - Breakdown and trend exclusion rules
//! - Pantry progress: zero-commitment exclusion and calendar-year boundaries
//! - End-to-end harvest scenario

use chrono::{NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use shared::{
    breakdown, progress, summarize, trend, visible_progress, Catalog, CommitmentAmounts,
    ContactInfo, DashboardSummary, DashboardWindows, FoodPantry, HarvestEntry, Period,
    PeriodSummary, ProduceType, UnitType,
};

// ============================================================================
// Fixtures
// ============================================================================

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn produce_type(name: &str, unit_type: UnitType, factor: Decimal, price: Decimal) -> ProduceType {
    ProduceType {
        id: Uuid::new_v4(),
        category_id: Uuid::new_v4(),
        name: name.to_string(),
        unit_type,
        conversion_factor: factor,
        price_per_lb: price,
        serving_weight_oz: Decimal::ZERO,
        servings_per_lb: Decimal::ZERO,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn kale() -> ProduceType {
    produce_type("Kale", UnitType::Bunches, dec!(0.19), dec!(3.43))
}

fn tomatoes() -> ProduceType {
    produce_type("Tomatoes", UnitType::Pounds, dec!(1.0), dec!(2.19))
}

fn entry(
    produce_type_id: Uuid,
    quantity: Decimal,
    weight: Option<Decimal>,
    harvest_date: NaiveDate,
) -> HarvestEntry {
    HarvestEntry {
        id: Uuid::new_v4(),
        produce_type_id,
        pantry_id: None,
        quantity,
        unit: "lbs".to_string(),
        weight_lb: weight,
        weight_estimated: weight.is_none(),
        harvest_date,
        harvester_name: None,
        notes: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn delivered_to(pantry: &FoodPantry, mut e: HarvestEntry) -> HarvestEntry {
    e.pantry_id = Some(pantry.id);
    e
}

fn pantry(name: &str, total: Decimal) -> FoodPantry {
    FoodPantry {
        id: Uuid::new_v4(),
        name: name.to_string(),
        contact_info: ContactInfo::default(),
        commitment_amounts: CommitmentAmounts {
            total,
            ..CommitmentAmounts::default()
        },
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Quantity with two decimal places, 0.00 to 500.00
fn quantity_strategy() -> impl Strategy<Value = Decimal> {
    (0..=50_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Optional explicit weight, absent about half of the time
fn weight_strategy() -> impl Strategy<Value = Option<Decimal>> {
    prop::option::of((1..=20_000i64).prop_map(|n| Decimal::new(n, 2)))
}

/// (produce index, day of March 2024, quantity, explicit weight)
fn entry_strategy() -> impl Strategy<Value = (usize, u32, Decimal, Option<Decimal>)> {
    (0..3usize, 1..=31u32, quantity_strategy(), weight_strategy())
}

/// Catalog of kale and tomatoes plus entries that sometimes reference an
/// unknown produce type (index 2)
fn build_entries(shapes: &[(usize, u32, Decimal, Option<Decimal>)]) -> (Catalog, Vec<HarvestEntry>) {
    let types = vec![kale(), tomatoes()];
    let entries = shapes
        .iter()
        .map(|(idx, day, qty, weight)| {
            let id = types.get(*idx).map_or_else(Uuid::new_v4, |pt| pt.id);
            entry(id, *qty, *weight, date(2024, 3, *day))
        })
        .collect();
    (Catalog::from_produce_types(types), entries)
}

proptest! {
    /// Summing daily windows reproduces the monthly window exactly
    #[test]
    fn test_daily_totals_add_up_to_month(
        shapes in prop::collection::vec(entry_strategy(), 0..60)
    ) {
        let (catalog, entries) = build_entries(&shapes);
        let month = Period::month(date(2024, 3, 10));

        let by_day: PeriodSummary = (1..=31)
            .map(|d| summarize(&entries, &catalog, Period::day(date(2024, 3, d))))
            .sum();

        prop_assert_eq!(by_day, summarize(&entries, &catalog, month));
    }

    /// Any split of the entries recombines into the unsplit total
    #[test]
    fn test_partition_additivity(
        shapes in prop::collection::vec(entry_strategy(), 0..60),
        split in 0usize..60
    ) {
        let (catalog, entries) = build_entries(&shapes);
        let split = split.min(entries.len());
        let (left, right) = entries.split_at(split);
        let month = Period::month(date(2024, 3, 1));

        let combined = summarize(left, &catalog, month) + summarize(right, &catalog, month);
        prop_assert_eq!(combined, summarize(&entries, &catalog, month));
    }

    /// Normalizing the same entry twice yields identical output
    #[test]
    fn test_normalization_is_deterministic(
        qty in quantity_strategy(),
        weight in weight_strategy()
    ) {
        let pt = kale();
        let e = entry(pt.id, qty, weight, date(2024, 3, 1));
        let catalog = Catalog::from_produce_types(vec![pt]);
        prop_assert_eq!(catalog.normalize(&e), catalog.normalize(&e));
    }

    /// Explicit weight wins; otherwise quantity times the conversion factor
    #[test]
    fn test_weight_policy(
        qty in quantity_strategy(),
        weight in weight_strategy()
    ) {
        let pt = kale();
        let e = entry(pt.id, qty, weight, date(2024, 3, 1));
        let n = shared::normalize(&e, Some(&pt));
        match weight {
            Some(w) => {
                prop_assert_eq!(n.weight_lb, w);
                prop_assert!(!n.weight_estimated);
            }
            None => {
                prop_assert_eq!(n.weight_lb, qty * dec!(0.19));
                prop_assert!(n.weight_estimated);
            }
        }
        prop_assert_eq!(n.value_usd, n.weight_lb * dec!(3.43));
    }

    /// Counts include unresolved entries; skipped counts only those
    #[test]
    fn test_count_and_skipped(
        shapes in prop::collection::vec(entry_strategy(), 0..60)
    ) {
        let (catalog, entries) = build_entries(&shapes);
        let summary = summarize(&entries, &catalog, Period::month(date(2024, 3, 1)));
        let unresolved = shapes.iter().filter(|(idx, ..)| *idx == 2).count() as u64;
        prop_assert_eq!(summary.count, shapes.len() as u64);
        prop_assert_eq!(summary.skipped, unresolved);
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod weight_policy_tests {
    use super::*;

    #[test]
    fn test_estimated_bunches() {
        let pt = kale();
        let n = shared::normalize(&entry(pt.id, dec!(10), None, date(2024, 3, 1)), Some(&pt));
        assert_eq!(n.weight_lb, dec!(1.9));
        assert!(n.weight_estimated);
    }

    #[test]
    fn test_explicit_weight() {
        let pt = kale();
        let n = shared::normalize(
            &entry(pt.id, dec!(10), Some(dec!(2.0)), date(2024, 3, 1)),
            Some(&pt),
        );
        assert_eq!(n.weight_lb, dec!(2.0));
        assert!(!n.weight_estimated);
    }

    #[test]
    fn test_stored_estimate_follows_current_factor() {
        let pt = kale();
        let mut e = entry(pt.id, dec!(10), Some(dec!(1.9)), date(2024, 3, 1));
        e.weight_estimated = true;

        let repriced = ProduceType {
            conversion_factor: dec!(0.25),
            ..pt
        };
        let n = shared::normalize(&e, Some(&repriced));
        assert_eq!(n.weight_lb, dec!(2.5));
        assert!(n.weight_estimated);
    }
}

#[cfg(test)]
mod breakdown_tests {
    use super::*;

    #[test]
    fn test_zero_weight_entries_are_excluded() {
        let pt = kale();
        let catalog = Catalog::from_produce_types(vec![pt.clone()]);
        let entries = vec![
            entry(pt.id, Decimal::ZERO, None, date(2024, 3, 1)),
            entry(Uuid::new_v4(), dec!(5), Some(dec!(5)), date(2024, 3, 1)),
        ];
        assert!(breakdown(&entries, &catalog).is_empty());
    }

    #[test]
    fn test_sorted_heaviest_first_with_stable_ties() {
        let beans = produce_type("Beans", UnitType::Pounds, dec!(1), dec!(2));
        let peas = produce_type("Peas", UnitType::Pounds, dec!(1), dec!(2));
        let kale = kale();
        let entries = vec![
            entry(beans.id, dec!(3), None, date(2024, 3, 1)),
            entry(peas.id, dec!(3), None, date(2024, 3, 2)),
            entry(kale.id, dec!(100), None, date(2024, 3, 3)),
        ];
        let catalog = Catalog::from_produce_types(vec![beans, peas, kale]);

        let names: Vec<String> = breakdown(&entries, &catalog)
            .into_iter()
            .map(|row| row.name)
            .collect();
        assert_eq!(names, vec!["Kale", "Beans", "Peas"]);
    }

    #[test]
    fn test_groups_by_produce_name() {
        let pt = tomatoes();
        let catalog = Catalog::from_produce_types(vec![pt.clone()]);
        let entries = vec![
            entry(pt.id, dec!(4), None, date(2024, 3, 1)),
            entry(pt.id, dec!(6), None, date(2024, 3, 9)),
        ];
        let rows = breakdown(&entries, &catalog);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].quantity_lb, dec!(10.0));
        assert_eq!(rows[0].value_usd, dec!(21.90));
    }
}

#[cfg(test)]
mod trend_tests {
    use super::*;

    #[test]
    fn test_one_point_per_date_ascending() {
        let pt = tomatoes();
        let catalog = Catalog::from_produce_types(vec![pt.clone()]);
        let entries = vec![
            entry(pt.id, dec!(2), None, date(2024, 3, 5)),
            entry(pt.id, dec!(1), None, date(2024, 3, 1)),
            entry(pt.id, dec!(3), None, date(2024, 3, 5)),
            entry(pt.id, Decimal::ZERO, None, date(2024, 3, 3)),
        ];
        let points = trend(&entries, &catalog, 500);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, date(2024, 3, 1));
        assert_eq!(points[1].date, date(2024, 3, 5));
        assert_eq!(points[1].quantity_lb, dec!(5.0));
    }

    #[test]
    fn test_keeps_most_recent_points() {
        let pt = tomatoes();
        let catalog = Catalog::from_produce_types(vec![pt.clone()]);
        let entries: Vec<HarvestEntry> = (1..=10)
            .map(|d| entry(pt.id, dec!(1), None, date(2024, 3, d)))
            .collect();
        let points = trend(&entries, &catalog, 3);
        let dates: Vec<NaiveDate> = points.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![date(2024, 3, 8), date(2024, 3, 9), date(2024, 3, 10)]);
    }
}

#[cfg(test)]
mod pantry_progress_tests {
    use super::*;

    #[test]
    fn test_zero_commitment_pantries_are_excluded() {
        let pt = tomatoes();
        let catalog = Catalog::from_produce_types(vec![pt.clone()]);
        let uncommitted = pantry("Walk-in Pantry", Decimal::ZERO);
        let entries = vec![delivered_to(
            &uncommitted,
            entry(pt.id, dec!(50), None, date(2024, 5, 1)),
        )];

        let rows = progress(&[uncommitted], &entries, &catalog, 2024);
        assert!(rows.is_empty());
    }

    #[test]
    fn test_year_boundary() {
        let pt = tomatoes();
        let catalog = Catalog::from_produce_types(vec![pt.clone()]);
        let grin = pantry("GRIN", dec!(1800));
        let entries = vec![
            delivered_to(&grin, entry(pt.id, dec!(40), None, date(2023, 12, 31))),
            delivered_to(&grin, entry(pt.id, dec!(10), None, date(2024, 1, 1))),
            delivered_to(&grin, entry(pt.id, dec!(5), None, date(2025, 1, 1))),
        ];

        let rows = progress(&[grin], &entries, &catalog, 2024);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].delivered_lb, dec!(10.0));
        assert_eq!(rows[0].remaining_lb, dec!(1790.0));
    }

    #[test]
    fn test_ordering_percentage_and_visibility() {
        let pt = tomatoes();
        let catalog = Catalog::from_produce_types(vec![pt.clone()]);
        let small = pantry("Faith Care Ministry", dec!(800));
        let large = pantry("Broad Street Presbyterian", dec!(2200));
        let idle = pantry("Motherful Columbus", dec!(1000));
        let entries = vec![
            delivered_to(&small, entry(pt.id, dec!(200), None, date(2024, 6, 1))),
            delivered_to(&large, entry(pt.id, dec!(1100), None, date(2024, 6, 2))),
        ];

        let rows = progress(&[small, large, idle], &entries, &catalog, 2024);
        let names: Vec<&str> = rows.iter().map(|r| r.pantry.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Broad Street Presbyterian", "Faith Care Ministry", "Motherful Columbus"]
        );
        assert_eq!(rows[0].percentage, dec!(50));
        assert_eq!(rows[1].percentage, dec!(25));
        assert_eq!(rows[2].delivered_lb, Decimal::ZERO);

        let visible = visible_progress(rows);
        assert_eq!(visible.len(), 2);
    }

    #[test]
    fn test_remaining_never_negative() {
        let pt = tomatoes();
        let catalog = Catalog::from_produce_types(vec![pt.clone()]);
        let p = pantry("New Albany Food Pantry", dec!(100));
        let entries = vec![delivered_to(&p, entry(pt.id, dec!(150), None, date(2024, 7, 1)))];

        let rows = progress(&[p], &entries, &catalog, 2024);
        assert_eq!(rows[0].remaining_lb, Decimal::ZERO);
        assert_eq!(rows[0].percentage, dec!(150));
    }
}

#[cfg(test)]
mod end_to_end_tests {
    use super::*;

    #[test]
    fn test_kale_and_tomatoes_in_march() {
        let kale = kale();
        let tomatoes = tomatoes();
        let entries = vec![
            entry(kale.id, dec!(5), None, date(2024, 3, 1)),
            entry(tomatoes.id, dec!(10), Some(dec!(10)), date(2024, 3, 1)),
        ];
        let catalog = Catalog::from_produce_types(vec![kale, tomatoes]);

        let rows = breakdown(&entries, &catalog);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Tomatoes");
        assert_eq!(rows[0].quantity_lb, dec!(10));
        assert_eq!(rows[0].value_usd.round_dp(2), dec!(21.90));
        assert_eq!(rows[1].name, "Kale");
        assert_eq!(rows[1].quantity_lb, dec!(0.95));
        assert_eq!(rows[1].value_usd.round_dp(2), dec!(3.26));

        let windows = DashboardWindows::for_today(date(2024, 3, 15));
        let summary = DashboardSummary::compute(&entries, &catalog, &windows);
        assert_eq!(summary.monthly.total_quantity, dec!(10.95));
        assert_eq!(summary.monthly.total_value.round_dp(2), dec!(25.16));
        assert_eq!(summary.monthly.count, 2);
        assert_eq!(summary.yearly, summary.monthly);
        assert_eq!(summary.daily.count, 0);
        assert_eq!(summary.weekly.count, 0);

        // Harvest day itself: both entries land in every window
        let windows = DashboardWindows::for_today(date(2024, 3, 1));
        let summary = DashboardSummary::compute(&entries, &catalog, &windows);
        assert_eq!(summary.daily.count, 2);
        assert_eq!(summary.daily.total_quantity, dec!(10.95));
        assert_eq!(summary.daily.total_value.round_dp(2), dec!(25.16));
        assert_eq!(summary.weekly, summary.daily);
        assert_eq!(summary.monthly, summary.daily);

        let points = trend(&entries, &catalog, 500);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].quantity_lb, dec!(10.95));
    }
}
