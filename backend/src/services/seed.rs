//! Seed data loader
//!
//! Loads the standard categories, produce catalog and partner pantries from
//! CSV files embedded at compile time. Records that already exist (matched by
//! name) are left untouched, so seeding can be repeated safely.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use shared::UnitType;

const CATEGORIES_CSV: &str = include_str!("../../seed/categories.csv");
const PRODUCE_TYPES_CSV: &str = include_str!("../../seed/produce_types.csv");
const FOOD_PANTRIES_CSV: &str = include_str!("../../seed/food_pantries.csv");

#[derive(Debug, Clone, Deserialize)]
pub struct CategorySeed {
    pub name: String,
    pub description: Option<String>,
    pub display_order: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProduceTypeSeed {
    pub category: String,
    pub name: String,
    pub unit_type: UnitType,
    pub serving_weight_oz: Decimal,
    pub servings_per_lb: Decimal,
    pub price_per_lb: Decimal,
    pub conversion_factor: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PantrySeed {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub total: Decimal,
    pub vegetables: Decimal,
    pub fruits: Decimal,
    pub herbs: Decimal,
    pub flowers: Decimal,
}

/// Parsed seed files
#[derive(Debug, Clone)]
pub struct SeedData {
    pub categories: Vec<CategorySeed>,
    pub produce_types: Vec<ProduceTypeSeed>,
    pub pantries: Vec<PantrySeed>,
}

/// Number of rows inserted per table
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    pub categories: u64,
    pub produce_types: u64,
    pub food_pantries: u64,
}

fn parse_csv<T: for<'de> Deserialize<'de>>(name: &str, data: &str) -> AppResult<Vec<T>> {
    csv::Reader::from_reader(data.as_bytes())
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|e| AppError::Internal(format!("Invalid seed file {}: {}", name, e)))
}

impl SeedData {
    /// Parse the embedded seed files
    pub fn embedded() -> AppResult<Self> {
        Ok(Self {
            categories: parse_csv("categories.csv", CATEGORIES_CSV)?,
            produce_types: parse_csv("produce_types.csv", PRODUCE_TYPES_CSV)?,
            pantries: parse_csv("food_pantries.csv", FOOD_PANTRIES_CSV)?,
        })
    }
}

/// Seed service
#[derive(Clone)]
pub struct SeedService {
    db: PgPool,
}

impl SeedService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Insert every seed record whose name is not already present
    pub async fn seed(&self) -> AppResult<SeedReport> {
        let data = SeedData::embedded()?;
        let mut report = SeedReport::default();
        let mut tx = self.db.begin().await?;

        for category in &data.categories {
            report.categories += sqlx::query(
                r#"
                INSERT INTO produce_categories (name, description, display_order)
                VALUES ($1, $2, $3)
                ON CONFLICT (name) DO NOTHING
                "#,
            )
            .bind(&category.name)
            .bind(&category.description)
            .bind(category.display_order)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        for pt in &data.produce_types {
            report.produce_types += sqlx::query(
                r#"
                INSERT INTO produce_types (category_id, name, unit_type, conversion_factor,
                                           price_per_lb, serving_weight_oz, servings_per_lb)
                SELECT c.id, $2, $3, $4, $5, $6, $7
                FROM produce_categories c
                WHERE c.name = $1
                ON CONFLICT (name) DO NOTHING
                "#,
            )
            .bind(&pt.category)
            .bind(&pt.name)
            .bind(pt.unit_type.as_str())
            .bind(pt.conversion_factor)
            .bind(pt.price_per_lb)
            .bind(pt.serving_weight_oz)
            .bind(pt.servings_per_lb)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        for pantry in &data.pantries {
            report.food_pantries += sqlx::query(
                r#"
                INSERT INTO food_pantries (name, phone, email, address, commitment_total,
                                           commitment_vegetables, commitment_fruits,
                                           commitment_herbs, commitment_flowers)
                SELECT $1, $2, $3, $4, $5, $6, $7, $8, $9
                WHERE NOT EXISTS (SELECT 1 FROM food_pantries WHERE name = $1)
                "#,
            )
            .bind(&pantry.name)
            .bind(&pantry.phone)
            .bind(&pantry.email)
            .bind(&pantry.address)
            .bind(pantry.total)
            .bind(pantry.vegetables)
            .bind(pantry.fruits)
            .bind(pantry.herbs)
            .bind(pantry.flowers)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        tx.commit().await?;

        tracing::info!(
            categories = report.categories,
            produce_types = report.produce_types,
            food_pantries = report.food_pantries,
            "seed data loaded"
        );
        Ok(report)
    }
}
