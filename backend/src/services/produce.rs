//! Produce type service

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use shared::{ProduceType, UnitType};

/// Produce type service for managing the produce catalog
#[derive(Clone)]
pub struct ProduceService {
    db: PgPool,
}

/// Database row for a produce type, joined with its category name
#[derive(Debug, Clone, sqlx::FromRow)]
struct ProduceTypeRow {
    id: Uuid,
    category_id: Uuid,
    name: String,
    unit_type: String,
    conversion_factor: Decimal,
    price_per_lb: Decimal,
    serving_weight_oz: Decimal,
    servings_per_lb: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    category_name: Option<String>,
}

impl TryFrom<ProduceTypeRow> for ProduceTypeWithCategory {
    type Error = AppError;

    fn try_from(row: ProduceTypeRow) -> Result<Self, Self::Error> {
        let unit_type: UnitType = row
            .unit_type
            .parse()
            .map_err(|e: shared::UnknownUnitType| AppError::Internal(e.to_string()))?;

        Ok(Self {
            produce_type: ProduceType {
                id: row.id,
                category_id: row.category_id,
                name: row.name,
                unit_type,
                conversion_factor: row.conversion_factor,
                price_per_lb: row.price_per_lb,
                serving_weight_oz: row.serving_weight_oz,
                servings_per_lb: row.servings_per_lb,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            category_name: row.category_name,
        })
    }
}

/// Produce type with its category name for API responses
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProduceTypeWithCategory {
    #[serde(flatten)]
    pub produce_type: ProduceType,
    pub category_name: Option<String>,
}

/// Input for creating a produce type
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProduceTypeInput {
    #[serde(alias = "category_id")]
    pub category_id: Uuid,
    #[validate(length(min = 1, max = 200, message = "Name must be 1 to 200 characters"))]
    pub name: String,
    #[serde(alias = "unit_type")]
    pub unit_type: UnitType,
    #[serde(alias = "conversion_factor")]
    pub conversion_factor: Decimal,
    #[serde(default, alias = "price_per_lb")]
    pub price_per_lb: Decimal,
    #[serde(default, alias = "serving_weight_oz")]
    pub serving_weight_oz: Decimal,
    #[serde(default, alias = "servings_per_lb")]
    pub servings_per_lb: Decimal,
}

/// Input for updating a produce type
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProduceTypeInput {
    #[serde(default, alias = "category_id")]
    pub category_id: Option<Uuid>,
    #[validate(length(min = 1, max = 200, message = "Name must be 1 to 200 characters"))]
    pub name: Option<String>,
    #[serde(default, alias = "unit_type")]
    pub unit_type: Option<UnitType>,
    #[serde(default, alias = "conversion_factor")]
    pub conversion_factor: Option<Decimal>,
    #[serde(default, alias = "price_per_lb")]
    pub price_per_lb: Option<Decimal>,
    #[serde(default, alias = "serving_weight_oz")]
    pub serving_weight_oz: Option<Decimal>,
    #[serde(default, alias = "servings_per_lb")]
    pub servings_per_lb: Option<Decimal>,
}

const SELECT_PRODUCE_TYPE: &str = r#"
    SELECT pt.id, pt.category_id, pt.name, pt.unit_type, pt.conversion_factor,
           pt.price_per_lb, pt.serving_weight_oz, pt.servings_per_lb,
           pt.created_at, pt.updated_at, c.name AS category_name
    FROM produce_types pt
    LEFT JOIN produce_categories c ON c.id = pt.category_id
"#;

/// Numeric rules shared by create and update
fn check_amounts(
    conversion_factor: Decimal,
    price_per_lb: Decimal,
    serving_weight_oz: Decimal,
    servings_per_lb: Decimal,
) -> AppResult<()> {
    shared::validate_conversion_factor(conversion_factor)
        .map_err(|msg| AppError::invalid("conversionFactor", msg))?;
    shared::validate_price(price_per_lb).map_err(|msg| AppError::invalid("pricePerLb", msg))?;
    if serving_weight_oz < Decimal::ZERO {
        return Err(AppError::invalid("servingWeightOz", "Serving weight cannot be negative"));
    }
    if servings_per_lb < Decimal::ZERO {
        return Err(AppError::invalid("servingsPerLb", "Servings per pound cannot be negative"));
    }
    Ok(())
}

impl ProduceService {
    /// Create a new ProduceService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// All produce types ordered by name
    pub async fn find_produce_types(&self) -> AppResult<Vec<ProduceTypeWithCategory>> {
        let rows = sqlx::query_as::<_, ProduceTypeRow>(&format!(
            "{SELECT_PRODUCE_TYPE} ORDER BY pt.name"
        ))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(ProduceTypeWithCategory::try_from).collect()
    }

    pub async fn get_produce_type(&self, id: Uuid) -> AppResult<ProduceTypeWithCategory> {
        sqlx::query_as::<_, ProduceTypeRow>(&format!("{SELECT_PRODUCE_TYPE} WHERE pt.id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Produce type".to_string()))?
            .try_into()
    }

    async fn ensure_category(&self, category_id: Uuid) -> AppResult<()> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM produce_categories WHERE id = $1)",
        )
        .bind(category_id)
        .fetch_one(&self.db)
        .await?;

        if exists {
            Ok(())
        } else {
            Err(AppError::NotFound("Category".to_string()))
        }
    }

    pub async fn create_produce_type(
        &self,
        input: CreateProduceTypeInput,
    ) -> AppResult<ProduceTypeWithCategory> {
        input.validate()?;
        shared::validate_name(&input.name).map_err(|msg| AppError::invalid("name", msg))?;
        check_amounts(
            input.conversion_factor,
            input.price_per_lb,
            input.serving_weight_oz,
            input.servings_per_lb,
        )?;
        self.ensure_category(input.category_id).await?;

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO produce_types (category_id, name, unit_type, conversion_factor,
                                       price_per_lb, serving_weight_oz, servings_per_lb)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(input.category_id)
        .bind(input.name.trim())
        .bind(input.unit_type.as_str())
        .bind(input.conversion_factor)
        .bind(input.price_per_lb)
        .bind(input.serving_weight_oz)
        .bind(input.servings_per_lb)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(produce_type_id = %id, name = %input.name, "created produce type");
        self.get_produce_type(id).await
    }

    pub async fn update_produce_type(
        &self,
        id: Uuid,
        input: UpdateProduceTypeInput,
    ) -> AppResult<ProduceTypeWithCategory> {
        input.validate()?;
        let existing = self.get_produce_type(id).await?.produce_type;

        let category_id = input.category_id.unwrap_or(existing.category_id);
        let name = input.name.unwrap_or(existing.name);
        let unit_type = input.unit_type.unwrap_or(existing.unit_type);
        let conversion_factor = input.conversion_factor.unwrap_or(existing.conversion_factor);
        let price_per_lb = input.price_per_lb.unwrap_or(existing.price_per_lb);
        let serving_weight_oz = input.serving_weight_oz.unwrap_or(existing.serving_weight_oz);
        let servings_per_lb = input.servings_per_lb.unwrap_or(existing.servings_per_lb);

        shared::validate_name(&name).map_err(|msg| AppError::invalid("name", msg))?;
        check_amounts(conversion_factor, price_per_lb, serving_weight_oz, servings_per_lb)?;
        if input.category_id.is_some() {
            self.ensure_category(category_id).await?;
        }

        sqlx::query(
            r#"
            UPDATE produce_types
            SET category_id = $2, name = $3, unit_type = $4, conversion_factor = $5,
                price_per_lb = $6, serving_weight_oz = $7, servings_per_lb = $8,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(category_id)
        .bind(name.trim())
        .bind(unit_type.as_str())
        .bind(conversion_factor)
        .bind(price_per_lb)
        .bind(serving_weight_oz)
        .bind(servings_per_lb)
        .execute(&self.db)
        .await?;

        self.get_produce_type(id).await
    }

    /// Delete a produce type; refused while harvest entries reference it
    pub async fn delete_produce_type(&self, id: Uuid) -> AppResult<()> {
        let references = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM harvest_entries WHERE produce_type_id = $1",
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        if references > 0 {
            return Err(AppError::Conflict {
                resource: "produce_type".to_string(),
                message: format!(
                    "Produce type is used by {} harvest entr{} and cannot be deleted",
                    references,
                    if references == 1 { "y" } else { "ies" }
                ),
            });
        }

        let result = sqlx::query("DELETE FROM produce_types WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Produce type".to_string()));
        }

        tracing::info!(produce_type_id = %id, "deleted produce type");
        Ok(())
    }
}
