//! Food pantry service

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use shared::{CommitmentAmounts, ContactInfo, FoodPantry};

/// Pantry service for managing food pantries and their commitments
#[derive(Clone)]
pub struct PantryService {
    db: PgPool,
}

/// Database row for a pantry; contact and commitments are flat columns
#[derive(Debug, Clone, sqlx::FromRow)]
struct PantryRow {
    id: Uuid,
    name: String,
    phone: Option<String>,
    email: Option<String>,
    address: Option<String>,
    commitment_total: Decimal,
    commitment_vegetables: Decimal,
    commitment_fruits: Decimal,
    commitment_herbs: Decimal,
    commitment_flowers: Decimal,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PantryRow> for FoodPantry {
    fn from(row: PantryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            contact_info: ContactInfo {
                phone: row.phone,
                email: row.email,
                address: row.address,
            },
            commitment_amounts: CommitmentAmounts {
                total: row.commitment_total,
                vegetables: row.commitment_vegetables,
                fruits: row.commitment_fruits,
                herbs: row.commitment_herbs,
                flowers: row.commitment_flowers,
            },
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Input for creating a pantry
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePantryInput {
    #[validate(length(min = 1, max = 200, message = "Name must be 1 to 200 characters"))]
    pub name: String,
    #[serde(default, alias = "contact_info")]
    pub contact_info: ContactInfo,
    #[serde(default, alias = "commitment_amounts")]
    pub commitment_amounts: CommitmentAmounts,
    #[serde(default, alias = "is_active")]
    pub is_active: Option<bool>,
}

/// Input for updating a pantry
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePantryInput {
    #[validate(length(min = 1, max = 200, message = "Name must be 1 to 200 characters"))]
    pub name: Option<String>,
    #[serde(default, alias = "contact_info")]
    pub contact_info: Option<ContactInfo>,
    #[serde(default, alias = "commitment_amounts")]
    pub commitment_amounts: Option<CommitmentAmounts>,
    #[serde(default, alias = "is_active")]
    pub is_active: Option<bool>,
}

const SELECT_PANTRY: &str = r#"
    SELECT id, name, phone, email, address,
           commitment_total, commitment_vegetables, commitment_fruits,
           commitment_herbs, commitment_flowers, is_active, created_at, updated_at
    FROM food_pantries
"#;

fn check_pantry(name: &str, contact: &ContactInfo, amounts: &CommitmentAmounts) -> AppResult<()> {
    shared::validate_name(name).map_err(|msg| AppError::invalid("name", msg))?;
    if let Some(email) = contact.email.as_deref().filter(|e| !e.is_empty()) {
        shared::validate_email(email).map_err(|msg| AppError::invalid("contactInfo.email", msg))?;
    }
    if let Some(phone) = contact.phone.as_deref().filter(|p| !p.is_empty()) {
        shared::validate_phone(phone).map_err(|msg| AppError::invalid("contactInfo.phone", msg))?;
    }
    shared::validate_commitments(amounts)
        .map_err(|msg| AppError::invalid("commitmentAmounts", msg))?;
    if !shared::commitments_balanced(amounts) {
        tracing::warn!(
            pantry = %name,
            total = %amounts.total,
            category_sum = %amounts.category_sum(),
            "pantry category commitments do not add up to the total"
        );
    }
    Ok(())
}

impl PantryService {
    /// Create a new PantryService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// All pantries ordered by name
    pub async fn find_food_pantries(&self) -> AppResult<Vec<FoodPantry>> {
        let rows = sqlx::query_as::<_, PantryRow>(&format!("{SELECT_PANTRY} ORDER BY name"))
            .fetch_all(&self.db)
            .await?;

        Ok(rows.into_iter().map(FoodPantry::from).collect())
    }

    pub async fn get_pantry(&self, id: Uuid) -> AppResult<FoodPantry> {
        sqlx::query_as::<_, PantryRow>(&format!("{SELECT_PANTRY} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .map(FoodPantry::from)
            .ok_or_else(|| AppError::NotFound("Food pantry".to_string()))
    }

    pub async fn create_pantry(&self, input: CreatePantryInput) -> AppResult<FoodPantry> {
        input.validate()?;
        check_pantry(&input.name, &input.contact_info, &input.commitment_amounts)?;

        let row = sqlx::query_as::<_, PantryRow>(&format!(
            r#"
            INSERT INTO food_pantries (name, phone, email, address, commitment_total,
                                       commitment_vegetables, commitment_fruits,
                                       commitment_herbs, commitment_flowers, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            RETURNING_COLUMNS
        ))
        .bind(input.name.trim())
        .bind(&input.contact_info.phone)
        .bind(&input.contact_info.email)
        .bind(&input.contact_info.address)
        .bind(input.commitment_amounts.total)
        .bind(input.commitment_amounts.vegetables)
        .bind(input.commitment_amounts.fruits)
        .bind(input.commitment_amounts.herbs)
        .bind(input.commitment_amounts.flowers)
        .bind(input.is_active.unwrap_or(true))
        .fetch_one(&self.db)
        .await?;

        tracing::info!(pantry_id = %row.id, name = %row.name, "created food pantry");
        Ok(row.into())
    }

    pub async fn update_pantry(&self, id: Uuid, input: UpdatePantryInput) -> AppResult<FoodPantry> {
        input.validate()?;
        let existing = self.get_pantry(id).await?;

        let name = input.name.unwrap_or(existing.name);
        let contact = input.contact_info.unwrap_or(existing.contact_info);
        let amounts = input.commitment_amounts.unwrap_or(existing.commitment_amounts);
        let is_active = input.is_active.unwrap_or(existing.is_active);
        check_pantry(&name, &contact, &amounts)?;

        let row = sqlx::query_as::<_, PantryRow>(&format!(
            r#"
            UPDATE food_pantries
            SET name = $2, phone = $3, email = $4, address = $5, commitment_total = $6,
                commitment_vegetables = $7, commitment_fruits = $8, commitment_herbs = $9,
                commitment_flowers = $10, is_active = $11, updated_at = now()
            WHERE id = $1
            RETURNING {}
            "#,
            RETURNING_COLUMNS
        ))
        .bind(id)
        .bind(name.trim())
        .bind(&contact.phone)
        .bind(&contact.email)
        .bind(&contact.address)
        .bind(amounts.total)
        .bind(amounts.vegetables)
        .bind(amounts.fruits)
        .bind(amounts.herbs)
        .bind(amounts.flowers)
        .bind(is_active)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Delete a pantry; its harvest entries keep their data without the reference
    pub async fn delete_pantry(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM food_pantries WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Food pantry".to_string()));
        }

        tracing::info!(pantry_id = %id, "deleted food pantry");
        Ok(())
    }
}

const RETURNING_COLUMNS: &str = "id, name, phone, email, address, commitment_total, \
    commitment_vegetables, commitment_fruits, commitment_herbs, commitment_flowers, \
    is_active, created_at, updated_at";
