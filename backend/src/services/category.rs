//! Produce category service

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use shared::ProduceCategory;

/// Category service for managing produce categories
#[derive(Clone)]
pub struct CategoryService {
    db: PgPool,
}

/// Database row for a category
#[derive(Debug, Clone, sqlx::FromRow)]
struct CategoryRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    display_order: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for ProduceCategory {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            display_order: row.display_order,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Input for creating a category
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryInput {
    #[validate(length(min = 1, max = 200, message = "Name must be 1 to 200 characters"))]
    pub name: String,
    pub description: Option<String>,
    #[serde(default, alias = "display_order")]
    pub display_order: i32,
}

/// Input for updating a category
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryInput {
    #[validate(length(min = 1, max = 200, message = "Name must be 1 to 200 characters"))]
    pub name: Option<String>,
    /// `null` removes the description
    #[serde(default, deserialize_with = "shared::nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, alias = "display_order")]
    pub display_order: Option<i32>,
}

const SELECT_CATEGORY: &str = r#"
    SELECT id, name, description, display_order, created_at, updated_at
    FROM produce_categories
"#;

impl CategoryService {
    /// Create a new CategoryService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// All categories ordered by display order, then name
    pub async fn find_categories(&self) -> AppResult<Vec<ProduceCategory>> {
        let rows = sqlx::query_as::<_, CategoryRow>(&format!(
            "{SELECT_CATEGORY} ORDER BY display_order, name"
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(ProduceCategory::from).collect())
    }

    pub async fn get_category(&self, id: Uuid) -> AppResult<ProduceCategory> {
        sqlx::query_as::<_, CategoryRow>(&format!("{SELECT_CATEGORY} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .map(ProduceCategory::from)
            .ok_or_else(|| AppError::NotFound("Category".to_string()))
    }

    pub async fn create_category(&self, input: CreateCategoryInput) -> AppResult<ProduceCategory> {
        input.validate()?;
        shared::validate_name(&input.name).map_err(|msg| AppError::invalid("name", msg))?;

        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            INSERT INTO produce_categories (name, description, display_order)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, display_order, created_at, updated_at
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.display_order)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(category_id = %row.id, name = %row.name, "created produce category");
        Ok(row.into())
    }

    pub async fn update_category(
        &self,
        id: Uuid,
        input: UpdateCategoryInput,
    ) -> AppResult<ProduceCategory> {
        input.validate()?;
        let existing = self.get_category(id).await?;

        let name = input.name.unwrap_or(existing.name);
        shared::validate_name(&name).map_err(|msg| AppError::invalid("name", msg))?;
        let description = shared::apply_nullable(input.description, existing.description);
        let display_order = input.display_order.unwrap_or(existing.display_order);

        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            UPDATE produce_categories
            SET name = $2, description = $3, display_order = $4, updated_at = now()
            WHERE id = $1
            RETURNING id, name, description, display_order, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name.trim())
        .bind(&description)
        .bind(display_order)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Delete a category; refused while produce types still reference it
    pub async fn delete_category(&self, id: Uuid) -> AppResult<()> {
        let references = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM produce_types WHERE category_id = $1",
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        if references > 0 {
            return Err(AppError::Conflict {
                resource: "produce_category".to_string(),
                message: format!(
                    "Category is used by {} produce type(s) and cannot be deleted",
                    references
                ),
            });
        }

        let result = sqlx::query("DELETE FROM produce_categories WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Category".to_string()));
        }

        tracing::info!(category_id = %id, "deleted produce category");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_can_clear_description() {
        let cleared: UpdateCategoryInput =
            serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(cleared.description, Some(None));
        assert_eq!(
            shared::apply_nullable(cleared.description, Some("Leafy".to_string())),
            None
        );

        let untouched: UpdateCategoryInput = serde_json::from_str(r#"{"name": "Roots"}"#).unwrap();
        assert_eq!(untouched.description, None);
    }
}
