//! Harvest entry service for recording and listing harvests

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;
use validator::Validate;

use super::produce::ProduceService;
use crate::error::{AppError, AppResult};
use shared::{
    apply_nullable, estimate_weight, Catalog, HarvestEntry, PaginatedResponse, Pagination,
    PaginationMeta, ProduceType, SortOrder,
};

/// Harvest service for managing harvest entries
#[derive(Clone)]
pub struct HarvestService {
    db: PgPool,
}

/// Database row for a harvest entry
#[derive(Debug, Clone, sqlx::FromRow)]
struct HarvestRow {
    id: Uuid,
    produce_type_id: Uuid,
    pantry_id: Option<Uuid>,
    quantity: Decimal,
    unit: String,
    weight_lb: Option<Decimal>,
    weight_estimated: bool,
    harvest_date: NaiveDate,
    harvester_name: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<HarvestRow> for HarvestEntry {
    fn from(row: HarvestRow) -> Self {
        Self {
            id: row.id,
            produce_type_id: row.produce_type_id,
            pantry_id: row.pantry_id,
            quantity: row.quantity,
            unit: row.unit,
            weight_lb: row.weight_lb,
            weight_estimated: row.weight_estimated,
            harvest_date: row.harvest_date,
            harvester_name: row.harvester_name,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Harvest entry with its normalized figures and display names
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HarvestEntryView {
    #[serde(flatten)]
    pub entry: HarvestEntry,
    pub produce_type_name: Option<String>,
    pub category_name: Option<String>,
    pub value_usd: Decimal,
}

impl HarvestEntryView {
    /// Estimated weights follow the produce type's current conversion factor
    pub fn build(mut entry: HarvestEntry, catalog: &Catalog) -> Self {
        let normalized = catalog.normalize(&entry);
        if normalized.resolved {
            entry.weight_lb = Some(normalized.weight_lb);
            entry.weight_estimated = normalized.weight_estimated;
        }
        Self {
            produce_type_name: catalog
                .produce_type(entry.produce_type_id)
                .map(|pt| pt.name.clone()),
            category_name: catalog.category_for(&entry).map(|c| c.name.clone()),
            value_usd: normalized.value_usd,
            entry,
        }
    }
}

/// Column a harvest listing can be sorted by
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HarvestSortField {
    #[default]
    #[serde(alias = "harvestDate")]
    HarvestDate,
    Quantity,
    #[serde(alias = "createdAt")]
    CreatedAt,
}

impl HarvestSortField {
    fn column(&self) -> &'static str {
        match self {
            HarvestSortField::HarvestDate => "harvest_date",
            HarvestSortField::Quantity => "quantity",
            HarvestSortField::CreatedAt => "created_at",
        }
    }
}

/// Query parameters for listing harvests
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HarvestListQuery {
    #[serde(default, alias = "startDate")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, alias = "endDate")]
    pub end_date: Option<NaiveDate>,
    /// Case-insensitive match against notes and harvester name
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default, alias = "pantryId")]
    pub pantry_id: Option<Uuid>,
    #[serde(default, alias = "produceTypeId")]
    pub produce_type_id: Option<Uuid>,
    #[serde(default, alias = "sortBy")]
    pub sort_by: HarvestSortField,
    #[serde(default, alias = "sortOrder")]
    pub sort_order: SortOrder,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default, alias = "perPage", alias = "limit")]
    pub per_page: Option<u32>,
}

impl HarvestListQuery {
    pub fn pagination(&self) -> Pagination {
        let defaults = Pagination::default();
        Pagination {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
        .normalized()
    }
}

/// Input for recording a harvest
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateHarvestInput {
    #[serde(alias = "produce_type_id")]
    pub produce_type_id: Uuid,
    #[serde(default, alias = "pantry_id")]
    pub pantry_id: Option<Uuid>,
    pub quantity: Decimal,
    /// Defaults to the produce type's unit
    #[validate(length(max = 32, message = "Unit must be at most 32 characters"))]
    pub unit: Option<String>,
    #[serde(default, alias = "weight_lb", alias = "weightLb")]
    pub weight: Option<Decimal>,
    #[serde(alias = "harvest_date")]
    pub harvest_date: NaiveDate,
    #[serde(default, alias = "harvester_name")]
    #[validate(length(max = 200, message = "Harvester name must be at most 200 characters"))]
    pub harvester_name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Input for updating a harvest
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHarvestInput {
    #[serde(default, alias = "produce_type_id")]
    pub produce_type_id: Option<Uuid>,
    /// `null` removes the pantry assignment
    #[serde(default, alias = "pantry_id", deserialize_with = "shared::nullable")]
    pub pantry_id: Option<Option<Uuid>>,
    #[serde(default)]
    pub quantity: Option<Decimal>,
    #[validate(length(max = 32, message = "Unit must be at most 32 characters"))]
    pub unit: Option<String>,
    /// A positive weight becomes the measured weight; zero clears it
    #[serde(default, alias = "weight_lb", alias = "weightLb")]
    pub weight: Option<Decimal>,
    #[serde(default, alias = "harvest_date")]
    pub harvest_date: Option<NaiveDate>,
    #[serde(default, alias = "harvester_name", deserialize_with = "shared::nullable")]
    #[validate(length(max = 200, message = "Harvester name must be at most 200 characters"))]
    pub harvester_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "shared::nullable")]
    pub notes: Option<Option<String>>,
}

impl UpdateHarvestInput {
    /// Whether the stored weight has to be re-evaluated
    pub fn touches_weight(&self) -> bool {
        self.weight.is_some() || self.quantity.is_some() || self.produce_type_id.is_some()
    }
}

/// Measured weight after an update: a new positive weight wins, an explicit
/// zero clears it, otherwise the previously measured weight is kept
pub fn updated_explicit_weight(
    existing: &HarvestEntry,
    new_weight: Option<Decimal>,
) -> Option<Decimal> {
    match new_weight {
        Some(w) if w > Decimal::ZERO => Some(w),
        Some(_) => None,
        None => existing.explicit_weight(),
    }
}

const SELECT_HARVEST: &str = r#"
    SELECT id, produce_type_id, pantry_id, quantity, unit, weight_lb, weight_estimated,
           harvest_date, harvester_name, notes, created_at, updated_at
    FROM harvest_entries
"#;

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &HarvestListQuery) {
    builder.push(" WHERE TRUE");
    if let Some(start) = query.start_date {
        builder.push(" AND harvest_date >= ").push_bind(start);
    }
    if let Some(end) = query.end_date {
        builder.push(" AND harvest_date <= ").push_bind(end);
    }
    if let Some(pantry_id) = query.pantry_id {
        builder.push(" AND pantry_id = ").push_bind(pantry_id);
    }
    if let Some(produce_type_id) = query.produce_type_id {
        builder.push(" AND produce_type_id = ").push_bind(produce_type_id);
    }
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", escape_like(search));
        builder
            .push(" AND (notes ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR harvester_name ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

/// Escape ILIKE metacharacters so the search text matches literally
fn escape_like(search: &str) -> String {
    search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn check_amounts(quantity: Decimal, weight: Option<Decimal>) -> AppResult<()> {
    shared::validate_quantity(quantity).map_err(|msg| AppError::invalid("quantity", msg))?;
    if let Some(weight) = weight {
        shared::validate_weight(weight).map_err(|msg| AppError::invalid("weight", msg))?;
    }
    Ok(())
}

/// Stored weight for an entry, refused when it would not fit the column
fn stored_weight(
    explicit_weight: Option<Decimal>,
    quantity: Decimal,
    produce_type: &ProduceType,
) -> AppResult<(Decimal, bool)> {
    estimate_weight(explicit_weight, quantity, produce_type)
        .filter(|(weight, _)| shared::validate_weight(*weight).is_ok())
        .ok_or_else(|| AppError::invalid("quantity", "Estimated weight is too large"))
}

impl HarvestService {
    /// Create a new HarvestService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Produce types and categories for normalizing entries
    pub async fn catalog(&self) -> AppResult<Catalog> {
        let produce = ProduceService::new(self.db.clone());
        let categories = super::CategoryService::new(self.db.clone());
        let produce_types = produce
            .find_produce_types()
            .await?
            .into_iter()
            .map(|pt| pt.produce_type)
            .collect();
        Ok(Catalog::new(produce_types, categories.find_categories().await?))
    }

    /// Filtered, sorted and paginated harvest listing
    pub async fn find_harvest_entries(
        &self,
        query: &HarvestListQuery,
    ) -> AppResult<PaginatedResponse<HarvestEntryView>> {
        let pagination = query.pagination();

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM harvest_entries");
        push_filters(&mut count, query);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.db).await?;

        let mut select = QueryBuilder::<Postgres>::new(SELECT_HARVEST);
        push_filters(&mut select, query);
        select
            .push(" ORDER BY ")
            .push(query.sort_by.column())
            .push(" ")
            .push(query.sort_order.as_sql())
            .push(", created_at DESC LIMIT ")
            .push_bind(i64::from(pagination.per_page))
            .push(" OFFSET ")
            .push_bind(i64::try_from(pagination.offset()).unwrap_or(i64::MAX));

        let rows = select.build_query_as::<HarvestRow>().fetch_all(&self.db).await?;
        let catalog = self.catalog().await?;

        Ok(PaginatedResponse {
            data: rows
                .into_iter()
                .map(|row| HarvestEntryView::build(row.into(), &catalog))
                .collect(),
            pagination: PaginationMeta::new(&pagination, u64::try_from(total).unwrap_or(0)),
        })
    }

    /// Entries harvested within `[start, end)`, newest first, up to `limit`
    pub async fn find_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        limit: Option<i64>,
    ) -> AppResult<Vec<HarvestEntry>> {
        let mut select = QueryBuilder::<Postgres>::new(SELECT_HARVEST);
        select
            .push(" WHERE harvest_date >= ")
            .push_bind(start)
            .push(" AND harvest_date < ")
            .push_bind(end)
            .push(" ORDER BY harvest_date DESC, created_at DESC");
        if let Some(limit) = limit {
            select.push(" LIMIT ").push_bind(limit);
        }

        let rows = select.build_query_as::<HarvestRow>().fetch_all(&self.db).await?;
        Ok(rows.into_iter().map(HarvestEntry::from).collect())
    }

    /// Most recent entries regardless of date, newest first
    pub async fn find_recent(&self, limit: i64) -> AppResult<Vec<HarvestEntry>> {
        let rows = sqlx::query_as::<_, HarvestRow>(&format!(
            "{SELECT_HARVEST} ORDER BY harvest_date DESC, created_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(HarvestEntry::from).collect())
    }

    async fn fetch_entry(&self, id: Uuid) -> AppResult<HarvestEntry> {
        sqlx::query_as::<_, HarvestRow>(&format!("{SELECT_HARVEST} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .map(HarvestEntry::from)
            .ok_or_else(|| AppError::NotFound("Harvest entry".to_string()))
    }

    pub async fn get_harvest(&self, id: Uuid) -> AppResult<HarvestEntryView> {
        let entry = self.fetch_entry(id).await?;
        Ok(HarvestEntryView::build(entry, &self.catalog().await?))
    }

    async fn ensure_pantry(&self, pantry_id: Option<Uuid>) -> AppResult<()> {
        let Some(pantry_id) = pantry_id else {
            return Ok(());
        };
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM food_pantries WHERE id = $1)",
        )
        .bind(pantry_id)
        .fetch_one(&self.db)
        .await?;

        if exists {
            Ok(())
        } else {
            Err(AppError::NotFound("Food pantry".to_string()))
        }
    }

    /// Record a harvest, storing either the measured or the estimated weight
    pub async fn create_harvest(&self, input: CreateHarvestInput) -> AppResult<HarvestEntryView> {
        input.validate()?;
        check_amounts(input.quantity, input.weight)?;

        let produce_type = ProduceService::new(self.db.clone())
            .get_produce_type(input.produce_type_id)
            .await?
            .produce_type;
        self.ensure_pantry(input.pantry_id).await?;

        let (weight_lb, weight_estimated) =
            stored_weight(input.weight, input.quantity, &produce_type)?;
        let unit = input
            .unit
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| produce_type.unit_type.to_string());

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO harvest_entries (produce_type_id, pantry_id, quantity, unit, weight_lb,
                                         weight_estimated, harvest_date, harvester_name, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(input.produce_type_id)
        .bind(input.pantry_id)
        .bind(input.quantity)
        .bind(&unit)
        .bind(weight_lb)
        .bind(weight_estimated)
        .bind(input.harvest_date)
        .bind(&input.harvester_name)
        .bind(&input.notes)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(
            harvest_id = %id,
            produce_type = %produce_type.name,
            %weight_lb,
            weight_estimated,
            "recorded harvest entry"
        );
        self.get_harvest(id).await
    }

    /// Update a harvest; the weight is re-evaluated when weight, quantity or
    /// produce type change
    pub async fn update_harvest(
        &self,
        id: Uuid,
        input: UpdateHarvestInput,
    ) -> AppResult<HarvestEntryView> {
        input.validate()?;
        let existing = self.fetch_entry(id).await?;

        let produce_type_id = input.produce_type_id.unwrap_or(existing.produce_type_id);
        let quantity = input.quantity.unwrap_or(existing.quantity);
        check_amounts(quantity, input.weight)?;

        let (weight_lb, weight_estimated) = if input.touches_weight() {
            let produce_type = ProduceService::new(self.db.clone())
                .get_produce_type(produce_type_id)
                .await?
                .produce_type;
            let (w, estimated) = stored_weight(
                updated_explicit_weight(&existing, input.weight),
                quantity,
                &produce_type,
            )?;
            (Some(w), estimated)
        } else {
            (existing.weight_lb, existing.weight_estimated)
        };

        if let Some(Some(pantry_id)) = input.pantry_id {
            self.ensure_pantry(Some(pantry_id)).await?;
        }
        let pantry_id = apply_nullable(input.pantry_id, existing.pantry_id);

        sqlx::query(
            r#"
            UPDATE harvest_entries
            SET produce_type_id = $2, pantry_id = $3, quantity = $4, unit = $5, weight_lb = $6,
                weight_estimated = $7, harvest_date = $8, harvester_name = $9, notes = $10,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(produce_type_id)
        .bind(pantry_id)
        .bind(quantity)
        .bind(input.unit.unwrap_or(existing.unit))
        .bind(weight_lb)
        .bind(weight_estimated)
        .bind(input.harvest_date.unwrap_or(existing.harvest_date))
        .bind(apply_nullable(input.harvester_name, existing.harvester_name))
        .bind(apply_nullable(input.notes, existing.notes))
        .execute(&self.db)
        .await?;

        self.get_harvest(id).await
    }

    pub async fn delete_harvest(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM harvest_entries WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Harvest entry".to_string()));
        }

        tracing::info!(harvest_id = %id, "deleted harvest entry");
        Ok(())
    }

    /// Every harvest entry, oldest first
    pub async fn find_all(&self) -> AppResult<Vec<HarvestEntry>> {
        let rows = sqlx::query_as::<_, HarvestRow>(&format!(
            "{SELECT_HARVEST} ORDER BY harvest_date, created_at"
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(HarvestEntry::from).collect())
    }
}
