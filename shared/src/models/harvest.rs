//! Harvest models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single harvest record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HarvestEntry {
    pub id: Uuid,
    #[serde(alias = "produce_type_id")]
    pub produce_type_id: Uuid,
    #[serde(default, alias = "pantry_id")]
    pub pantry_id: Option<Uuid>,
    /// Amount in the produce type's native unit
    pub quantity: Decimal,
    /// Informational unit label as entered
    pub unit: String,
    /// Canonical weight in pounds, supplied or estimated
    #[serde(default, alias = "weight_lb", alias = "weight")]
    pub weight_lb: Option<Decimal>,
    #[serde(default, alias = "weight_estimated")]
    pub weight_estimated: bool,
    #[serde(alias = "harvest_date")]
    pub harvest_date: NaiveDate,
    #[serde(default, alias = "harvester_name")]
    pub harvester_name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(alias = "created_at")]
    pub created_at: DateTime<Utc>,
    #[serde(alias = "updated_at")]
    pub updated_at: DateTime<Utc>,
}

impl HarvestEntry {
    /// The weight the harvester measured, if any.
    ///
    /// Estimated weights are not explicit; they are re-derived from the
    /// produce type on every read.
    pub fn explicit_weight(&self) -> Option<Decimal> {
        if self.weight_estimated {
            None
        } else {
            self.weight_lb.filter(|w| *w > Decimal::ZERO)
        }
    }
}

/// Delivered produce for a pantry, derived from a harvest entry carrying a
/// pantry reference
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PantryDistribution {
    pub pantry_id: Uuid,
    pub harvest_entry_id: Uuid,
    pub quantity_distributed_lb: Decimal,
    pub distribution_date: NaiveDate,
}
