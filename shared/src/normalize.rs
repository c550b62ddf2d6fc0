//! Unit & value normalization
//!
//! Converts a harvest entry's reported quantity into canonical pounds and a
//! dollar value using its produce type. All cross-produce aggregation works on
//! the normalized figures, never on raw quantities.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{HarvestEntry, ProduceCategory, ProduceType};

/// Canonical weight and value of one harvest entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Normalized {
    pub weight_lb: Decimal,
    pub weight_estimated: bool,
    pub value_usd: Decimal,
    /// False when the produce type could not be found
    pub resolved: bool,
}

impl Normalized {
    pub const UNRESOLVED: Normalized = Normalized {
        weight_lb: Decimal::ZERO,
        weight_estimated: false,
        value_usd: Decimal::ZERO,
        resolved: false,
    };

    /// Whether the entry carries any weight worth reporting
    pub fn has_weight(&self) -> bool {
        self.resolved && self.weight_lb > Decimal::ZERO
    }
}

/// Weight to store for an entry: the explicit weight when positive,
/// otherwise `quantity * conversion_factor` flagged as estimated.
///
/// `None` when the estimate does not fit in a `Decimal`.
pub fn estimate_weight(
    explicit_weight: Option<Decimal>,
    quantity: Decimal,
    produce_type: &ProduceType,
) -> Option<(Decimal, bool)> {
    match explicit_weight.filter(|w| *w > Decimal::ZERO) {
        Some(weight) => Some((weight, false)),
        None => quantity
            .checked_mul(produce_type.conversion_factor)
            .map(|weight| (weight, true)),
    }
}

/// Normalize a harvest entry against its produce type.
///
/// Never fails: an unresolvable produce type, or figures too large to
/// represent, yield zero weight and value with `resolved == false` so callers
/// can skip the record.
pub fn normalize(entry: &HarvestEntry, produce_type: Option<&ProduceType>) -> Normalized {
    let Some(produce_type) = produce_type else {
        return Normalized::UNRESOLVED;
    };

    let Some((weight_lb, weight_estimated)) =
        estimate_weight(entry.explicit_weight(), entry.quantity, produce_type)
    else {
        return Normalized::UNRESOLVED;
    };
    let Some(value_usd) = weight_lb.checked_mul(produce_type.price_per_lb) else {
        return Normalized::UNRESOLVED;
    };

    Normalized {
        weight_lb,
        weight_estimated,
        value_usd,
        resolved: true,
    }
}

/// Lookup of produce types and categories keyed by identity
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    produce_types: HashMap<Uuid, ProduceType>,
    categories: HashMap<Uuid, ProduceCategory>,
}

impl Catalog {
    pub fn new(produce_types: Vec<ProduceType>, categories: Vec<ProduceCategory>) -> Self {
        Self {
            produce_types: produce_types.into_iter().map(|pt| (pt.id, pt)).collect(),
            categories: categories.into_iter().map(|c| (c.id, c)).collect(),
        }
    }

    pub fn from_produce_types(produce_types: Vec<ProduceType>) -> Self {
        Self::new(produce_types, Vec::new())
    }

    pub fn produce_type(&self, id: Uuid) -> Option<&ProduceType> {
        self.produce_types.get(&id)
    }

    pub fn category(&self, id: Uuid) -> Option<&ProduceCategory> {
        self.categories.get(&id)
    }

    /// Category of the produce type an entry refers to
    pub fn category_for(&self, entry: &HarvestEntry) -> Option<&ProduceCategory> {
        self.produce_type(entry.produce_type_id)
            .and_then(|pt| self.category(pt.category_id))
    }

    pub fn normalize(&self, entry: &HarvestEntry) -> Normalized {
        let produce_type = self.produce_type(entry.produce_type_id);
        let normalized = normalize(entry, produce_type);
        if !normalized.resolved {
            if produce_type.is_some() {
                tracing::warn!(
                    entry_id = %entry.id,
                    quantity = %entry.quantity,
                    "harvest entry weight or value out of range, skipping"
                );
            } else {
                tracing::warn!(
                    entry_id = %entry.id,
                    produce_type_id = %entry.produce_type_id,
                    "harvest entry references an unknown produce type, skipping"
                );
            }
        }
        normalized
    }
}
