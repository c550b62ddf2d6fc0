//! Food pantry models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Contact details for a pantry; every field is optional
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ContactInfo {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// Pledged annual amounts, in total and per category
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CommitmentAmounts {
    #[serde(default)]
    pub total: Decimal,
    #[serde(default)]
    pub vegetables: Decimal,
    #[serde(default)]
    pub fruits: Decimal,
    #[serde(default)]
    pub herbs: Decimal,
    #[serde(default)]
    pub flowers: Decimal,
}

impl CommitmentAmounts {
    pub fn has_commitment(&self) -> bool {
        self.total > Decimal::ZERO
    }

    /// Sum of the four category sub-commitments
    pub fn category_sum(&self) -> Decimal {
        self.vegetables
            .saturating_add(self.fruits)
            .saturating_add(self.herbs)
            .saturating_add(self.flowers)
    }
}

/// A food pantry receiving harvest deliveries
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FoodPantry {
    pub id: Uuid,
    pub name: String,
    #[serde(default, alias = "contact_info")]
    pub contact_info: ContactInfo,
    #[serde(default, alias = "commitment_amounts")]
    pub commitment_amounts: CommitmentAmounts,
    #[serde(default = "default_active", alias = "is_active")]
    pub is_active: bool,
    #[serde(alias = "created_at")]
    pub created_at: DateTime<Utc>,
    #[serde(alias = "updated_at")]
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_commitment_defaults_to_zero() {
        let amounts: CommitmentAmounts = serde_json::from_str(r#"{"total": 1800}"#).unwrap();
        assert_eq!(amounts.total, dec!(1800));
        assert_eq!(amounts.herbs, Decimal::ZERO);
        assert!(amounts.has_commitment());
        assert!(!CommitmentAmounts::default().has_commitment());
    }

    #[test]
    fn test_category_sum() {
        let amounts = CommitmentAmounts {
            total: dec!(1800),
            vegetables: dec!(700),
            fruits: dec!(600),
            herbs: dec!(200),
            flowers: dec!(300),
        };
        assert_eq!(amounts.category_sum(), amounts.total);
    }

    #[test]
    fn test_pantry_accepts_both_casings() {
        let camel = r#"{
            "id": "6f9619ff-8b86-d011-b42d-00cf4fc964ff",
            "name": "GRIN",
            "commitmentAmounts": {"total": 10},
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        }"#;
        let snake = r#"{
            "id": "6f9619ff-8b86-d011-b42d-00cf4fc964ff",
            "name": "GRIN",
            "commitment_amounts": {"total": 10},
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        }"#;
        let a: FoodPantry = serde_json::from_str(camel).unwrap();
        let b: FoodPantry = serde_json::from_str(snake).unwrap();
        assert_eq!(a, b);
        assert!(a.is_active);
    }
}
