//! Produce type models

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Native unit a produce type is harvested in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum UnitType {
    /// Weight unit; conversion factor is normally 1.0
    Pounds,
    /// Volume unit
    Pints,
    /// Bunch unit
    Bunches,
}

impl UnitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitType::Pounds => "pounds",
            UnitType::Pints => "pints",
            UnitType::Bunches => "bunches",
        }
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown unit type '{0}', expected one of pounds, pints, bunches")]
pub struct UnknownUnitType(pub String);

impl FromStr for UnitType {
    type Err = UnknownUnitType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pounds" | "lb" | "lbs" => Ok(UnitType::Pounds),
            "pints" | "pint" => Ok(UnitType::Pints),
            "bunches" | "bunch" => Ok(UnitType::Bunches),
            other => Err(UnknownUnitType(other.to_string())),
        }
    }
}

/// A kind of produce with its conversion and pricing data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProduceType {
    pub id: Uuid,
    #[serde(alias = "category_id")]
    pub category_id: Uuid,
    pub name: String,
    #[serde(alias = "unit_type")]
    pub unit_type: UnitType,
    /// Multiplier from the native unit to pounds
    #[serde(alias = "conversion_factor")]
    pub conversion_factor: Decimal,
    #[serde(default, alias = "price_per_lb")]
    pub price_per_lb: Decimal,
    #[serde(default, alias = "serving_weight_oz")]
    pub serving_weight_oz: Decimal,
    #[serde(default, alias = "servings_per_lb")]
    pub servings_per_lb: Decimal,
    #[serde(alias = "created_at")]
    pub created_at: DateTime<Utc>,
    #[serde(alias = "updated_at")]
    pub updated_at: DateTime<Utc>,
}

impl ProduceType {
    /// Servings contained in the given weight, when serving data exists
    pub fn servings_for(&self, weight_lb: Decimal) -> Option<Decimal> {
        if self.servings_per_lb > Decimal::ZERO {
            weight_lb.checked_mul(self.servings_per_lb)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_unit_type_parse() {
        assert_eq!("pounds".parse::<UnitType>(), Ok(UnitType::Pounds));
        assert_eq!("Bunch".parse::<UnitType>(), Ok(UnitType::Bunches));
        assert_eq!(" pints ".parse::<UnitType>(), Ok(UnitType::Pints));
        assert!("gallons".parse::<UnitType>().is_err());
    }

    #[test]
    fn test_unit_type_roundtrips_through_display() {
        for unit in [UnitType::Pounds, UnitType::Pints, UnitType::Bunches] {
            assert_eq!(unit.to_string().parse::<UnitType>(), Ok(unit));
        }
    }

    #[test]
    fn test_servings_for() {
        let kale = ProduceType {
            id: Uuid::new_v4(),
            category_id: Uuid::new_v4(),
            name: "Kale".to_string(),
            unit_type: UnitType::Bunches,
            conversion_factor: dec!(0.19),
            price_per_lb: dec!(3.4338),
            serving_weight_oz: dec!(3),
            servings_per_lb: dec!(5.33),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(kale.servings_for(dec!(2)), Some(dec!(10.66)));

        let flowers = ProduceType {
            servings_per_lb: Decimal::ZERO,
            ..kale
        };
        assert_eq!(flowers.servings_for(dec!(2)), None);
    }
}
