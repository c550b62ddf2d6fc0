//! Validation utilities for the garden harvest tracker

use rust_decimal::Decimal;

use crate::models::CommitmentAmounts;

/// Longest accepted name for categories, produce types and pantries
pub const MAX_NAME_LENGTH: usize = 200;

/// Largest quantity, weight, factor or price a `NUMERIC(12, 4)` column holds
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 4);

/// Largest commitment a `NUMERIC(12, 2)` column holds
pub const MAX_COMMITMENT: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2);

// ============================================================================
// Catalog Validations
// ============================================================================

/// Validate a display name: non-blank and bounded in length
pub fn validate_name(name: &str) -> Result<(), &'static str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Name is required");
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err("Name must be at most 200 characters");
    }
    Ok(())
}

/// Validate a unit-to-pounds conversion factor
pub fn validate_conversion_factor(factor: Decimal) -> Result<(), &'static str> {
    if factor < Decimal::ZERO {
        return Err("Conversion factor cannot be negative");
    }
    if factor > MAX_AMOUNT {
        return Err("Conversion factor is too large");
    }
    Ok(())
}

/// Validate a price per pound
pub fn validate_price(price: Decimal) -> Result<(), &'static str> {
    if price < Decimal::ZERO {
        return Err("Price per pound cannot be negative");
    }
    if price > MAX_AMOUNT {
        return Err("Price per pound is too large");
    }
    Ok(())
}

// ============================================================================
// Harvest Validations
// ============================================================================

/// Validate a harvested quantity in the produce type's native unit
pub fn validate_quantity(quantity: Decimal) -> Result<(), &'static str> {
    if quantity < Decimal::ZERO {
        return Err("Quantity cannot be negative");
    }
    if quantity > MAX_AMOUNT {
        return Err("Quantity is too large");
    }
    Ok(())
}

/// Validate an explicitly supplied weight
pub fn validate_weight(weight: Decimal) -> Result<(), &'static str> {
    if weight < Decimal::ZERO {
        return Err("Weight cannot be negative");
    }
    if weight > MAX_AMOUNT {
        return Err("Weight is too large");
    }
    Ok(())
}

// ============================================================================
// Pantry Validations
// ============================================================================

/// Validate pantry commitments: every amount must be non-negative and fit
/// the commitment columns
pub fn validate_commitments(amounts: &CommitmentAmounts) -> Result<(), &'static str> {
    let all = [
        amounts.total,
        amounts.vegetables,
        amounts.fruits,
        amounts.herbs,
        amounts.flowers,
    ];
    if all.iter().any(|a| *a < Decimal::ZERO) {
        return Err("Commitment amounts cannot be negative");
    }
    if all.iter().any(|a| *a > MAX_COMMITMENT) {
        return Err("Commitment amount is too large");
    }
    Ok(())
}

/// Whether the per-category commitments add up to the total.
///
/// Advisory only; pantries are stored even when they disagree.
pub fn commitments_balanced(amounts: &CommitmentAmounts) -> bool {
    amounts.category_sum() == amounts.total
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') && email.len() >= 5 => {
            Ok(())
        }
        _ => Err("Invalid email format"),
    }
}

/// Validate a phone number: 10 to 15 digits, punctuation ignored
pub fn validate_phone(phone: &str) -> Result<(), &'static str> {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    if !(10..=15).contains(&digits) {
        return Err("Phone number must contain 10 to 15 digits");
    }
    if phone
        .chars()
        .any(|c| !(c.is_ascii_digit() || " +-().".contains(c)))
    {
        return Err("Invalid phone number format");
    }
    Ok(())
}
