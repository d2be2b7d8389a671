//! Input coercion and validation for the ledger
//!
//! Multipart form fields arrive as raw strings, so most helpers here both parse
//! and validate. Every failure names the offending field.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::{LedgerError, LedgerResult};

// ============================================================================
// Text
// ============================================================================

/// Trim a required text field, rejecting missing or blank values
pub fn require_text(field: &str, raw: Option<&str>) -> LedgerResult<String> {
    match raw.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(LedgerError::validation(field, format!("{} is required", field))),
    }
}

/// Trim an optional text field; blank collapses to `None`
pub fn optional_text(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

// ============================================================================
// Numbers
// ============================================================================

/// Parse a decimal from user input. Rejects anything that is not a plain
/// finite number ("NaN", "inf", "", "12abc").
pub fn parse_decimal(field: &str, raw: &str) -> LedgerResult<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::validation(field, format!("{} is required", field)));
    }
    Decimal::from_str(trimmed)
        .map_err(|_| LedgerError::validation(field, format!("{} must be a number", field)))
}

/// Decimal places stored for money columns
pub const MONEY_SCALE: u32 = 2;

/// Money values must stay below 10^12 (`NUMERIC(14, 2)`)
pub const MONEY_INTEGER_DIGITS: u32 = 12;

/// Decimal places stored for carat weights
pub const WEIGHT_SCALE: u32 = 3;

/// Weights must stay below 10^7 (`NUMERIC(10, 3)`)
pub const WEIGHT_INTEGER_DIGITS: u32 = 7;

/// Reject values the column would round or overflow. Trailing zeros do not
/// count towards the scale, so "10.500" is a valid amount.
fn validate_precision(field: &str, value: Decimal, scale: u32, integer_digits: u32) -> LedgerResult<()> {
    if value.normalize().scale() > scale {
        return Err(LedgerError::validation(
            field,
            format!("{} cannot have more than {} decimal places", field, scale),
        ));
    }
    if value.abs() >= Decimal::from(10u64.pow(integer_digits)) {
        return Err(LedgerError::validation(
            field,
            format!("{} must be less than {}", field, 10u64.pow(integer_digits)),
        ));
    }
    Ok(())
}

/// Money as stored: at most two decimal places and below 10^12
pub fn validate_money(field: &str, value: Decimal) -> LedgerResult<()> {
    validate_precision(field, value, MONEY_SCALE, MONEY_INTEGER_DIGITS)
}

/// Amounts on purchases, expenses and sales must be strictly positive
pub fn validate_positive_amount(field: &str, value: Decimal) -> LedgerResult<()> {
    if value <= Decimal::ZERO {
        return Err(LedgerError::validation(
            field,
            format!("{} must be greater than zero", field),
        ));
    }
    validate_money(field, value)
}

pub fn validate_non_negative(field: &str, value: Decimal) -> LedgerResult<()> {
    if value < Decimal::ZERO {
        return Err(LedgerError::validation(
            field,
            format!("{} cannot be negative", field),
        ));
    }
    validate_money(field, value)
}

/// Carat weight must be a positive number with at most three decimal places
pub fn validate_weight(value: Decimal) -> LedgerResult<()> {
    if value <= Decimal::ZERO {
        return Err(LedgerError::validation("weight", "weight must be a positive number"));
    }
    validate_precision("weight", value, WEIGHT_SCALE, WEIGHT_INTEGER_DIGITS)
}

pub fn parse_quantity(field: &str, raw: &str) -> LedgerResult<i32> {
    let quantity = raw
        .trim()
        .parse::<i32>()
        .map_err(|_| LedgerError::validation(field, format!("{} must be a whole number", field)))?;
    validate_quantity(field, quantity)?;
    Ok(quantity)
}

pub fn validate_quantity(field: &str, quantity: i32) -> LedgerResult<()> {
    if quantity < 1 {
        return Err(LedgerError::validation(
            field,
            format!("{} must be at least 1", field),
        ));
    }
    Ok(())
}

// ============================================================================
// Dates and identifiers
// ============================================================================

/// Parse an ISO date (YYYY-MM-DD)
pub fn parse_date(field: &str, raw: &str) -> LedgerResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        LedgerError::validation(field, format!("{} must be a date in YYYY-MM-DD format", field))
    })
}

pub fn parse_uuid(field: &str, raw: &str) -> LedgerResult<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| LedgerError::validation(field, format!("{} must be a valid id", field)))
}
