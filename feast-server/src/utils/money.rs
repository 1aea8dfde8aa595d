//! Money calculation utilities using rust_decimal for precision
//!
//! All calculations are done using `Decimal` internally, then converted to
//! `f64` (rounded to cents) for storage and the wire.

use rust_decimal::prelude::*;
use shared::models::OrderLine;

/// Rounding: 2 decimal places, half away from zero
const DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Σ unit_price × quantity
pub fn order_total(lines: &[OrderLine]) -> f64 {
    let total: Decimal = lines
        .iter()
        .map(|line| to_decimal(line.unit_price) * Decimal::from(line.quantity))
        .sum();
    to_f64(total)
}

/// `balance + amount`, both in money units
pub fn add(balance: f64, amount: f64) -> f64 {
    to_f64(to_decimal(balance) + to_decimal(amount))
}
