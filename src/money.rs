//! Conversions between the decimal amounts the API speaks and the integer
//! minor units (cents) the database stores.

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

use crate::error::{AppError, AppResult};

pub const SCALE: u32 = 2;

/// Highest catalog price, 1,000,000.00. Together with
/// [`crate::cart::Cart::MAX_LINE_QUANTITY`] this keeps every cart and order
/// total far inside both `Decimal` and `i64` cents.
pub const MAX_PRICE: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, SCALE);

pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, SCALE)
}

/// Normalizes an amount to two decimal places and returns it in cents.
pub fn to_cents(amount: Decimal) -> AppResult<i64> {
    let rounded = amount.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointAwayFromZero);
    (rounded * Decimal::ONE_HUNDRED)
        .to_i64()
        .ok_or_else(|| AppError::BadRequest(format!("amount {amount} is out of range")))
}

/// Validates a catalog price: between 0.01 and [`MAX_PRICE`] with at most
/// two decimal places.
pub fn validate_price(price: Decimal) -> AppResult<Decimal> {
    if price < Decimal::new(1, SCALE) {
        return Err(AppError::BadRequest("price must be at least 0.01".into()));
    }
    if price > MAX_PRICE {
        return Err(AppError::BadRequest(format!(
            "price must be at most {MAX_PRICE}"
        )));
    }
    if price.normalize().scale() > SCALE {
        return Err(AppError::BadRequest(
            "price must have at most two decimal places".into(),
        ));
    }
    Ok(price.round_dp(SCALE))
}
