//! Conversion between raw token units and the common normalised unit.

use super::rounding::mul_div;
use super::u256::{narrow, widen, U256};
use crate::domain::{Rounding, RATE_PRECISION};
use crate::error::Result;

/// `amount · rate / 1e18`, rounded down.
///
/// # Errors
///
/// Propagates overflow from the 256-bit product.
pub fn normalize(amount: u128, rate: u128) -> Result<U256> {
    mul_div(widen(amount), widen(rate), widen(RATE_PRECISION), Rounding::Down)
}

/// `xp · 1e18 / rate`, the inverse of [`normalize`], rounded down.
///
/// # Errors
///
/// - [`AmmError::DivisionByZero`](crate::error::AmmError::DivisionByZero)
///   if `rate` is zero.
/// - [`AmmError::Overflow`](crate::error::AmmError::Overflow) if the raw
///   amount does not fit in `u128`.
pub fn denormalize(xp: U256, rate: u128) -> Result<u128> {
    let raw = mul_div(xp, widen(RATE_PRECISION), widen(rate), Rounding::Down)?;
    narrow(raw, "denormalized amount exceeds u128")
}
