//! Rounding-aware division helpers.
//!
//! **Always round against the caller**:
//!
//! | Quantity | Direction |
//! |----------|-----------|
//! | Tokens paid out | [`Rounding::Down`] |
//! | Shares minted | [`Rounding::Down`] |
//! | Shares burned for an exact withdrawal | [`Rounding::Up`] |
//! | Total fee charged | [`Rounding::Up`] |
//!
//! # Examples
//!
//! ```
//! use hydra_stableswap::domain::Rounding;
//! use hydra_stableswap::math::div_round;
//!
//! assert_eq!(div_round(10, 3, Rounding::Down), Some(3));
//! assert_eq!(div_round(10, 3, Rounding::Up), Some(4));
//! assert_eq!(div_round(10, 0, Rounding::Down), None);
//! ```

use super::u256::U256;
use crate::domain::Rounding;
use crate::error::{AmmError, Result};

/// `u128` division with an explicit rounding direction.
///
/// Returns [`None`] if `denominator` is zero.
#[must_use]
pub const fn div_round(numerator: u128, denominator: u128, rounding: Rounding) -> Option<u128> {
    if denominator == 0 {
        return None;
    }
    let q = numerator / denominator;
    match rounding {
        Rounding::Down => Some(q),
        // q < u128::MAX whenever a remainder exists, so q + 1 cannot overflow.
        Rounding::Up if numerator % denominator != 0 => Some(q + 1),
        Rounding::Up => Some(q),
    }
}

/// `a · b / c` computed in 256 bits with an explicit rounding direction.
///
/// # Errors
///
/// - [`AmmError::DivisionByZero`] if `c` is zero.
/// - [`AmmError::Overflow`] if `a · b` exceeds 256 bits.
pub fn mul_div(a: U256, b: U256, c: U256, rounding: Rounding) -> Result<U256> {
    if c.is_zero() {
        return Err(AmmError::DivisionByZero);
    }
    let product = a
        .checked_mul(b)
        .ok_or(AmmError::Overflow("mul_div product overflow"))?;
    let q = product / c;
    match rounding {
        Rounding::Up if !(product % c).is_zero() => Ok(q + U256::one()),
        _ => Ok(q),
    }
}
