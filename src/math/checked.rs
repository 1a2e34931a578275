//! Checked arithmetic for ledger quantities.
//!
//! [`CheckedArithmetic`] turns the `Option`-returning primitives into
//! [`Result`]s carrying the crate's error variants, so balance and
//! reserve bookkeeping can use `?` throughout.
//!
//! # Examples
//!
//! ```
//! use hydra_stableswap::domain::Rounding;
//! use hydra_stableswap::math::CheckedArithmetic;
//!
//! assert_eq!(100u128.safe_add(&200), Ok(300));
//! assert!(1u128.safe_sub(&2).is_err());
//! assert_eq!(7u128.safe_div(&2, Rounding::Up), Ok(4));
//! ```

use super::div_round;
use super::u256::U256;
use crate::domain::Rounding;
use crate::error::{AmmError, Result};

/// Fallible arithmetic returning [`AmmError`] instead of `None`.
///
/// No method panics or saturates.
pub trait CheckedArithmetic: Sized {
    /// Checked addition.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the result is not representable.
    fn safe_add(&self, other: &Self) -> Result<Self>;

    /// Checked subtraction.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Underflow`] if the result would be negative.
    fn safe_sub(&self, other: &Self) -> Result<Self>;

    /// Checked multiplication.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the result is not representable.
    fn safe_mul(&self, other: &Self) -> Result<Self>;

    /// Checked division with explicit [`Rounding`].
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::DivisionByZero`] if `other` is zero.
    fn safe_div(&self, other: &Self, rounding: Rounding) -> Result<Self>;
}

impl CheckedArithmetic for u128 {
    fn safe_add(&self, other: &Self) -> Result<Self> {
        self.checked_add(*other)
            .ok_or(AmmError::Overflow("u128 addition overflow"))
    }

    fn safe_sub(&self, other: &Self) -> Result<Self> {
        self.checked_sub(*other)
            .ok_or(AmmError::Underflow("u128 subtraction underflow"))
    }

    fn safe_mul(&self, other: &Self) -> Result<Self> {
        self.checked_mul(*other)
            .ok_or(AmmError::Overflow("u128 multiplication overflow"))
    }

    fn safe_div(&self, other: &Self, rounding: Rounding) -> Result<Self> {
        div_round(*self, *other, rounding).ok_or(AmmError::DivisionByZero)
    }
}

impl CheckedArithmetic for U256 {
    fn safe_add(&self, other: &Self) -> Result<Self> {
        self.checked_add(*other)
            .ok_or(AmmError::Overflow("U256 addition overflow"))
    }

    fn safe_sub(&self, other: &Self) -> Result<Self> {
        self.checked_sub(*other)
            .ok_or(AmmError::Underflow("U256 subtraction underflow"))
    }

    fn safe_mul(&self, other: &Self) -> Result<Self> {
        self.checked_mul(*other)
            .ok_or(AmmError::Overflow("U256 multiplication overflow"))
    }

    fn safe_div(&self, other: &Self, rounding: Rounding) -> Result<Self> {
        super::mul_div(*self, U256::one(), *other, rounding)
    }
}
