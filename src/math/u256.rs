//! 256-bit scratch integer for invariant and fee intermediates.
//!
//! Pool state is stored as `u128`; products such as `D · D_P` or
//! `reserves · rate` are formed in [`U256`] and narrowed back with
//! [`narrow`].

#![allow(clippy::assign_op_pattern, clippy::ptr_offset_with_cast, clippy::manual_range_contains)]

use uint::construct_uint;

use crate::error::AmmError;

construct_uint! {
    /// 256-bit unsigned integer.
    pub struct U256(4);
}

/// Widens a `u128` into a [`U256`].
#[must_use]
pub fn widen(value: u128) -> U256 {
    U256::from(value)
}

/// Narrows a [`U256`] back into `u128`.
///
/// # Errors
///
/// Returns [`AmmError::Overflow`] tagged with `context` if the value has
/// more than 128 significant bits.
pub fn narrow(value: U256, context: &'static str) -> crate::error::Result<u128> {
    if value.bits() > 128 {
        return Err(AmmError::Overflow(context));
    }
    Ok(value.low_u128())
}

/// `|a - b|` without underflow.
#[must_use]
pub fn abs_diff(a: U256, b: U256) -> U256 {
    if a >= b {
        a - b
    } else {
        b - a
    }
}
