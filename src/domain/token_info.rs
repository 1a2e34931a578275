//! Per-token pricing metadata and raw reserve.

use crate::error::{AmmError, Result};

/// `1e18`, the fixed-point unit of [`TokenInfo::rate`].
pub const RATE_PRECISION: u128 = 1_000_000_000_000_000_000;

/// Rate, precision multiplier and raw reserve of one pool token.
///
/// Reserves are normalised to a common unit as
/// `reserves * rate / RATE_PRECISION`.  The canonical rate for a token
/// whose reserves are kept in native decimals is
/// `RATE_PRECISION * precision_multiplier`; pegged-but-not-1:1 assets
/// carry any other positive rate.
///
/// # Examples
///
/// ```
/// use hydra_stableswap::domain::{TokenInfo, RATE_PRECISION};
///
/// let info = TokenInfo::canonical(1_000_000, 42).expect("fits");
/// assert_eq!(info.rate(), RATE_PRECISION * 1_000_000);
/// assert_eq!(info.reserves(), 42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TokenInfo {
    rate: u128,
    precision_multiplier: u128,
    reserves: u128,
}

impl TokenInfo {
    /// Creates token metadata with an explicit rate.
    #[must_use]
    pub const fn new(rate: u128, precision_multiplier: u128, reserves: u128) -> Self {
        Self {
            rate,
            precision_multiplier,
            reserves,
        }
    }

    /// Creates token metadata with the canonical rate
    /// `RATE_PRECISION * precision_multiplier`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the rate does not fit in `u128`.
    pub const fn canonical(precision_multiplier: u128, reserves: u128) -> Result<Self> {
        match RATE_PRECISION.checked_mul(precision_multiplier) {
            Some(rate) => Ok(Self::new(rate, precision_multiplier, reserves)),
            None => Err(AmmError::Overflow("canonical rate overflow")),
        }
    }

    /// Exchange rate to the common unit, scaled by [`RATE_PRECISION`].
    #[must_use]
    pub const fn rate(&self) -> u128 {
        self.rate
    }

    /// Integer decimal-alignment factor.
    #[must_use]
    pub const fn precision_multiplier(&self) -> u128 {
        self.precision_multiplier
    }

    /// Raw reserve in the token's own units.
    #[must_use]
    pub const fn reserves(&self) -> u128 {
        self.reserves
    }

    pub(crate) fn set_reserves(&mut self, reserves: u128) {
        self.reserves = reserves;
    }
}
