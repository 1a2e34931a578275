//! Fee fractions expressed in parts per million.

use core::fmt;

/// Denominator for every fee fraction: `1_000_000` = 100%.
pub const PRECISION: u128 = 1_000_000;

/// A fee fraction in parts per [`PRECISION`].
///
/// Any `u32` can be stored; values above [`PRECISION`] are rejected by
/// the configs that combine rates, see
/// [`FeeConfig`](super::FeeConfig).
///
/// # Examples
///
/// ```
/// use hydra_stableswap::domain::FeeRate;
///
/// let fee = FeeRate::new(50); // 0.005%
/// assert_eq!(fee.get(), 50);
/// assert!(fee.is_valid());
/// assert!(!FeeRate::new(1_000_001).is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeeRate(u32);

impl FeeRate {
    /// No fee.
    pub const ZERO: Self = Self(0);

    /// 100%.
    pub const MAX: Self = Self(PRECISION as u32);

    /// Creates a rate from raw parts per million.
    #[must_use]
    pub const fn new(ppm: u32) -> Self {
        Self(ppm)
    }

    /// Returns the raw parts-per-million value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Returns the rate widened for arithmetic.
    #[must_use]
    pub const fn as_u128(&self) -> u128 {
        self.0 as u128
    }

    /// Returns `true` if the rate is at most 100%.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.0 as u128 <= PRECISION
    }

    /// Returns `true` if the rate is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for FeeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ppm", self.0)
    }
}
