//! Per-pool fee schedule.

use core::fmt;

use super::fee_rate::{FeeRate, PRECISION};
use crate::error::{AmmError, Result};

/// The three pool-level fee fractions charged on every fee base.
///
/// | Component | Destination |
/// |-----------|-------------|
/// | `lp` | stays in reserves (compounds to all shares) |
/// | `stakers` | staking accumulator, pro-rata over staked shares |
/// | `referral` | referral escrow of the caller-supplied referrer |
///
/// The developer fraction is global and lives in
/// [`DexConfig`](crate::config::DexConfig).
///
/// # Examples
///
/// ```
/// use hydra_stableswap::domain::{FeeConfig, FeeRate};
///
/// let fees = FeeConfig::new(FeeRate::new(20), FeeRate::new(20), FeeRate::new(50))
///     .expect("below 100%");
/// assert_eq!(fees.total(), 90);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeeConfig {
    lp: FeeRate,
    stakers: FeeRate,
    referral: FeeRate,
}

impl FeeConfig {
    /// A schedule that charges nothing.
    pub const ZERO: Self = Self {
        lp: FeeRate::ZERO,
        stakers: FeeRate::ZERO,
        referral: FeeRate::ZERO,
    };

    /// Creates a validated fee schedule.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidFee`] if the three fractions sum above
    /// [`PRECISION`].
    pub fn new(lp: FeeRate, stakers: FeeRate, referral: FeeRate) -> Result<Self> {
        let cfg = Self {
            lp,
            stakers,
            referral,
        };
        if cfg.total() > PRECISION {
            return Err(AmmError::InvalidFee("lp + stakers + referral exceeds 100%"));
        }
        Ok(cfg)
    }

    /// Liquidity-provider fraction.
    #[must_use]
    pub const fn lp(&self) -> FeeRate {
        self.lp
    }

    /// Staker fraction.
    #[must_use]
    pub const fn stakers(&self) -> FeeRate {
        self.stakers
    }

    /// Referral fraction.
    #[must_use]
    pub const fn referral(&self) -> FeeRate {
        self.referral
    }

    /// Sum of the three fractions in parts per million.
    #[must_use]
    pub const fn total(&self) -> u128 {
        self.lp.as_u128() + self.stakers.as_u128() + self.referral.as_u128()
    }

    /// Sum including an extra developer fraction.
    #[must_use]
    pub const fn total_with(&self, dev_fee: FeeRate) -> u128 {
        self.total() + dev_fee.as_u128()
    }
}

impl fmt::Display for FeeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lp={} stakers={} referral={}",
            self.lp, self.stakers, self.referral
        )
    }
}
