//! Fee apportionment between liquidity providers, stakers, referrers and
//! the developer.
//!
//! A fee base (swap output, or the per-token deviation of an imbalanced
//! deposit/withdrawal) is scaled by [`FeeBase`] and split:
//!
//! ```text
//! total     = ceil(base·k·(lp + stakers + referral + dev) / PRECISION)
//! component = floor(base·k·fraction / PRECISION)     stakers, referral, dev
//! lp        = total − stakers − referral − dev
//! ```
//!
//! Rounding the total up and the extracted components down keeps
//! every leftover unit in the reserves.

use crate::domain::{FeeConfig, FeeRate, Rounding, PRECISION};
use crate::error::Result;
use crate::math::{mul_div, narrow, widen, CheckedArithmetic, U256};

/// What a fee is charged on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeBase {
    /// Swap output: scale `k = 1`.
    Swap,
    /// Deviation from a balanced deposit or withdrawal in a pool of
    /// `tokens` assets: scale `k = n / (4(n − 1))`.
    Imbalance {
        /// Pool width `n`.
        tokens: usize,
    },
}

impl FeeBase {
    /// `(numerator, denominator)` of the scale factor.
    #[must_use]
    pub const fn scale(&self) -> (u128, u128) {
        match self {
            Self::Swap => (1, 1),
            Self::Imbalance { tokens } => {
                let n = *tokens as u128;
                (n, 4 * n.saturating_sub(1))
            }
        }
    }
}

/// One fee split into its destinations, in raw units of one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeeBreakdown {
    /// Retained in reserves.
    pub lp: u128,
    /// Credited to the staking accumulator.
    pub stakers: u128,
    /// Credited to the referrer's escrow.
    pub referral: u128,
    /// Credited to the developer escrow.
    pub developer: u128,
}

impl FeeBreakdown {
    /// Sum of all four components.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`](crate::error::AmmError::Overflow) on
    /// overflow.
    pub fn total(&self) -> Result<u128> {
        self.lp.safe_add(&self.extracted()?)
    }

    /// Part of the fee that leaves the reserves: stakers, referral and
    /// developer.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`](crate::error::AmmError::Overflow) on
    /// overflow.
    pub fn extracted(&self) -> Result<u128> {
        self.stakers
            .safe_add(&self.referral)?
            .safe_add(&self.developer)
    }

    /// Folds the referral component into `lp` when no referrer was given,
    /// and the staker component when nothing is staked.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`](crate::error::AmmError::Overflow) on
    /// overflow.
    pub fn routed(mut self, has_referral: bool, has_stakers: bool) -> Result<Self> {
        if !has_referral {
            self.lp = self.lp.safe_add(&self.referral)?;
            self.referral = 0;
        }
        if !has_stakers {
            self.lp = self.lp.safe_add(&self.stakers)?;
            self.stakers = 0;
        }
        Ok(self)
    }

    /// Caps the staker component at `credited`, returning the excess to
    /// `lp`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`](crate::error::AmmError::Overflow) on
    /// overflow.
    pub fn with_stakers_credited(mut self, credited: u128) -> Result<Self> {
        let credited = credited.min(self.stakers);
        self.lp = self.lp.safe_add(&(self.stakers - credited))?;
        self.stakers = credited;
        Ok(self)
    }
}

/// A pool's fee schedule combined with the global developer fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeDistributor {
    fees: FeeConfig,
    dev_fee: FeeRate,
}

impl FeeDistributor {
    /// Combines pool fees with the developer fee.
    #[must_use]
    pub const fn new(fees: FeeConfig, dev_fee: FeeRate) -> Self {
        Self { fees, dev_fee }
    }

    /// Sum of all four fractions in parts per million.
    #[must_use]
    pub const fn total_rate(&self) -> u128 {
        self.fees.total_with(self.dev_fee)
    }

    /// Charges a fee on `base`.
    ///
    /// # Errors
    ///
    /// Propagates overflow from the 256-bit products.
    pub fn charge(&self, base: u128, kind: FeeBase) -> Result<FeeBreakdown> {
        let (num, den) = kind.scale();
        if base == 0 || den == 0 {
            return Ok(FeeBreakdown::default());
        }
        let scaled = widen(base).safe_mul(&widen(num))?;
        let denominator = widen(den).safe_mul(&widen(PRECISION))?;
        let part = |rate: u128, rounding: Rounding| -> Result<u128> {
            let v = mul_div(scaled, widen(rate), denominator, rounding)?;
            narrow(v, "fee component exceeds u128")
        };

        let total = part(self.total_rate(), Rounding::Up)?;
        let stakers = part(self.fees.stakers().as_u128(), Rounding::Down)?;
        let referral = part(self.fees.referral().as_u128(), Rounding::Down)?;
        let developer = part(self.dev_fee.as_u128(), Rounding::Down)?;
        let lp = total
            .safe_sub(&stakers)?
            .safe_sub(&referral)?
            .safe_sub(&developer)?;
        Ok(FeeBreakdown {
            lp,
            stakers,
            referral,
            developer,
        })
    }

    /// Splits an already computed fee `total` in proportion to the
    /// fractions, with `lp` taking the rounding remainder.
    ///
    /// # Errors
    ///
    /// Propagates overflow from the 256-bit products.
    pub fn apportion(&self, total: u128) -> Result<FeeBreakdown> {
        let rate_sum = self.total_rate();
        if rate_sum == 0 || total == 0 {
            return Ok(FeeBreakdown {
                lp: total,
                ..FeeBreakdown::default()
            });
        }
        let share = |rate: u128| -> Result<u128> {
            let v = mul_div(widen(total), widen(rate), U256::from(rate_sum), Rounding::Down)?;
            narrow(v, "fee share exceeds u128")
        };
        let stakers = share(self.fees.stakers().as_u128())?;
        let referral = share(self.fees.referral().as_u128())?;
        let developer = share(self.dev_fee.as_u128())?;
        let lp = total
            .safe_sub(&stakers)?
            .safe_sub(&referral)?
            .safe_sub(&developer)?;
        Ok(FeeBreakdown {
            lp,
            stakers,
            referral,
            developer,
        })
    }
}
