//! Accumulator-per-share rewards for staked pool shares.
//!
//! Staker fees are charged in whichever pool token is being priced, so
//! the pool keeps one accumulator per token:
//!
//! ```text
//! accumulator[i] += fee_i · ACCUMULATOR_PRECISION / total_staked
//! earnings[i]    += frozen · (accumulator[i] − checkpoint[i])
//! payout[i]       = earnings[i] / ACCUMULATOR_PRECISION
//! ```
//!
//! `earnings` stay in fixed point; only whole units are paid out and the
//! fractional remainder carries over.

use crate::domain::Rounding;
use crate::error::{AmmError, Result};
use crate::math::{mul_div, narrow, widen, CheckedArithmetic};

/// Fixed-point scale of accumulators and earnings.
pub const ACCUMULATOR_PRECISION: u128 = 10_000_000_000;

/// Pool-wide reward accumulator.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StakingAccumulator {
    accumulator: Vec<u128>,
    total_staked: u128,
}

impl StakingAccumulator {
    /// Empty accumulator for a pool of `tokens` assets.
    #[must_use]
    pub fn new(tokens: usize) -> Self {
        Self {
            accumulator: vec![0; tokens],
            total_staked: 0,
        }
    }

    /// Sum of all frozen balances in the pool.
    #[must_use]
    pub const fn total_staked(&self) -> u128 {
        self.total_staked
    }

    /// Reward per staked share for each token, scaled by
    /// [`ACCUMULATOR_PRECISION`].
    #[must_use]
    pub fn accumulator(&self) -> &[u128] {
        &self.accumulator
    }

    /// Credits a staker fee of `amount` units of token `token` and returns
    /// the part that backs staker earnings,
    /// `ceil(per_share · total_staked / ACCUMULATOR_PRECISION)`, never more
    /// than `amount`.
    ///
    /// The rest is below accumulator resolution; callers leave it with
    /// liquidity providers. Nothing is credited when nothing is staked.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidToken`] for an unknown token index.
    /// - [`AmmError::Overflow`] if the accumulator overflows.
    pub fn distribute(&mut self, token: usize, amount: u128) -> Result<u128> {
        if amount == 0 || self.total_staked == 0 {
            return Ok(0);
        }
        let per_share = mul_div(
            widen(amount),
            widen(ACCUMULATOR_PRECISION),
            widen(self.total_staked),
            Rounding::Down,
        )?;
        let per_share = narrow(per_share, "accumulator increment exceeds u128")?;
        if per_share == 0 {
            return Ok(0);
        }
        let slot = self
            .accumulator
            .get_mut(token)
            .ok_or(AmmError::InvalidToken("staker fee for unknown token"))?;
        *slot = slot.safe_add(&per_share)?;
        narrow(
            mul_div(
                widen(per_share),
                widen(self.total_staked),
                widen(ACCUMULATOR_PRECISION),
                Rounding::Up,
            )?,
            "credited staker fee exceeds u128",
        )
    }

    /// Brings `position` up to date with the accumulator for a holder of
    /// `frozen` staked shares.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if earnings overflow.
    pub fn settle(&self, frozen: u128, position: &mut RewardPosition) -> Result<()> {
        position.resize(self.accumulator.len());
        for (i, acc) in self.accumulator.iter().enumerate() {
            let delta = acc.safe_sub(&position.checkpoint[i])?;
            if frozen > 0 && delta > 0 {
                let accrued = narrow(widen(frozen).safe_mul(&widen(delta))?, "earnings exceed u128")?;
                position.earnings[i] = position.earnings[i].safe_add(&accrued)?;
            }
            position.checkpoint[i] = *acc;
        }
        Ok(())
    }

    /// Whole-unit rewards `position` could harvest right now, without
    /// mutating it.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if earnings overflow.
    pub fn pending(&self, frozen: u128, position: &RewardPosition) -> Result<Vec<u128>> {
        let mut preview = position.clone();
        self.settle(frozen, &mut preview)?;
        Ok(preview
            .earnings
            .iter()
            .map(|e| e / ACCUMULATOR_PRECISION)
            .collect())
    }

    pub(crate) fn stake(&mut self, amount: u128) -> Result<()> {
        self.total_staked = self.total_staked.safe_add(&amount)?;
        Ok(())
    }

    pub(crate) fn unstake(&mut self, amount: u128) -> Result<()> {
        self.total_staked = self
            .total_staked
            .checked_sub(amount)
            .ok_or(AmmError::InsufficientBalance)?;
        Ok(())
    }
}

/// A staker's settled earnings and last-seen accumulator values.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RewardPosition {
    earnings: Vec<u128>,
    checkpoint: Vec<u128>,
}

impl RewardPosition {
    pub(crate) fn has_earnings(&self) -> bool {
        self.earnings.iter().any(|e| *e > 0)
    }

    fn resize(&mut self, tokens: usize) {
        if self.earnings.len() < tokens {
            self.earnings.resize(tokens, 0);
        }
        if self.checkpoint.len() < tokens {
            self.checkpoint.resize(tokens, 0);
        }
    }

    /// Settled earnings per token, scaled by [`ACCUMULATOR_PRECISION`].
    #[must_use]
    pub fn earnings(&self) -> &[u128] {
        &self.earnings
    }

    /// Accumulator values at the last settlement.
    #[must_use]
    pub fn checkpoint(&self) -> &[u128] {
        &self.checkpoint
    }

    /// Takes the whole units out of every earnings slot, leaving the
    /// fractional remainder.
    pub fn harvest(&mut self) -> Vec<u128> {
        self.earnings
            .iter_mut()
            .map(|e| {
                let payout = *e / ACCUMULATOR_PRECISION;
                *e %= ACCUMULATOR_PRECISION;
                payout
            })
            .collect()
    }
}
