//! StableSwap pool state and its pricing transitions.
//!
//! # Swap
//!
//! 1. Normalise reserves by their rates and compute `D₀`.
//! 2. Credit the normalised input to `x[i]` and solve for `x[j]` at `D₀`.
//! 3. `dy = old_x[j] − new_x[j] − 1`, converted back to raw units.
//! 4. Charge the swap fee on `dy`; the caller receives `dy − fee`.
//!
//! # Imbalance fee
//!
//! Deposits and exact withdrawals are compared against the balances a
//! perfectly proportional operation of the same invariant change would
//! leave.  Each token's deviation is charged the pool fee scaled by
//! `n / (4(n − 1))`, and shares are minted or burned against the
//! invariant of the fee-reduced balances.
//!
//! Every method here mutates `self` in place; the engine applies them
//! to a working copy and commits only on success.

use super::amplification::AmplificationRamp;
use super::fees::{FeeBase, FeeBreakdown, FeeDistributor};
use super::staking::StakingAccumulator;
use crate::config::PoolConfig;
use crate::domain::{FeeConfig, Rounding, TokenInfo, TokenRef, PRECISION};
use crate::error::{AmmError, Result};
use crate::math::{
    abs_diff, compute_d, denormalize, mul_div, narrow, normalize, solve_y, widen,
    CheckedArithmetic, U256,
};

/// Result of [`StablePool::swap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapOutcome {
    /// Net amount owed to the receiver.
    pub amount_out: u128,
    /// Routed fee, in units of the output token.
    pub fee: FeeBreakdown,
}

/// Result of [`StablePool::invest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvestOutcome {
    /// Shares to mint for the receiver.
    pub minted: u128,
    /// Routed imbalance fee per token.
    pub fees: Vec<FeeBreakdown>,
}

/// Result of the withdrawal transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DivestOutcome {
    /// Raw amount owed to the receiver, per token.
    pub amounts_out: Vec<u128>,
    /// Shares burned from the caller.
    pub burned: u128,
    /// Routed fee per token.
    pub fees: Vec<FeeBreakdown>,
}

/// A StableSwap pool of 2–4 like-valued tokens.
///
/// # State
///
/// - `tokens` / `token_info`: ordered assets with rate, precision
///   multiplier and raw reserve.
/// - `amplification`: the `A` ramp.
/// - `fees`: lp / staker / referral fractions.
/// - `total_shares`: outstanding ownership shares, liquid and staked.
/// - `staking`: per-token reward accumulator for staked shares.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StablePool {
    tokens: Vec<TokenRef>,
    token_info: Vec<TokenInfo>,
    amplification: AmplificationRamp,
    fees: FeeConfig,
    total_shares: u128,
    staking: StakingAccumulator,
}

impl StablePool {
    /// Builds an empty pool (zero reserves, zero shares) from `config`.
    ///
    /// The initial deposit in `config` is applied separately through
    /// [`invest`](Self::invest).
    ///
    /// # Errors
    ///
    /// Propagates [`PoolConfig::validate`] failures.
    pub fn from_config(config: &PoolConfig, now: u64) -> Result<Self> {
        config.validate()?;
        let token_info = config
            .token_info()
            .iter()
            .map(|info| TokenInfo::new(info.rate(), info.precision_multiplier(), 0))
            .collect();
        Ok(Self {
            tokens: config.tokens().to_vec(),
            token_info,
            amplification: AmplificationRamp::new(config.amplification(), now)?,
            fees: config.fees(),
            total_shares: 0,
            staking: StakingAccumulator::new(config.tokens().len()),
        })
    }

    /// Ordered pool tokens.
    #[must_use]
    pub fn tokens(&self) -> &[TokenRef] {
        &self.tokens
    }

    /// Per-token metadata including current reserves.
    #[must_use]
    pub fn token_info(&self) -> &[TokenInfo] {
        &self.token_info
    }

    /// Raw reserves in token order.
    #[must_use]
    pub fn reserves(&self) -> Vec<u128> {
        self.token_info.iter().map(TokenInfo::reserves).collect()
    }

    /// Number of tokens.
    #[must_use]
    pub fn width(&self) -> usize {
        self.tokens.len()
    }

    /// The amplification ramp.
    #[must_use]
    pub const fn amplification(&self) -> &AmplificationRamp {
        &self.amplification
    }

    pub(crate) fn amplification_mut(&mut self) -> &mut AmplificationRamp {
        &mut self.amplification
    }

    /// Pool fee schedule.
    #[must_use]
    pub const fn fees(&self) -> FeeConfig {
        self.fees
    }

    pub(crate) fn set_fees(&mut self, fees: FeeConfig) {
        self.fees = fees;
    }

    /// Outstanding shares.
    #[must_use]
    pub const fn total_shares(&self) -> u128 {
        self.total_shares
    }

    /// Staking accumulator.
    #[must_use]
    pub const fn staking(&self) -> &StakingAccumulator {
        &self.staking
    }

    pub(crate) fn staking_mut(&mut self) -> &mut StakingAccumulator {
        &mut self.staking
    }

    /// Invariant `D` of the current reserves at time `now`.
    ///
    /// # Errors
    ///
    /// Propagates solver errors.
    pub fn invariant(&self, now: u64) -> Result<U256> {
        compute_d(&self.xp(&self.reserves())?, self.amplification.current(now))
    }

    fn xp(&self, balances: &[u128]) -> Result<Vec<U256>> {
        balances
            .iter()
            .zip(&self.token_info)
            .map(|(b, info)| normalize(*b, info.rate()))
            .collect()
    }

    fn rate(&self, index: usize) -> Result<u128> {
        self.token_info
            .get(index)
            .map(TokenInfo::rate)
            .ok_or(AmmError::InvalidToken("token index outside the pool"))
    }

    fn check_width(&self, amounts: &[u128]) -> Result<()> {
        if amounts.len() != self.width() {
            return Err(AmmError::InvalidToken("amounts must cover the pool's tokens"));
        }
        Ok(())
    }

    fn commit_reserves(&mut self, balances: &[u128]) {
        for (info, b) in self.token_info.iter_mut().zip(balances) {
            info.set_reserves(*b);
        }
    }

    /// Routes `fee` on token `token` and credits its staker share to
    /// `staking`, leaving whatever the accumulator cannot hold with
    /// liquidity providers.
    fn route(
        staking: &mut StakingAccumulator,
        token: usize,
        fee: FeeBreakdown,
        has_referral: bool,
    ) -> Result<FeeBreakdown> {
        let fee = fee.routed(has_referral, staking.total_staked() > 0)?;
        let credited = staking.distribute(token, fee.stakers)?;
        fee.with_stakers_credited(credited)
    }

    // -----------------------------------------------------------------------
    // Swap
    // -----------------------------------------------------------------------

    /// Prices a swap of `dx` units of token `i` into token `j`.
    ///
    /// Returns the gross output `dy` and the unrouted fee on it.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidToken`] for equal or out-of-range indices.
    /// - [`AmmError::InvalidQuantity`] if `dx` is zero.
    /// - [`AmmError::InsufficientLiquidity`] if any reserve is empty.
    pub fn quote_swap(
        &self,
        i: usize,
        j: usize,
        dx: u128,
        now: u64,
        fees: &FeeDistributor,
    ) -> Result<(u128, FeeBreakdown)> {
        if i == j {
            return Err(AmmError::InvalidToken("swap indices must differ"));
        }
        let rate_in = self.rate(i)?;
        let rate_out = self.rate(j)?;
        if dx == 0 {
            return Err(AmmError::InvalidQuantity("swap amount must be non-zero"));
        }
        let reserves = self.reserves();
        if reserves.iter().any(|r| *r == 0) {
            return Err(AmmError::InsufficientLiquidity);
        }

        let amp = self.amplification.current(now);
        let mut xp = self.xp(&reserves)?;
        let d = compute_d(&xp, amp)?;
        xp[i] = xp[i].safe_add(&normalize(dx, rate_in)?)?;
        let y = solve_y(&xp, j, d, amp)?;

        // One unit is held back against solver rounding.
        let dy_norm = xp[j]
            .checked_sub(y)
            .and_then(|v| v.checked_sub(U256::one()))
            .unwrap_or_default();
        let dy = denormalize(dy_norm, rate_out)?;
        let fee = fees.charge(dy, FeeBase::Swap)?;
        Ok((dy, fee))
    }

    /// Swaps `dx` units of token `i` for token `j`.
    ///
    /// # Errors
    ///
    /// See [`quote_swap`](Self::quote_swap).
    pub fn swap(
        &mut self,
        i: usize,
        j: usize,
        dx: u128,
        now: u64,
        fees: &FeeDistributor,
        has_referral: bool,
    ) -> Result<SwapOutcome> {
        let (dy, fee) = self.quote_swap(i, j, dx, now, fees)?;
        let mut staking = self.staking.clone();
        let fee = Self::route(&mut staking, j, fee, has_referral)?;
        let amount_out = dy.safe_sub(&fee.total()?)?;

        let mut reserves = self.reserves();
        reserves[i] = reserves[i].safe_add(&dx)?;
        reserves[j] = reserves[j]
            .safe_sub(&amount_out.safe_add(&fee.extracted()?)?)
            .map_err(|_| AmmError::InsufficientLiquidity)?;

        self.staking = staking;
        self.commit_reserves(&reserves);
        Ok(SwapOutcome { amount_out, fee })
    }

    // -----------------------------------------------------------------------
    // Invest
    // -----------------------------------------------------------------------

    /// Deposits `amounts` (one entry per token, zeros allowed).
    ///
    /// The first deposit into a pool without shares is fee-free, must
    /// include every token, and mints `D` shares.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidToken`] if `amounts` has the wrong width.
    /// - [`AmmError::InvalidQuantity`] for an empty deposit, an initial
    ///   deposit missing a token, or a deposit that mints nothing.
    pub fn invest(
        &mut self,
        amounts: &[u128],
        now: u64,
        fees: &FeeDistributor,
        has_referral: bool,
    ) -> Result<InvestOutcome> {
        self.check_width(amounts)?;
        if amounts.iter().all(|a| *a == 0) {
            return Err(AmmError::InvalidQuantity("nothing to deposit"));
        }
        let n = self.width();
        let amp = self.amplification.current(now);
        let old = self.reserves();
        let new = old
            .iter()
            .zip(amounts)
            .map(|(o, a)| o.safe_add(a))
            .collect::<Result<Vec<_>>>()?;

        if self.total_shares == 0 {
            if new.iter().any(|b| *b == 0) {
                return Err(AmmError::InvalidQuantity(
                    "initial deposit must include every token",
                ));
            }
            let d1 = compute_d(&self.xp(&new)?, amp)?;
            let minted = narrow(d1, "initial shares exceed u128")?;
            if minted == 0 {
                return Err(AmmError::InvalidQuantity("deposit mints no shares"));
            }
            self.commit_reserves(&new);
            self.total_shares = minted;
            return Ok(InvestOutcome {
                minted,
                fees: vec![FeeBreakdown::default(); n],
            });
        }

        let d0 = compute_d(&self.xp(&old)?, amp)?;
        let d1 = compute_d(&self.xp(&new)?, amp)?;
        if d1 <= d0 {
            return Err(AmmError::InvalidQuantity("deposit does not grow the invariant"));
        }

        let mut staking = self.staking.clone();
        let breakdowns =
            self.imbalance_fees(&mut staking, &old, &new, d0, d1, fees, has_referral)?;
        let adjusted = new
            .iter()
            .zip(&breakdowns)
            .map(|(b, fee)| b.safe_sub(&fee.total()?))
            .collect::<Result<Vec<_>>>()?;
        let d2 = compute_d(&self.xp(&adjusted)?, amp)?;
        let growth = d2
            .checked_sub(d0)
            .ok_or(AmmError::InvalidQuantity("deposit mints no shares"))?;
        let minted = narrow(
            mul_div(widen(self.total_shares), growth, d0, Rounding::Down)?,
            "minted shares exceed u128",
        )?;
        if minted == 0 {
            return Err(AmmError::InvalidQuantity("deposit mints no shares"));
        }

        let stored = new
            .iter()
            .zip(&breakdowns)
            .map(|(b, fee)| b.safe_sub(&fee.extracted()?))
            .collect::<Result<Vec<_>>>()?;
        self.staking = staking;
        self.commit_reserves(&stored);
        self.total_shares = self.total_shares.safe_add(&minted)?;
        Ok(InvestOutcome {
            minted,
            fees: breakdowns,
        })
    }

    /// Per-token routed imbalance fee between `old` and `new` balances.
    #[allow(clippy::too_many_arguments)]
    fn imbalance_fees(
        &self,
        staking: &mut StakingAccumulator,
        old: &[u128],
        new: &[u128],
        d0: U256,
        d1: U256,
        fees: &FeeDistributor,
        has_referral: bool,
    ) -> Result<Vec<FeeBreakdown>> {
        let kind = FeeBase::Imbalance {
            tokens: self.width(),
        };
        old.iter()
            .zip(new)
            .enumerate()
            .map(|(k, (o, b))| {
                let ideal = narrow(
                    mul_div(d1, widen(*o), d0, Rounding::Down)?,
                    "ideal balance exceeds u128",
                )?;
                Self::route(staking, k, fees.charge(ideal.abs_diff(*b), kind)?, has_referral)
            })
            .collect()
    }

    /// Shares a deposit (or withdrawal) of `amounts` would mint (or burn),
    /// ignoring fees.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidToken`] if `amounts` has the wrong width.
    /// - [`AmmError::InsufficientLiquidity`] if a withdrawal exceeds a
    ///   reserve.
    pub fn calc_token_amount(&self, amounts: &[u128], is_deposit: bool, now: u64) -> Result<u128> {
        self.check_width(amounts)?;
        let amp = self.amplification.current(now);
        let old = self.reserves();
        let new = old
            .iter()
            .zip(amounts)
            .map(|(o, a)| {
                if is_deposit {
                    o.safe_add(a)
                } else {
                    o.checked_sub(*a).ok_or(AmmError::InsufficientLiquidity)
                }
            })
            .collect::<Result<Vec<_>>>()?;
        let d1 = compute_d(&self.xp(&new)?, amp)?;
        if self.total_shares == 0 {
            return narrow(d1, "shares exceed u128");
        }
        let d0 = compute_d(&self.xp(&old)?, amp)?;
        narrow(
            mul_div(widen(self.total_shares), abs_diff(d1, d0), d0, Rounding::Down)?,
            "shares exceed u128",
        )
    }

    // -----------------------------------------------------------------------
    // Divest
    // -----------------------------------------------------------------------

    /// Burns `shares` for a proportional slice of every reserve.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidQuantity`] if `shares` is zero.
    /// - [`AmmError::InsufficientLiquidity`] if `shares` exceeds the total.
    pub fn divest(&mut self, shares: u128) -> Result<DivestOutcome> {
        if shares == 0 {
            return Err(AmmError::InvalidQuantity("shares must be non-zero"));
        }
        if shares > self.total_shares {
            return Err(AmmError::InsufficientLiquidity);
        }
        let reserves = self.reserves();
        let amounts_out = reserves
            .iter()
            .map(|r| {
                narrow(
                    mul_div(widen(*r), widen(shares), widen(self.total_shares), Rounding::Down)?,
                    "divest output exceeds u128",
                )
            })
            .collect::<Result<Vec<_>>>()?;
        let remaining = reserves
            .iter()
            .zip(&amounts_out)
            .map(|(r, out)| r.safe_sub(out))
            .collect::<Result<Vec<_>>>()?;
        self.commit_reserves(&remaining);
        self.total_shares -= shares;
        Ok(DivestOutcome {
            fees: vec![FeeBreakdown::default(); amounts_out.len()],
            amounts_out,
            burned: shares,
        })
    }

    /// Withdraws exactly `amounts`, burning the shares the resulting
    /// invariant drop requires, imbalance fee included.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidToken`] if `amounts` has the wrong width.
    /// - [`AmmError::InvalidQuantity`] for an empty withdrawal.
    /// - [`AmmError::InsufficientLiquidity`] if a token would be drained
    ///   or the burn exceeds every outstanding share.
    pub fn divest_imbalanced(
        &mut self,
        amounts: &[u128],
        now: u64,
        fees: &FeeDistributor,
        has_referral: bool,
    ) -> Result<DivestOutcome> {
        self.check_width(amounts)?;
        if amounts.iter().all(|a| *a == 0) {
            return Err(AmmError::InvalidQuantity("nothing to withdraw"));
        }
        if self.total_shares == 0 {
            return Err(AmmError::InsufficientLiquidity);
        }
        let amp = self.amplification.current(now);
        let old = self.reserves();
        let new = old
            .iter()
            .zip(amounts)
            .map(|(o, a)| o.checked_sub(*a).ok_or(AmmError::InsufficientLiquidity))
            .collect::<Result<Vec<_>>>()?;
        if new.iter().any(|b| *b == 0) {
            return Err(AmmError::InsufficientLiquidity);
        }

        let d0 = compute_d(&self.xp(&old)?, amp)?;
        let d1 = compute_d(&self.xp(&new)?, amp)?;
        let mut staking = self.staking.clone();
        let breakdowns =
            self.imbalance_fees(&mut staking, &old, &new, d0, d1, fees, has_referral)?;
        let adjusted = new
            .iter()
            .zip(&breakdowns)
            .map(|(b, fee)| {
                b.checked_sub(fee.total()?)
                    .ok_or(AmmError::InsufficientLiquidity)
            })
            .collect::<Result<Vec<_>>>()?;
        let d2 = compute_d(&self.xp(&adjusted)?, amp)?;
        let drop = d0.safe_sub(&d2)?;
        let burned = narrow(
            mul_div(widen(self.total_shares), drop, d0, Rounding::Up)?,
            "burned shares exceed u128",
        )?;
        if burned == 0 {
            return Err(AmmError::InvalidQuantity("withdrawal burns no shares"));
        }
        if burned > self.total_shares {
            return Err(AmmError::InsufficientLiquidity);
        }

        let stored = new
            .iter()
            .zip(&breakdowns)
            .map(|(b, fee)| b.safe_sub(&fee.extracted()?))
            .collect::<Result<Vec<_>>>()?;
        self.staking = staking;
        self.commit_reserves(&stored);
        self.total_shares -= burned;
        Ok(DivestOutcome {
            amounts_out: amounts.to_vec(),
            burned,
            fees: breakdowns,
        })
    }

    /// Prices burning `shares` for token `index` alone.
    ///
    /// Returns the raw output and the raw fee withheld from it.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidToken`] for an out-of-range index.
    /// - [`AmmError::InvalidQuantity`] if `shares` is zero.
    /// - [`AmmError::InsufficientLiquidity`] unless `shares` is below the
    ///   total: the last shares can only leave through a balanced
    ///   [`divest`](Self::divest).
    pub fn quote_divest_one_coin(
        &self,
        shares: u128,
        index: usize,
        now: u64,
        fees: &FeeDistributor,
    ) -> Result<(u128, u128)> {
        let rate = self.rate(index)?;
        if shares == 0 {
            return Err(AmmError::InvalidQuantity("shares must be non-zero"));
        }
        if shares >= self.total_shares {
            return Err(AmmError::InsufficientLiquidity);
        }

        let amp = self.amplification.current(now);
        let xp = self.xp(&self.reserves())?;
        let d0 = compute_d(&xp, amp)?;
        let d1 = d0.safe_sub(&mul_div(
            widen(shares),
            d0,
            widen(self.total_shares),
            Rounding::Down,
        )?)?;
        if d1.is_zero() {
            return Err(AmmError::InsufficientLiquidity);
        }
        let new_y = solve_y(&xp, index, d1, amp)?;

        let (num, den) = FeeBase::Imbalance {
            tokens: self.width(),
        }
        .scale();
        let fee_num = widen(fees.total_rate()).safe_mul(&widen(num))?;
        let fee_den = widen(PRECISION).safe_mul(&widen(den))?;

        let mut reduced = xp.clone();
        for (k, x) in xp.iter().enumerate() {
            let proportional = mul_div(*x, d1, d0, Rounding::Down)?;
            let expected = if k == index {
                proportional.safe_sub(&new_y)?
            } else {
                x.safe_sub(&proportional)?
            };
            let fee = mul_div(expected, fee_num, fee_den, Rounding::Down)?;
            reduced[k] = reduced[k].safe_sub(&fee)?;
        }

        let y = solve_y(&reduced, index, d1, amp)?;
        let dy = reduced[index]
            .checked_sub(y)
            .and_then(|v| v.checked_sub(U256::one()))
            .unwrap_or_default();
        let dy_0 = xp[index].safe_sub(&new_y)?;

        let amount_out = denormalize(dy, rate)?;
        let gross = denormalize(dy_0, rate)?;
        Ok((amount_out, gross.saturating_sub(amount_out)))
    }

    /// Burns `shares` for token `index` alone.
    ///
    /// # Errors
    ///
    /// See [`quote_divest_one_coin`](Self::quote_divest_one_coin).
    pub fn divest_one_coin(
        &mut self,
        shares: u128,
        index: usize,
        now: u64,
        fees: &FeeDistributor,
        has_referral: bool,
    ) -> Result<DivestOutcome> {
        let (amount_out, fee_total) = self.quote_divest_one_coin(shares, index, now, fees)?;
        let mut staking = self.staking.clone();
        let fee = Self::route(&mut staking, index, fees.apportion(fee_total)?, has_referral)?;

        let mut reserves = self.reserves();
        reserves[index] = reserves[index]
            .checked_sub(amount_out.safe_add(&fee.extracted()?)?)
            .ok_or(AmmError::InsufficientLiquidity)?;

        let n = self.width();
        let mut amounts_out = vec![0; n];
        amounts_out[index] = amount_out;
        let mut breakdowns = vec![FeeBreakdown::default(); n];
        breakdowns[index] = fee;

        self.staking = staking;
        self.commit_reserves(&reserves);
        self.total_shares -= shares;
        Ok(DivestOutcome {
            amounts_out,
            burned: shares,
            fees: breakdowns,
        })
    }
}
