//! Privileged transitions: pool creation, fees and the `A` ramp.

use tracing::info;

use super::{CallContext, Dex, Receipt};
use crate::config::PoolConfig;
use crate::domain::{FeeConfig, FeeRate, PoolId, TokenRef, Transfer, PRECISION};
use crate::error::{AmmError, Result};
use crate::pool::StablePool;

impl Dex {
    /// Creates a pool from `config`, or reinitializes the empty pool with
    /// the same token set, depositing the initial reserves from the admin.
    ///
    /// Reinitializing keeps the existing pool's tokens, rates, fees and
    /// ramp; only the reserves from `config` are used.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Unauthorized`] unless the sender is the admin.
    /// - [`AmmError::AlreadyInitialized`] if the token set's pool still
    ///   has shares outstanding.
    /// - [`AmmError::InvalidFee`] if pool and developer fees together
    ///   exceed 100%.
    /// - Propagates [`PoolConfig::validate`] failures.
    pub fn add_pool(&mut self, ctx: CallContext, config: &PoolConfig) -> Result<Receipt> {
        self.atomically(|dex| dex.apply_add_pool(ctx, config))
    }

    /// Replaces a pool's fee schedule.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Unauthorized`] unless the sender is the admin.
    /// - [`AmmError::PoolNotFound`] for an unknown pool.
    /// - [`AmmError::InvalidFee`] if pool and developer fees together
    ///   exceed 100%.
    pub fn set_fees(&mut self, ctx: CallContext, pool_id: PoolId, fees: FeeConfig) -> Result<Receipt> {
        self.atomically(|dex| dex.apply_set_fees(ctx, pool_id, fees))
    }

    /// Replaces the developer fee.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Unauthorized`] unless the sender is the developer.
    /// - [`AmmError::InvalidFee`] if any pool's total fee would exceed
    ///   100%.
    pub fn set_dev_fee(&mut self, ctx: CallContext, fee: FeeRate) -> Result<Receipt> {
        self.atomically(|dex| dex.apply_set_dev_fee(ctx, fee))
    }

    /// Starts ramping a pool's `A` toward `future_a`, reached at
    /// `future_time`.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Unauthorized`] unless the sender is the admin.
    /// - [`AmmError::RampWindowViolation`] as described on
    ///   [`AmplificationRamp::start_ramp`](crate::pool::AmplificationRamp::start_ramp).
    pub fn ramp_a(
        &mut self,
        ctx: CallContext,
        pool_id: PoolId,
        future_a: u128,
        future_time: u64,
    ) -> Result<Receipt> {
        self.atomically(|dex| dex.apply_ramp_a(ctx, pool_id, future_a, future_time))
    }

    /// Freezes a pool's `A` at its current value.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Unauthorized`] unless the sender is the admin.
    /// - [`AmmError::PoolNotFound`] for an unknown pool.
    pub fn stop_ramp_a(&mut self, ctx: CallContext, pool_id: PoolId) -> Result<Receipt> {
        self.atomically(|dex| dex.apply_stop_ramp_a(ctx, pool_id))
    }

    pub(super) fn apply_add_pool(
        &mut self,
        ctx: CallContext,
        config: &PoolConfig,
    ) -> Result<Receipt> {
        self.require_admin(ctx.sender)?;
        config.validate()?;
        if config.fees().total_with(self.config.dev_fee()) > PRECISION {
            return Err(AmmError::InvalidFee("pool and developer fees exceed 100%"));
        }

        let key = token_set_key(config.tokens());
        let existing = self.pool_to_id.get(&key).copied();
        let (pool_id, reinitialized) = match existing {
            Some(pool_id) => {
                if self.pool(pool_id)?.total_shares() > 0 {
                    return Err(AmmError::AlreadyInitialized);
                }
                (pool_id, true)
            }
            None => {
                let pool_id = self.next_pool_id;
                self.next_pool_id = pool_id
                    .next()
                    .ok_or(AmmError::Overflow("pool id space exhausted"))?;
                self.pools
                    .insert(pool_id, StablePool::from_config(config, ctx.now)?);
                self.pool_to_id.insert(key, pool_id);
                (pool_id, false)
            }
        };

        let fees = self.fee_distributor(pool_id)?;
        let pool = self.pool_mut(pool_id)?;
        let amounts = pool
            .tokens()
            .iter()
            .map(|token| {
                config
                    .tokens()
                    .iter()
                    .position(|t| t == token)
                    .map(|k| config.token_info()[k].reserves())
            })
            .collect::<Option<Vec<_>>>()
            .ok_or(AmmError::InvalidTokenSet("token set does not match the pool"))?;
        let outcome = pool.invest(&amounts, ctx.now, &fees, false)?;
        let tokens = pool.tokens().to_vec();

        let admin = self.config.admin();
        self.ledger.mint(admin, pool_id, outcome.minted)?;

        let custody = self.config.custody();
        let mut receipt = Receipt::for_pool(pool_id);
        for (token, amount) in tokens.iter().zip(&amounts) {
            receipt.push_nonzero(Transfer::new(admin, custody, *amount, *token));
        }
        receipt.set_minted(outcome.minted);

        info!(
            pool = %pool_id,
            tokens = tokens.len(),
            minted = outcome.minted,
            reinitialized,
            "pool added"
        );
        Ok(receipt)
    }

    pub(super) fn apply_set_fees(
        &mut self,
        ctx: CallContext,
        pool_id: PoolId,
        fees: FeeConfig,
    ) -> Result<Receipt> {
        self.require_admin(ctx.sender)?;
        if fees.total_with(self.config.dev_fee()) > PRECISION {
            return Err(AmmError::InvalidFee("pool and developer fees exceed 100%"));
        }
        self.pool_mut(pool_id)?.set_fees(fees);
        info!(pool = %pool_id, total = fees.total(), "fees updated");
        Ok(Receipt::for_pool(pool_id))
    }

    pub(super) fn apply_set_dev_fee(&mut self, ctx: CallContext, fee: FeeRate) -> Result<Receipt> {
        self.require_developer(ctx.sender)?;
        if !fee.is_valid() || self.pools.values().any(|p| p.fees().total_with(fee) > PRECISION) {
            return Err(AmmError::InvalidFee("pool and developer fees exceed 100%"));
        }
        self.config.set_dev_fee(fee);
        info!(dev_fee = %fee, "developer fee updated");
        Ok(Receipt::default())
    }

    pub(super) fn apply_ramp_a(
        &mut self,
        ctx: CallContext,
        pool_id: PoolId,
        future_a: u128,
        future_time: u64,
    ) -> Result<Receipt> {
        self.require_admin(ctx.sender)?;
        let ramp = self.pool_mut(pool_id)?.amplification_mut();
        ramp.start_ramp(future_a, future_time, ctx.now)?;
        info!(
            pool = %pool_id,
            initial_a = ramp.initial_a(),
            future_a,
            future_time,
            "amplification ramp started"
        );
        Ok(Receipt::for_pool(pool_id))
    }

    pub(super) fn apply_stop_ramp_a(&mut self, ctx: CallContext, pool_id: PoolId) -> Result<Receipt> {
        self.require_admin(ctx.sender)?;
        let ramp = self.pool_mut(pool_id)?.amplification_mut();
        ramp.stop_ramp(ctx.now);
        info!(pool = %pool_id, a = ramp.future_a(), "amplification ramp stopped");
        Ok(Receipt::for_pool(pool_id))
    }
}

/// Order-independent identity of a token set.
pub(super) fn token_set_key(tokens: &[TokenRef]) -> Vec<TokenRef> {
    let mut key = tokens.to_vec();
    key.sort_unstable();
    key
}
