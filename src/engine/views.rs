//! Read-only queries.

use super::admin::token_set_key;
use super::Dex;
use crate::domain::{Address, FeeConfig, PoolId, TokenRef};
use crate::error::{AmmError, Result};
use crate::math::narrow;

impl Dex {
    /// Effective amplification coefficient at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::PoolNotFound`] for an unknown pool.
    pub fn get_a(&self, pool_id: PoolId, now: u64) -> Result<u128> {
        Ok(self.pool(pool_id)?.amplification().current(now))
    }

    /// Pool fee schedule.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::PoolNotFound`] for an unknown pool.
    pub fn get_fees(&self, pool_id: PoolId) -> Result<FeeConfig> {
        Ok(self.pool(pool_id)?.fees())
    }

    /// Pool tokens in index order.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::PoolNotFound`] for an unknown pool.
    pub fn get_tokens(&self, pool_id: PoolId) -> Result<&[TokenRef]> {
        Ok(self.pool(pool_id)?.tokens())
    }

    /// Raw reserves in index order.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::PoolNotFound`] for an unknown pool.
    pub fn get_reserves(&self, pool_id: PoolId) -> Result<Vec<u128>> {
        Ok(self.pool(pool_id)?.reserves())
    }

    /// Outstanding shares of a pool.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::PoolNotFound`] for an unknown pool.
    pub fn get_total_shares(&self, pool_id: PoolId) -> Result<u128> {
        Ok(self.pool(pool_id)?.total_shares())
    }

    /// Net output of swapping `dx` of token `i` for token `j`.
    ///
    /// # Errors
    ///
    /// See [`StablePool::quote_swap`](crate::pool::StablePool::quote_swap).
    pub fn get_dy(&self, pool_id: PoolId, i: usize, j: usize, dx: u128, now: u64) -> Result<u128> {
        let fees = self.fee_distributor(pool_id)?;
        let (dy, fee) = self.pool(pool_id)?.quote_swap(i, j, dx, now, &fees)?;
        dy.checked_sub(fee.total()?)
            .ok_or(AmmError::Underflow("fee exceeds swap output"))
    }

    /// Shares a deposit or withdrawal of `amounts` would mint or burn,
    /// before fees.
    ///
    /// # Errors
    ///
    /// See [`StablePool::calc_token_amount`](crate::pool::StablePool::calc_token_amount).
    pub fn calc_token_amount(
        &self,
        pool_id: PoolId,
        amounts: &[u128],
        is_deposit: bool,
        now: u64,
    ) -> Result<u128> {
        self.pool(pool_id)?.calc_token_amount(amounts, is_deposit, now)
    }

    /// Net output of burning `shares` for token `i` alone.
    ///
    /// # Errors
    ///
    /// See [`StablePool::quote_divest_one_coin`](crate::pool::StablePool::quote_divest_one_coin).
    pub fn calc_divest_one_coin(
        &self,
        pool_id: PoolId,
        shares: u128,
        i: usize,
        now: u64,
    ) -> Result<u128> {
        let fees = self.fee_distributor(pool_id)?;
        let (amount_out, _) = self
            .pool(pool_id)?
            .quote_divest_one_coin(shares, i, now, &fees)?;
        Ok(amount_out)
    }

    /// Liquid shares of `owner`.
    #[must_use]
    pub fn get_balance(&self, owner: Address, pool_id: PoolId) -> u128 {
        self.ledger.balance(owner, pool_id)
    }

    /// Staked shares of `owner`.
    #[must_use]
    pub fn get_frozen_balance(&self, owner: Address, pool_id: PoolId) -> u128 {
        self.ledger.frozen_balance(owner, pool_id)
    }

    /// Rewards `owner` would receive per pool token on the next stake
    /// call.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::PoolNotFound`] for an unknown pool.
    pub fn get_staker_info(&self, owner: Address, pool_id: PoolId) -> Result<Vec<u128>> {
        let pool = self.pool(pool_id)?;
        match self.ledger.entry(owner, pool_id) {
            Some(entry) => pool
                .staking()
                .pending(entry.frozen_balance(), entry.rewards()),
            None => Ok(vec![0; pool.width()]),
        }
    }

    /// Unclaimed referral fees of `referrer` in `token`.
    #[must_use]
    pub fn get_referral_balance(&self, referrer: Address, token: TokenRef) -> u128 {
        self.escrow.referral_balance(referrer, token)
    }

    /// Unclaimed developer fees in `token`.
    #[must_use]
    pub fn get_developer_balance(&self, token: TokenRef) -> u128 {
        self.escrow.developer_balance(token)
    }

    /// Whether `operator` may move `owner`'s shares of `pool_id`.
    #[must_use]
    pub fn is_operator(&self, owner: Address, operator: Address, pool_id: PoolId) -> bool {
        self.ledger.is_operator(owner, operator, pool_id)
    }

    /// Pool holding exactly `tokens`, in any order.
    #[must_use]
    pub fn pool_id_of(&self, tokens: &[TokenRef]) -> Option<PoolId> {
        self.pool_to_id.get(&token_set_key(tokens)).copied()
    }

    /// Invariant `D` of a pool's reserves at `now`, narrowed to `u128`.
    ///
    /// # Errors
    ///
    /// - [`AmmError::PoolNotFound`] for an unknown pool.
    /// - [`AmmError::Overflow`] if `D` does not fit in `u128`.
    pub fn get_invariant(&self, pool_id: PoolId, now: u64) -> Result<u128> {
        narrow(self.pool(pool_id)?.invariant(now)?, "invariant exceeds u128")
    }
}
