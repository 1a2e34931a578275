//! User-facing state transitions.
//!
//! Every public method wraps an `apply_*` transition in
//! [`Dex::atomically`]; [`Dex::execute`] calls the transitions directly
//! inside its own snapshot.

use tracing::debug;

use super::{check_deadline, dense_amounts, CallContext, Dex, Receipt};
use super::{
    DivestImbalancedParams, DivestOneCoinParams, DivestParams, InvestParams, StakeAction,
    SwapParams,
};
use crate::domain::{Address, PoolId, TokenRef, Transfer};
use crate::error::{AmmError, Result};
use crate::ledger::{OperatorUpdate, TransferBatch};
use crate::pool::FeeBreakdown;

impl Dex {
    /// Swaps `params.amount` of one pool token for another.
    ///
    /// Transfers: input from the sender to custody, then the net output
    /// from custody to the receiver (emitted even when zero).
    ///
    /// # Errors
    ///
    /// - [`AmmError::Expired`] if `now > deadline`.
    /// - [`AmmError::PoolNotFound`], [`AmmError::InvalidToken`],
    ///   [`AmmError::InvalidQuantity`] or
    ///   [`AmmError::InsufficientLiquidity`] for bad inputs.
    /// - [`AmmError::SlippageExceeded`] if the output is below
    ///   `min_amount_out`.
    pub fn swap(&mut self, ctx: CallContext, params: &SwapParams) -> Result<Receipt> {
        self.atomically(|dex| dex.apply_swap(ctx, params))
    }

    /// Deposits tokens for shares.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Expired`] if `now > deadline`.
    /// - [`AmmError::InvalidToken`] for an index outside the pool.
    /// - [`AmmError::InvalidQuantity`] for an empty deposit.
    /// - [`AmmError::SlippageExceeded`] if fewer than `min_shares` are
    ///   minted.
    pub fn invest(&mut self, ctx: CallContext, params: &InvestParams) -> Result<Receipt> {
        self.atomically(|dex| dex.apply_invest(ctx, params))
    }

    /// Burns shares for a proportional slice of every reserve.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Expired`] if `now > deadline`.
    /// - [`AmmError::InsufficientBalance`] if the sender's liquid balance
    ///   is too small.
    /// - [`AmmError::SlippageExceeded`] if any output is below its
    ///   minimum.
    pub fn divest(&mut self, ctx: CallContext, params: &DivestParams) -> Result<Receipt> {
        self.atomically(|dex| dex.apply_divest(ctx, params))
    }

    /// Withdraws exact amounts.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Expired`] if `now > deadline`.
    /// - [`AmmError::SlippageExceeded`] if more than `max_shares` would
    ///   be burned.
    /// - [`AmmError::InsufficientBalance`] if the sender holds fewer
    ///   liquid shares than the burn.
    pub fn divest_imbalanced(
        &mut self,
        ctx: CallContext,
        params: &DivestImbalancedParams,
    ) -> Result<Receipt> {
        self.atomically(|dex| dex.apply_divest_imbalanced(ctx, params))
    }

    /// Burns shares for a single token.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Expired`] if `now > deadline`.
    /// - [`AmmError::InsufficientBalance`] if the sender's liquid balance
    ///   is too small.
    /// - [`AmmError::SlippageExceeded`] if the output is below
    ///   `min_amount_out`.
    pub fn divest_one_coin(
        &mut self,
        ctx: CallContext,
        params: &DivestOneCoinParams,
    ) -> Result<Receipt> {
        self.atomically(|dex| dex.apply_divest_one_coin(ctx, params))
    }

    /// Stakes or unstakes shares, paying out settled rewards.
    ///
    /// # Errors
    ///
    /// - [`AmmError::PoolNotFound`] for an unknown pool.
    /// - [`AmmError::InsufficientBalance`] if the liquid (add) or frozen
    ///   (remove) balance is too small.
    pub fn stake(&mut self, ctx: CallContext, action: StakeAction) -> Result<Receipt> {
        self.atomically(|dex| dex.apply_stake(ctx, action))
    }

    /// Claims referral fees collected for the sender.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InsufficientEscrow`] if `amount` exceeds the
    /// balance.
    pub fn claim_referral(
        &mut self,
        ctx: CallContext,
        token: TokenRef,
        amount: u128,
    ) -> Result<Receipt> {
        self.atomically(|dex| dex.apply_claim_referral(ctx, token, amount))
    }

    /// Claims developer fees.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Unauthorized`] unless the sender is the developer.
    /// - [`AmmError::InsufficientEscrow`] if `amount` exceeds the balance.
    pub fn claim_developer(
        &mut self,
        ctx: CallContext,
        token: TokenRef,
        amount: u128,
    ) -> Result<Receipt> {
        self.atomically(|dex| dex.apply_claim_developer(ctx, token, amount))
    }

    /// Moves liquid shares between accounts.
    ///
    /// # Errors
    ///
    /// - [`AmmError::PoolNotFound`] if a leg names an unknown pool.
    /// - [`AmmError::Unauthorized`] / [`AmmError::InsufficientBalance`]
    ///   from [`ShareLedger::transfer`](crate::ledger::ShareLedger::transfer).
    pub fn transfer(&mut self, ctx: CallContext, batches: &[TransferBatch]) -> Result<Receipt> {
        self.atomically(|dex| dex.apply_transfer(ctx, batches))
    }

    /// Grants or revokes share operators for the sender.
    ///
    /// # Errors
    ///
    /// - [`AmmError::PoolNotFound`] if an update names an unknown pool.
    /// - [`AmmError::Unauthorized`] if an update is for another owner.
    pub fn update_operators(
        &mut self,
        ctx: CallContext,
        updates: &[OperatorUpdate],
    ) -> Result<Receipt> {
        self.atomically(|dex| dex.apply_update_operators(ctx, updates))
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    fn credit_fees(
        &mut self,
        token: TokenRef,
        fee: &FeeBreakdown,
        referral: Option<Address>,
    ) -> Result<()> {
        if let Some(referrer) = referral {
            self.escrow.credit_referral(referrer, token, fee.referral)?;
        }
        self.escrow.credit_developer(token, fee.developer)
    }

    fn credit_all_fees(
        &mut self,
        tokens: &[TokenRef],
        fees: &[FeeBreakdown],
        referral: Option<Address>,
    ) -> Result<()> {
        for (token, fee) in tokens.iter().zip(fees) {
            self.credit_fees(*token, fee, referral)?;
        }
        Ok(())
    }

    pub(super) fn apply_swap(&mut self, ctx: CallContext, params: &SwapParams) -> Result<Receipt> {
        check_deadline(ctx.now, params.deadline)?;
        let fees = self.fee_distributor(params.pool_id)?;
        let pool = self.pool_mut(params.pool_id)?;
        let outcome = pool.swap(
            params.idx_from,
            params.idx_to,
            params.amount,
            ctx.now,
            &fees,
            params.referral.is_some(),
        )?;
        if outcome.amount_out < params.min_amount_out {
            return Err(AmmError::SlippageExceeded("swap output below minimum"));
        }
        let token_in = pool.tokens()[params.idx_from];
        let token_out = pool.tokens()[params.idx_to];
        self.credit_fees(token_out, &outcome.fee, params.referral)?;

        let custody = self.config.custody();
        let receiver = params.receiver.unwrap_or(ctx.sender);
        let mut receipt = Receipt::for_pool(params.pool_id);
        receipt.push(Transfer::new(ctx.sender, custody, params.amount, token_in));
        receipt.push(Transfer::new(custody, receiver, outcome.amount_out, token_out));
        receipt.set_amount_out(outcome.amount_out);

        debug!(
            pool = %params.pool_id,
            idx_from = params.idx_from,
            idx_to = params.idx_to,
            amount_in = params.amount,
            amount_out = outcome.amount_out,
            lp_fee = outcome.fee.lp,
            staker_fee = outcome.fee.stakers,
            referral_fee = outcome.fee.referral,
            developer_fee = outcome.fee.developer,
            "swap"
        );
        Ok(receipt)
    }

    pub(super) fn apply_invest(
        &mut self,
        ctx: CallContext,
        params: &InvestParams,
    ) -> Result<Receipt> {
        check_deadline(ctx.now, params.deadline)?;
        let fees = self.fee_distributor(params.pool_id)?;
        let pool = self.pool_mut(params.pool_id)?;
        let amounts = dense_amounts(&params.in_amounts, pool.width())?;
        let outcome = pool.invest(&amounts, ctx.now, &fees, params.referral.is_some())?;
        if outcome.minted < params.min_shares {
            return Err(AmmError::SlippageExceeded("minted shares below minimum"));
        }
        let tokens = pool.tokens().to_vec();
        self.credit_all_fees(&tokens, &outcome.fees, params.referral)?;

        let receiver = params.receiver.unwrap_or(ctx.sender);
        self.ledger.mint(receiver, params.pool_id, outcome.minted)?;

        let custody = self.config.custody();
        let mut receipt = Receipt::for_pool(params.pool_id);
        for (token, amount) in tokens.iter().zip(&amounts) {
            receipt.push_nonzero(Transfer::new(ctx.sender, custody, *amount, *token));
        }
        receipt.set_minted(outcome.minted);

        debug!(pool = %params.pool_id, minted = outcome.minted, "invest");
        Ok(receipt)
    }

    pub(super) fn apply_divest(
        &mut self,
        ctx: CallContext,
        params: &DivestParams,
    ) -> Result<Receipt> {
        check_deadline(ctx.now, params.deadline)?;
        self.ledger.burn(ctx.sender, params.pool_id, params.shares)?;
        let pool = self.pool_mut(params.pool_id)?;
        let minimums = dense_amounts(&params.min_amounts_out, pool.width())?;
        let outcome = pool.divest(params.shares)?;
        if outcome
            .amounts_out
            .iter()
            .zip(&minimums)
            .any(|(out, min)| out < min)
        {
            return Err(AmmError::SlippageExceeded("divest output below minimum"));
        }
        let tokens = pool.tokens().to_vec();

        let receipt = self.payout_receipt(
            params.pool_id,
            &tokens,
            &outcome.amounts_out,
            params.receiver.unwrap_or(ctx.sender),
            outcome.burned,
        );
        debug!(pool = %params.pool_id, burned = outcome.burned, "divest");
        Ok(receipt)
    }

    pub(super) fn apply_divest_imbalanced(
        &mut self,
        ctx: CallContext,
        params: &DivestImbalancedParams,
    ) -> Result<Receipt> {
        check_deadline(ctx.now, params.deadline)?;
        let fees = self.fee_distributor(params.pool_id)?;
        let pool = self.pool_mut(params.pool_id)?;
        let amounts = dense_amounts(&params.amounts_out, pool.width())?;
        let outcome = pool.divest_imbalanced(&amounts, ctx.now, &fees, params.referral.is_some())?;
        if outcome.burned > params.max_shares {
            return Err(AmmError::SlippageExceeded("burned shares above maximum"));
        }
        let tokens = pool.tokens().to_vec();
        self.ledger.burn(ctx.sender, params.pool_id, outcome.burned)?;
        self.credit_all_fees(&tokens, &outcome.fees, params.referral)?;

        let receipt = self.payout_receipt(
            params.pool_id,
            &tokens,
            &outcome.amounts_out,
            params.receiver.unwrap_or(ctx.sender),
            outcome.burned,
        );
        debug!(pool = %params.pool_id, burned = outcome.burned, "divest imbalanced");
        Ok(receipt)
    }

    pub(super) fn apply_divest_one_coin(
        &mut self,
        ctx: CallContext,
        params: &DivestOneCoinParams,
    ) -> Result<Receipt> {
        check_deadline(ctx.now, params.deadline)?;
        let fees = self.fee_distributor(params.pool_id)?;
        self.ledger.burn(ctx.sender, params.pool_id, params.shares)?;
        let pool = self.pool_mut(params.pool_id)?;
        let outcome = pool.divest_one_coin(
            params.shares,
            params.token_index,
            ctx.now,
            &fees,
            params.referral.is_some(),
        )?;
        let amount_out = outcome.amounts_out[params.token_index];
        if amount_out < params.min_amount_out {
            return Err(AmmError::SlippageExceeded("divest output below minimum"));
        }
        let tokens = pool.tokens().to_vec();
        self.credit_all_fees(&tokens, &outcome.fees, params.referral)?;

        let mut receipt = self.payout_receipt(
            params.pool_id,
            &tokens,
            &outcome.amounts_out,
            params.receiver.unwrap_or(ctx.sender),
            outcome.burned,
        );
        receipt.set_amount_out(amount_out);
        debug!(
            pool = %params.pool_id,
            token_index = params.token_index,
            burned = outcome.burned,
            amount_out,
            "divest one coin"
        );
        Ok(receipt)
    }

    fn payout_receipt(
        &self,
        pool_id: PoolId,
        tokens: &[TokenRef],
        amounts: &[u128],
        receiver: Address,
        burned: u128,
    ) -> Receipt {
        let custody = self.config.custody();
        let mut receipt = Receipt::for_pool(pool_id);
        for (token, amount) in tokens.iter().zip(amounts) {
            receipt.push_nonzero(Transfer::new(custody, receiver, *amount, *token));
        }
        receipt.set_burned(burned);
        receipt
    }

    pub(super) fn apply_stake(&mut self, ctx: CallContext, action: StakeAction) -> Result<Receipt> {
        let pool_id = action.pool_id();
        let pool = self
            .pools
            .get_mut(&pool_id)
            .ok_or(AmmError::PoolNotFound)?;
        let entry = self.ledger.entry_mut(ctx.sender, pool_id);
        pool.staking()
            .settle(entry.frozen_balance(), entry.rewards_mut())?;
        match action {
            StakeAction::Add { amount, .. } => {
                entry.freeze(amount)?;
                pool.staking_mut().stake(amount)?;
            }
            StakeAction::Remove { amount, .. } => {
                entry.unfreeze(amount)?;
                pool.staking_mut().unstake(amount)?;
            }
        }
        let payouts = entry.rewards_mut().harvest();
        let frozen = entry.frozen_balance();

        let custody = self.config.custody();
        let mut receipt = Receipt::for_pool(pool_id);
        for (token, amount) in pool.tokens().iter().zip(&payouts) {
            receipt.push_nonzero(Transfer::new(custody, ctx.sender, *amount, *token));
        }

        debug!(
            pool = %pool_id,
            staker = %ctx.sender,
            frozen,
            total_staked = pool.staking().total_staked(),
            "stake"
        );
        self.ledger.prune(ctx.sender, pool_id);
        Ok(receipt)
    }

    pub(super) fn apply_claim_referral(
        &mut self,
        ctx: CallContext,
        token: TokenRef,
        amount: u128,
    ) -> Result<Receipt> {
        self.escrow.claim_referral(ctx.sender, token, amount)?;
        let mut receipt = Receipt::default();
        receipt.push(Transfer::new(self.config.custody(), ctx.sender, amount, token));
        debug!(referrer = %ctx.sender, %token, amount, "claim referral");
        Ok(receipt)
    }

    pub(super) fn apply_claim_developer(
        &mut self,
        ctx: CallContext,
        token: TokenRef,
        amount: u128,
    ) -> Result<Receipt> {
        self.require_developer(ctx.sender)?;
        self.escrow.claim_developer(token, amount)?;
        let mut receipt = Receipt::default();
        receipt.push(Transfer::new(self.config.custody(), ctx.sender, amount, token));
        debug!(%token, amount, "claim developer");
        Ok(receipt)
    }

    pub(super) fn apply_transfer(
        &mut self,
        ctx: CallContext,
        batches: &[TransferBatch],
    ) -> Result<Receipt> {
        for leg in batches.iter().flat_map(|b| &b.txs) {
            self.pool(leg.pool_id)?;
        }
        self.ledger.transfer(ctx.sender, batches)?;
        debug!(sender = %ctx.sender, batches = batches.len(), "share transfer");
        Ok(Receipt::default())
    }

    pub(super) fn apply_update_operators(
        &mut self,
        ctx: CallContext,
        updates: &[OperatorUpdate],
    ) -> Result<Receipt> {
        for update in updates {
            self.pool(update.param().pool_id)?;
        }
        self.ledger.update_operators(ctx.sender, updates)?;
        debug!(owner = %ctx.sender, updates = updates.len(), "update operators");
        Ok(Receipt::default())
    }
}
