//! A serialisable envelope for every engine entry point.

use super::{
    CallContext, Dex, DivestImbalancedParams, DivestOneCoinParams, DivestParams, InvestParams,
    Receipt, StakeAction, SwapParams,
};
use crate::config::PoolConfig;
use crate::domain::{FeeConfig, FeeRate, PoolId, TokenRef};
use crate::error::Result;
use crate::ledger::{OperatorUpdate, TransferBatch};

/// One engine call, as submitted to [`Dex::execute`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Call {
    /// [`Dex::add_pool`].
    AddPool(PoolConfig),
    /// [`Dex::swap`].
    Swap(SwapParams),
    /// [`Dex::invest`].
    Invest(InvestParams),
    /// [`Dex::divest`].
    Divest(DivestParams),
    /// [`Dex::divest_imbalanced`].
    DivestImbalanced(DivestImbalancedParams),
    /// [`Dex::divest_one_coin`].
    DivestOneCoin(DivestOneCoinParams),
    /// [`Dex::stake`].
    Stake(StakeAction),
    /// [`Dex::claim_referral`].
    ClaimReferral {
        /// Token to claim.
        token: TokenRef,
        /// Raw amount to claim.
        amount: u128,
    },
    /// [`Dex::claim_developer`].
    ClaimDeveloper {
        /// Token to claim.
        token: TokenRef,
        /// Raw amount to claim.
        amount: u128,
    },
    /// [`Dex::transfer`].
    Transfer(Vec<TransferBatch>),
    /// [`Dex::update_operators`].
    UpdateOperators(Vec<OperatorUpdate>),
    /// [`Dex::set_fees`].
    SetFees {
        /// Target pool.
        pool_id: PoolId,
        /// New lp, staker and referral fractions.
        fees: FeeConfig,
    },
    /// [`Dex::set_dev_fee`].
    SetDevFee(FeeRate),
    /// [`Dex::ramp_a`].
    RampA {
        /// Target pool.
        pool_id: PoolId,
        /// Amplification at the end of the ramp.
        future_a: u128,
        /// Time the ramp ends.
        future_time: u64,
    },
    /// [`Dex::stop_ramp_a`].
    StopRampA {
        /// Target pool.
        pool_id: PoolId,
    },
}

impl Dex {
    pub(super) fn dispatch(&mut self, call: &Call, ctx: CallContext) -> Result<Receipt> {
        match call {
            Call::AddPool(config) => self.apply_add_pool(ctx, config),
            Call::Swap(params) => self.apply_swap(ctx, params),
            Call::Invest(params) => self.apply_invest(ctx, params),
            Call::Divest(params) => self.apply_divest(ctx, params),
            Call::DivestImbalanced(params) => self.apply_divest_imbalanced(ctx, params),
            Call::DivestOneCoin(params) => self.apply_divest_one_coin(ctx, params),
            Call::Stake(action) => self.apply_stake(ctx, *action),
            Call::ClaimReferral { token, amount } => self.apply_claim_referral(ctx, *token, *amount),
            Call::ClaimDeveloper { token, amount } => {
                self.apply_claim_developer(ctx, *token, *amount)
            }
            Call::Transfer(batches) => self.apply_transfer(ctx, batches),
            Call::UpdateOperators(updates) => self.apply_update_operators(ctx, updates),
            Call::SetFees { pool_id, fees } => self.apply_set_fees(ctx, *pool_id, *fees),
            Call::SetDevFee(fee) => self.apply_set_dev_fee(ctx, *fee),
            Call::RampA {
                pool_id,
                future_a,
                future_time,
            } => self.apply_ramp_a(ctx, *pool_id, *future_a, *future_time),
            Call::StopRampA { pool_id } => self.apply_stop_ramp_a(ctx, *pool_id),
        }
    }
}
