//! Parameters of the user-facing calls.
//!
//! Each struct has a constructor for its required fields and
//! `with_*` builders for the optional receiver and referral.

use std::collections::BTreeMap;

use crate::domain::{Address, PoolId};

/// Exchange `amount` of token `idx_from` for token `idx_to`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SwapParams {
    /// Target pool.
    pub pool_id: PoolId,
    /// Index of the token paid in.
    pub idx_from: usize,
    /// Index of the token paid out.
    pub idx_to: usize,
    /// Raw input amount.
    pub amount: u128,
    /// Smallest acceptable net output.
    pub min_amount_out: u128,
    /// Last accepted `now`.
    pub deadline: u64,
    /// Recipient of the output; the sender when unset.
    pub receiver: Option<Address>,
    /// Referrer credited with the referral fee.
    pub referral: Option<Address>,
}

impl SwapParams {
    /// Swap without receiver or referral.
    #[must_use]
    pub const fn new(
        pool_id: PoolId,
        idx_from: usize,
        idx_to: usize,
        amount: u128,
        min_amount_out: u128,
        deadline: u64,
    ) -> Self {
        Self {
            pool_id,
            idx_from,
            idx_to,
            amount,
            min_amount_out,
            deadline,
            receiver: None,
            referral: None,
        }
    }

    /// Sends the output to `receiver`.
    #[must_use]
    pub fn with_receiver(mut self, receiver: Address) -> Self {
        self.receiver = Some(receiver);
        self
    }

    /// Credits the referral fee to `referral`.
    #[must_use]
    pub fn with_referral(mut self, referral: Address) -> Self {
        self.referral = Some(referral);
        self
    }
}

/// Deposit any nonempty subset of a pool's tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InvestParams {
    /// Target pool.
    pub pool_id: PoolId,
    /// Smallest acceptable number of minted shares.
    pub min_shares: u128,
    /// Token index → raw amount.
    pub in_amounts: BTreeMap<usize, u128>,
    /// Last accepted `now`.
    pub deadline: u64,
    /// Recipient of the output; the sender when unset.
    pub receiver: Option<Address>,
    /// Referrer credited with the referral fee.
    pub referral: Option<Address>,
}

impl InvestParams {
    /// Call without receiver or referral.
    #[must_use]
    pub fn new(
        pool_id: PoolId,
        in_amounts: BTreeMap<usize, u128>,
        min_shares: u128,
        deadline: u64,
    ) -> Self {
        Self {
            pool_id,
            min_shares,
            in_amounts,
            deadline,
            receiver: None,
            referral: None,
        }
    }

    /// Sends the output to `receiver`.
    #[must_use]
    pub fn with_receiver(mut self, receiver: Address) -> Self {
        self.receiver = Some(receiver);
        self
    }

    /// Credits the referral fee to `referral`.
    #[must_use]
    pub fn with_referral(mut self, referral: Address) -> Self {
        self.referral = Some(referral);
        self
    }
}

/// Burn `shares` for a proportional slice of every reserve.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DivestParams {
    /// Target pool.
    pub pool_id: PoolId,
    /// Token index → minimum raw output.
    pub min_amounts_out: BTreeMap<usize, u128>,
    /// Liquid shares to burn.
    pub shares: u128,
    /// Last accepted `now`.
    pub deadline: u64,
    /// Recipient of the output; the sender when unset.
    pub receiver: Option<Address>,
}

impl DivestParams {
    /// Call without receiver.
    #[must_use]
    pub fn new(
        pool_id: PoolId,
        shares: u128,
        min_amounts_out: BTreeMap<usize, u128>,
        deadline: u64,
    ) -> Self {
        Self {
            pool_id,
            min_amounts_out,
            shares,
            deadline,
            receiver: None,
        }
    }

    /// Sends the output to `receiver`.
    #[must_use]
    pub fn with_receiver(mut self, receiver: Address) -> Self {
        self.receiver = Some(receiver);
        self
    }
}

/// Withdraw exact amounts, burning at most `max_shares`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DivestImbalancedParams {
    /// Target pool.
    pub pool_id: PoolId,
    /// Token index → raw amount to withdraw.
    pub amounts_out: BTreeMap<usize, u128>,
    /// Largest acceptable number of burned shares.
    pub max_shares: u128,
    /// Last accepted `now`.
    pub deadline: u64,
    /// Recipient of the output; the sender when unset.
    pub receiver: Option<Address>,
    /// Referrer credited with the referral fee.
    pub referral: Option<Address>,
}

impl DivestImbalancedParams {
    /// Call without receiver or referral.
    #[must_use]
    pub fn new(
        pool_id: PoolId,
        amounts_out: BTreeMap<usize, u128>,
        max_shares: u128,
        deadline: u64,
    ) -> Self {
        Self {
            pool_id,
            amounts_out,
            max_shares,
            deadline,
            receiver: None,
            referral: None,
        }
    }

    /// Sends the output to `receiver`.
    #[must_use]
    pub fn with_receiver(mut self, receiver: Address) -> Self {
        self.receiver = Some(receiver);
        self
    }

    /// Credits the referral fee to `referral`.
    #[must_use]
    pub fn with_referral(mut self, referral: Address) -> Self {
        self.referral = Some(referral);
        self
    }
}

/// Burn `shares` for token `token_index` alone.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DivestOneCoinParams {
    /// Target pool.
    pub pool_id: PoolId,
    /// Liquid shares to burn.
    pub shares: u128,
    /// Index of the token paid out.
    pub token_index: usize,
    /// Smallest acceptable net output.
    pub min_amount_out: u128,
    /// Last accepted `now`.
    pub deadline: u64,
    /// Recipient of the output; the sender when unset.
    pub receiver: Option<Address>,
    /// Referrer credited with the referral fee.
    pub referral: Option<Address>,
}

impl DivestOneCoinParams {
    /// Call without receiver or referral.
    #[must_use]
    pub const fn new(
        pool_id: PoolId,
        shares: u128,
        token_index: usize,
        min_amount_out: u128,
        deadline: u64,
    ) -> Self {
        Self {
            pool_id,
            shares,
            token_index,
            min_amount_out,
            deadline,
            receiver: None,
            referral: None,
        }
    }

    /// Sends the output to `receiver`.
    #[must_use]
    pub fn with_receiver(mut self, receiver: Address) -> Self {
        self.receiver = Some(receiver);
        self
    }

    /// Credits the referral fee to `referral`.
    #[must_use]
    pub fn with_referral(mut self, referral: Address) -> Self {
        self.referral = Some(referral);
        self
    }
}

/// Move shares between the liquid and frozen balances.
///
/// An amount of zero only settles and pays out rewards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StakeAction {
    /// Freeze `amount` liquid shares of `pool_id`.
    Add {
        /// Target pool.
        pool_id: PoolId,
        /// Shares to freeze.
        amount: u128,
    },
    /// Unfreeze `amount` staked shares of `pool_id`.
    Remove {
        /// Target pool.
        pool_id: PoolId,
        /// Shares to unfreeze.
        amount: u128,
    },
}

impl StakeAction {
    /// Pool the action targets.
    #[must_use]
    pub const fn pool_id(&self) -> PoolId {
        match self {
            Self::Add { pool_id, .. } | Self::Remove { pool_id, .. } => *pool_id,
        }
    }
}
