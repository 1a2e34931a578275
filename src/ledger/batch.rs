//! Batched share transfers and operator approvals.

use crate::domain::{Address, PoolId};

/// One destination of a [`TransferBatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransferLeg {
    /// Recipient.
    pub to: Address,
    /// Pool whose shares move.
    pub pool_id: PoolId,
    /// Share amount; zero is accepted.
    pub amount: u128,
}

impl TransferLeg {
    /// Creates a leg.
    #[must_use]
    pub const fn new(to: Address, pool_id: PoolId, amount: u128) -> Self {
        Self {
            to,
            pool_id,
            amount,
        }
    }
}

/// Transfers out of a single `from` account.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransferBatch {
    /// Owner the shares are debited from.
    pub from: Address,
    /// Destinations, applied in order.
    pub txs: Vec<TransferLeg>,
}

impl TransferBatch {
    /// Creates a batch.
    #[must_use]
    pub fn new(from: Address, txs: Vec<TransferLeg>) -> Self {
        Self { from, txs }
    }
}

/// An `(owner, operator, pool)` approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OperatorParam {
    /// Account granting the approval.
    pub owner: Address,
    /// Account allowed to move the owner's shares.
    pub operator: Address,
    /// Pool the approval covers.
    pub pool_id: PoolId,
}

impl OperatorParam {
    /// Creates an approval key.
    #[must_use]
    pub const fn new(owner: Address, operator: Address, pool_id: PoolId) -> Self {
        Self {
            owner,
            operator,
            pool_id,
        }
    }
}

/// Grants or revokes an approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OperatorUpdate {
    /// Grant.
    Add(OperatorParam),
    /// Revoke.
    Remove(OperatorParam),
}

impl OperatorUpdate {
    /// The approval this update targets.
    #[must_use]
    pub const fn param(&self) -> &OperatorParam {
        match self {
            Self::Add(p) | Self::Remove(p) => p,
        }
    }
}
