//! What a successful call asks the host to settle.

use crate::domain::{PoolId, Transfer};

/// Outcome of a committed call.
///
/// `transfers` are in the order the host must execute them; the engine
/// itself dispatches them when driven through
/// [`Dex::execute`](super::Dex::execute).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Receipt {
    transfers: Vec<Transfer>,
    pool_id: Option<PoolId>,
    minted: u128,
    burned: u128,
    amount_out: u128,
}

impl Receipt {
    pub(crate) fn for_pool(pool_id: PoolId) -> Self {
        Self {
            pool_id: Some(pool_id),
            ..Self::default()
        }
    }

    pub(crate) fn push(&mut self, transfer: Transfer) {
        self.transfers.push(transfer);
    }

    /// Adds `transfer` unless it moves nothing.
    pub(crate) fn push_nonzero(&mut self, transfer: Transfer) {
        if transfer.amount > 0 {
            self.transfers.push(transfer);
        }
    }

    pub(crate) fn set_minted(&mut self, minted: u128) {
        self.minted = minted;
    }

    pub(crate) fn set_burned(&mut self, burned: u128) {
        self.burned = burned;
    }

    pub(crate) fn set_amount_out(&mut self, amount_out: u128) {
        self.amount_out = amount_out;
    }

    /// Token transfers, in execution order.
    #[must_use]
    pub fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }

    /// Pool the call acted on, if any.
    #[must_use]
    pub const fn pool_id(&self) -> Option<PoolId> {
        self.pool_id
    }

    /// Shares minted to the receiver.
    #[must_use]
    pub const fn minted(&self) -> u128 {
        self.minted
    }

    /// Shares burned from the caller.
    #[must_use]
    pub const fn burned(&self) -> u128 {
        self.burned
    }

    /// Primary output amount of a swap or single-coin withdrawal.
    #[must_use]
    pub const fn amount_out(&self) -> u128 {
        self.amount_out
    }
}
