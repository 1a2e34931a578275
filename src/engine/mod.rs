//! The multi-pool engine.
//!
//! [`Dex`] owns every pool, the share ledger and the fee escrow.  Each
//! public operation is one atomic transition: it either commits and
//! returns a [`Receipt`] listing the token transfers the host must
//! execute, or fails and leaves the state untouched.
//!
//! # Driving the engine
//!
//! - Call the operation methods directly and settle
//!   [`Receipt::transfers`] yourself, or
//! - wrap the operation in a [`Call`] and hand it to
//!   [`Dex::execute`] together with a
//!   [`TokenTransfer`](crate::traits::TokenTransfer) implementation; a
//!   failed transfer rolls the whole call back.

mod admin;
mod call;
mod context;
mod operations;
mod params;
mod receipt;
mod views;

use std::collections::BTreeMap;

use tracing::warn;

pub use call::Call;
pub use context::CallContext;
pub use params::{
    DivestImbalancedParams, DivestOneCoinParams, DivestParams, InvestParams, StakeAction,
    SwapParams,
};
pub use receipt::Receipt;

use crate::config::DexConfig;
use crate::domain::{Address, PoolId, TokenRef};
use crate::error::{AmmError, Result};
use crate::escrow::Escrow;
use crate::ledger::ShareLedger;
use crate::pool::{FeeDistributor, StablePool};
use crate::traits::TokenTransfer;

/// StableSwap settlement engine state.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dex {
    config: DexConfig,
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_pairs"))]
    pools: BTreeMap<PoolId, StablePool>,
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_pairs"))]
    pool_to_id: BTreeMap<Vec<TokenRef>, PoolId>,
    next_pool_id: PoolId,
    ledger: ShareLedger,
    escrow: Escrow,
}

impl Dex {
    /// Creates an engine without pools.
    ///
    /// # Errors
    ///
    /// Propagates [`DexConfig::validate`] failures.
    pub fn new(config: DexConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            pools: BTreeMap::new(),
            pool_to_id: BTreeMap::new(),
            next_pool_id: PoolId::new(0),
            ledger: ShareLedger::new(),
            escrow: Escrow::new(),
        })
    }

    /// Engine configuration.
    #[must_use]
    pub const fn config(&self) -> &DexConfig {
        &self.config
    }

    /// Share ledger.
    #[must_use]
    pub const fn ledger(&self) -> &ShareLedger {
        &self.ledger
    }

    /// Referral and developer escrow.
    #[must_use]
    pub const fn escrow(&self) -> &Escrow {
        &self.escrow
    }

    /// Number of pools ever created.
    #[must_use]
    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    /// Pool `pool_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::PoolNotFound`] for an unknown id.
    pub fn pool(&self, pool_id: PoolId) -> Result<&StablePool> {
        self.pools.get(&pool_id).ok_or(AmmError::PoolNotFound)
    }

    fn pool_mut(&mut self, pool_id: PoolId) -> Result<&mut StablePool> {
        self.pools.get_mut(&pool_id).ok_or(AmmError::PoolNotFound)
    }

    fn fee_distributor(&self, pool_id: PoolId) -> Result<FeeDistributor> {
        Ok(FeeDistributor::new(
            self.pool(pool_id)?.fees(),
            self.config.dev_fee(),
        ))
    }

    fn require_admin(&self, sender: Address) -> Result<()> {
        if sender != self.config.admin() {
            return Err(AmmError::Unauthorized("admin only"));
        }
        Ok(())
    }

    fn require_developer(&self, sender: Address) -> Result<()> {
        if sender != self.config.developer() {
            return Err(AmmError::Unauthorized("developer only"));
        }
        Ok(())
    }

    /// Runs `f` against `self`, restoring the prior state if it fails.
    fn atomically<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let snapshot = self.clone();
        let result = f(self);
        if result.is_err() {
            *self = snapshot;
        }
        result
    }

    /// Applies `call` and dispatches every resulting transfer through
    /// `transfers`, in order.
    ///
    /// # Errors
    ///
    /// Any operation error, or the first transfer error.  The engine
    /// state is restored in both cases; transfers already dispatched
    /// belong to the host's own transaction and are unwound by it.
    pub fn execute<T: TokenTransfer + ?Sized>(
        &mut self,
        call: &Call,
        ctx: CallContext,
        transfers: &mut T,
    ) -> Result<Receipt> {
        self.atomically(|dex| {
            let receipt = dex.dispatch(call, ctx)?;
            for transfer in receipt.transfers() {
                if let Err(err) = transfers.transfer(transfer) {
                    warn!(
                        error = %err,
                        token = %transfer.token,
                        amount = transfer.amount,
                        "token transfer failed; rolling back call"
                    );
                    return Err(err);
                }
            }
            Ok(receipt)
        })
    }
}

fn check_deadline(now: u64, deadline: u64) -> Result<()> {
    if now > deadline {
        return Err(AmmError::Expired);
    }
    Ok(())
}

/// Expands an index → amount map into one entry per pool token.
fn dense_amounts(amounts: &BTreeMap<usize, u128>, width: usize) -> Result<Vec<u128>> {
    let mut dense = vec![0; width];
    for (index, amount) in amounts {
        let slot = dense
            .get_mut(*index)
            .ok_or(AmmError::InvalidToken("token index outside the pool"))?;
        *slot = *amount;
    }
    Ok(dense)
}
