//! Balances, frozen balances and operator approvals for pool shares.

use std::collections::{BTreeMap, BTreeSet};

use super::batch::{OperatorParam, OperatorUpdate, TransferBatch};
use crate::domain::{Address, PoolId};
use crate::error::{AmmError, Result};
use crate::math::CheckedArithmetic;
use crate::pool::RewardPosition;

/// One holder's position in one pool.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LedgerEntry {
    balance: u128,
    frozen_balance: u128,
    rewards: RewardPosition,
}

impl LedgerEntry {
    /// Liquid, transferable shares.
    #[must_use]
    pub const fn balance(&self) -> u128 {
        self.balance
    }

    /// Staked shares.
    #[must_use]
    pub const fn frozen_balance(&self) -> u128 {
        self.frozen_balance
    }

    /// Settled staking rewards.
    #[must_use]
    pub const fn rewards(&self) -> &RewardPosition {
        &self.rewards
    }

    pub(crate) fn rewards_mut(&mut self) -> &mut RewardPosition {
        &mut self.rewards
    }

    /// Moves `amount` from the liquid to the frozen balance.
    pub(crate) fn freeze(&mut self, amount: u128) -> Result<()> {
        self.balance = self
            .balance
            .checked_sub(amount)
            .ok_or(AmmError::InsufficientBalance)?;
        self.frozen_balance = self.frozen_balance.safe_add(&amount)?;
        Ok(())
    }

    /// Moves `amount` from the frozen back to the liquid balance.
    pub(crate) fn unfreeze(&mut self, amount: u128) -> Result<()> {
        self.frozen_balance = self
            .frozen_balance
            .checked_sub(amount)
            .ok_or(AmmError::InsufficientBalance)?;
        self.balance = self.balance.safe_add(&amount)?;
        Ok(())
    }

    /// No shares and nothing left to harvest. The reward checkpoint is
    /// irrelevant once nothing is frozen.
    fn is_empty(&self) -> bool {
        self.balance == 0 && self.frozen_balance == 0 && !self.rewards.has_earnings()
    }
}

/// Share accounting for every pool of the engine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShareLedger {
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_pairs"))]
    entries: BTreeMap<(Address, PoolId), LedgerEntry>,
    operators: BTreeSet<OperatorParam>,
}

impl ShareLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Position of `owner` in `pool_id`, if any.
    #[must_use]
    pub fn entry(&self, owner: Address, pool_id: PoolId) -> Option<&LedgerEntry> {
        self.entries.get(&(owner, pool_id))
    }

    /// Liquid shares of `owner` in `pool_id`.
    #[must_use]
    pub fn balance(&self, owner: Address, pool_id: PoolId) -> u128 {
        self.entry(owner, pool_id).map_or(0, LedgerEntry::balance)
    }

    /// Staked shares of `owner` in `pool_id`.
    #[must_use]
    pub fn frozen_balance(&self, owner: Address, pool_id: PoolId) -> u128 {
        self.entry(owner, pool_id)
            .map_or(0, LedgerEntry::frozen_balance)
    }

    pub(crate) fn entry_mut(&mut self, owner: Address, pool_id: PoolId) -> &mut LedgerEntry {
        self.entries.entry((owner, pool_id)).or_default()
    }

    /// Drops the position of `owner` in `pool_id` if it holds nothing.
    pub(crate) fn prune(&mut self, owner: Address, pool_id: PoolId) {
        let key = (owner, pool_id);
        if self.entries.get(&key).is_some_and(LedgerEntry::is_empty) {
            self.entries.remove(&key);
        }
    }

    /// Credits `amount` liquid shares.
    pub(crate) fn mint(&mut self, owner: Address, pool_id: PoolId, amount: u128) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        let entry = self.entry_mut(owner, pool_id);
        entry.balance = entry.balance.safe_add(&amount)?;
        Ok(())
    }

    /// Debits `amount` liquid shares.
    pub(crate) fn burn(&mut self, owner: Address, pool_id: PoolId, amount: u128) -> Result<()> {
        let key = (owner, pool_id);
        let entry = self
            .entries
            .get_mut(&key)
            .ok_or(AmmError::InsufficientBalance)?;
        entry.balance = entry
            .balance
            .checked_sub(amount)
            .ok_or(AmmError::InsufficientBalance)?;
        if entry.is_empty() {
            self.entries.remove(&key);
        }
        Ok(())
    }

    /// Whether `operator` may move `owner`'s shares of `pool_id`.
    #[must_use]
    pub fn is_operator(&self, owner: Address, operator: Address, pool_id: PoolId) -> bool {
        self.operators
            .contains(&OperatorParam::new(owner, operator, pool_id))
    }

    /// Applies approval updates in order.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Unauthorized`] if any update names an owner
    /// other than `sender`; no update is applied in that case.
    pub fn update_operators(&mut self, sender: Address, updates: &[OperatorUpdate]) -> Result<()> {
        if updates.iter().any(|u| u.param().owner != sender) {
            return Err(AmmError::Unauthorized("only the owner may change operators"));
        }
        for update in updates {
            match update {
                OperatorUpdate::Add(p) => {
                    self.operators.insert(*p);
                }
                OperatorUpdate::Remove(p) => {
                    self.operators.remove(p);
                }
            }
        }
        Ok(())
    }

    /// Applies share transfers.
    ///
    /// Legs are validated in order against the balances left by the
    /// legs before them; nothing is written unless every leg succeeds.
    /// Pool existence is checked by the caller.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Unauthorized`] if `sender` is neither the `from`
    ///   account nor its operator for the leg's pool.
    /// - [`AmmError::InsufficientBalance`] if a leg overdraws `from`.
    pub fn transfer(&mut self, sender: Address, batches: &[TransferBatch]) -> Result<()> {
        let mut staged: BTreeMap<(Address, PoolId), u128> = BTreeMap::new();
        for batch in batches {
            for leg in &batch.txs {
                if batch.from != sender && !self.is_operator(batch.from, sender, leg.pool_id) {
                    return Err(AmmError::Unauthorized("sender is not owner or operator"));
                }
                let from_key = (batch.from, leg.pool_id);
                let from_balance = match staged.get(&from_key) {
                    Some(b) => *b,
                    None => self.balance(batch.from, leg.pool_id),
                };
                let debited = from_balance
                    .checked_sub(leg.amount)
                    .ok_or(AmmError::InsufficientBalance)?;
                staged.insert(from_key, debited);

                let to_key = (leg.to, leg.pool_id);
                let to_balance = match staged.get(&to_key) {
                    Some(b) => *b,
                    None => self.balance(leg.to, leg.pool_id),
                };
                staged.insert(to_key, to_balance.safe_add(&leg.amount)?);
            }
        }

        for ((owner, pool_id), balance) in staged {
            let entry = self.entry_mut(owner, pool_id);
            entry.balance = balance;
            if entry.is_empty() {
                self.entries.remove(&(owner, pool_id));
            }
        }
        Ok(())
    }
}
