//! Fee balances held by the custody account on behalf of referrers and
//! the developer.

use std::collections::BTreeMap;

use crate::domain::{Address, TokenRef};
use crate::error::{AmmError, Result};
use crate::math::CheckedArithmetic;

/// Claimable referral and developer fees.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Escrow {
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_pairs"))]
    referral: BTreeMap<(Address, TokenRef), u128>,
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_pairs"))]
    developer: BTreeMap<TokenRef, u128>,
}

impl Escrow {
    /// Creates an empty escrow.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Unclaimed referral fees of `referrer` in `token`.
    #[must_use]
    pub fn referral_balance(&self, referrer: Address, token: TokenRef) -> u128 {
        self.referral.get(&(referrer, token)).copied().unwrap_or(0)
    }

    /// Unclaimed developer fees in `token`.
    #[must_use]
    pub fn developer_balance(&self, token: TokenRef) -> u128 {
        self.developer.get(&token).copied().unwrap_or(0)
    }

    pub(crate) fn credit_referral(
        &mut self,
        referrer: Address,
        token: TokenRef,
        amount: u128,
    ) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        let slot = self.referral.entry((referrer, token)).or_insert(0);
        *slot = slot.safe_add(&amount)?;
        Ok(())
    }

    pub(crate) fn credit_developer(&mut self, token: TokenRef, amount: u128) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        let slot = self.developer.entry(token).or_insert(0);
        *slot = slot.safe_add(&amount)?;
        Ok(())
    }

    /// Debits a referral claim.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidQuantity`] if `amount` is zero.
    /// - [`AmmError::InsufficientEscrow`] if `amount` exceeds the balance.
    pub(crate) fn claim_referral(
        &mut self,
        referrer: Address,
        token: TokenRef,
        amount: u128,
    ) -> Result<()> {
        debit(&mut self.referral, (referrer, token), amount)
    }

    /// Debits a developer claim.
    ///
    /// # Errors
    ///
    /// See [`claim_referral`](Self::claim_referral).
    pub(crate) fn claim_developer(&mut self, token: TokenRef, amount: u128) -> Result<()> {
        debit(&mut self.developer, token, amount)
    }
}

fn debit<K: Ord>(map: &mut BTreeMap<K, u128>, key: K, amount: u128) -> Result<()> {
    if amount == 0 {
        return Err(AmmError::InvalidQuantity("claim amount must be non-zero"));
    }
    let balance = map.get(&key).copied().unwrap_or(0);
    let rest = balance
        .checked_sub(amount)
        .ok_or(AmmError::InsufficientEscrow)?;
    if rest == 0 {
        map.remove(&key);
    } else {
        map.insert(key, rest);
    }
    Ok(())
}
