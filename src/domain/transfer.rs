//! Outbound and inbound token movements requested by an engine call.

use super::{Address, TokenRef};

/// One underlying-asset transfer the host must perform.
///
/// Engine calls never move tokens themselves; they return an ordered list
/// of `Transfer`s which [`Dex::execute`](crate::engine::Dex::execute)
/// hands to the [`TokenTransfer`](crate::traits::TokenTransfer)
/// capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transfer {
    /// Debited account.
    pub from: Address,
    /// Credited account.
    pub to: Address,
    /// Raw token amount.
    pub amount: u128,
    /// Asset being moved.
    pub token: TokenRef,
}

impl Transfer {
    /// Creates a transfer record.
    #[must_use]
    pub const fn new(from: Address, to: Address, amount: u128, token: TokenRef) -> Self {
        Self {
            from,
            to,
            amount,
            token,
        }
    }
}
