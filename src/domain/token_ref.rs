//! References to the underlying assets a pool holds.

use core::fmt;

use super::Address;

/// A pool asset, tagged by the transfer standard that moves it.
///
/// The tag matters only at the transfer boundary; invariant math never
/// looks at it.
///
/// | Variant | Standard |
/// |---------|----------|
/// | [`Native`](Self::Native) | multi-asset contract, addressed by `(contract, id)` |
/// | [`Simple`](Self::Simple) | single-asset contract |
///
/// # Examples
///
/// ```
/// use hydra_stableswap::domain::{Address, TokenRef};
///
/// let contract = Address::from_bytes([7u8; 32]);
/// let multi = TokenRef::native(contract, 3);
/// let single = TokenRef::simple(contract);
///
/// assert_eq!(multi.token_id(), Some(3));
/// assert_eq!(single.token_id(), None);
/// assert_ne!(multi, single);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TokenRef {
    /// Token living inside a multi-asset contract.
    Native {
        /// Contract holding the token ledger.
        contract: Address,
        /// Token id inside that contract.
        id: u64,
    },
    /// Token that owns its whole contract.
    Simple(Address),
}

impl TokenRef {
    /// Multi-asset token `id` in `contract`.
    #[must_use]
    pub const fn native(contract: Address, id: u64) -> Self {
        Self::Native { contract, id }
    }

    /// Single-asset token at `contract`.
    #[must_use]
    pub const fn simple(contract: Address) -> Self {
        Self::Simple(contract)
    }

    /// The contract that must be called to move this token.
    #[must_use]
    pub const fn contract(&self) -> Address {
        match self {
            Self::Native { contract, .. } => *contract,
            Self::Simple(contract) => *contract,
        }
    }

    /// Token id for multi-asset tokens.
    #[must_use]
    pub const fn token_id(&self) -> Option<u64> {
        match self {
            Self::Native { id, .. } => Some(*id),
            Self::Simple(_) => None,
        }
    }

    /// Returns `true` for [`TokenRef::Native`].
    #[must_use]
    pub const fn is_native(&self) -> bool {
        matches!(self, Self::Native { .. })
    }
}

impl fmt::Display for TokenRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native { contract, id } => write!(f, "{contract}#{id}"),
            Self::Simple(contract) => write!(f, "{contract}"),
        }
    }
}
