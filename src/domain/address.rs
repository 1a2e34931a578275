//! Account identity used for owners, operators, referrers and custody.

use core::fmt;

/// An opaque 32-byte account identity.
///
/// The host authenticates callers and hands the engine the verified
/// address, so every 32-byte sequence is a valid `Address`.
///
/// # Examples
///
/// ```
/// use hydra_stableswap::domain::Address;
///
/// let alice = Address::from_bytes([1u8; 32]);
/// assert_eq!(alice.as_bytes(), [1u8; 32]);
/// assert_ne!(alice, Address::zero());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Address([u8; 32]);

impl Address {
    /// Creates an `Address` from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the underlying 32-byte representation.
    #[must_use]
    pub const fn as_bytes(&self) -> [u8; 32] {
        self.0
    }

    /// The all-zero address.
    #[must_use]
    pub const fn zero() -> Self {
        Self([0u8; 32])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // First and last four bytes are enough to tell accounts apart in logs.
        for b in &self.0[..4] {
            write!(f, "{b:02x}")?;
        }
        f.write_str("..")?;
        for b in &self.0[28..] {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}
