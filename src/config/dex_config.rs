//! Engine-wide identities and the developer fee.

use crate::domain::{Address, FeeRate};
use crate::error::{AmmError, Result};

/// Identities and global settings of a [`Dex`](crate::engine::Dex).
///
/// - `admin` may create pools, change pool fees and ramp `A`.
/// - `developer` may change the developer fee and claim developer escrow.
/// - `custody` is the engine's own account: every inbound transfer is
///   credited to it and every payout is debited from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DexConfig {
    admin: Address,
    developer: Address,
    custody: Address,
    dev_fee: FeeRate,
}

impl DexConfig {
    /// Creates a validated engine configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidFee`] if `dev_fee` exceeds 100%.
    pub fn new(admin: Address, developer: Address, custody: Address, dev_fee: FeeRate) -> Result<Self> {
        let config = Self {
            admin,
            developer,
            custody,
            dev_fee,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates all configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidFee`] if `dev_fee` exceeds 100%.
    pub fn validate(&self) -> Result<()> {
        if !self.dev_fee.is_valid() {
            return Err(AmmError::InvalidFee("developer fee exceeds 100%"));
        }
        Ok(())
    }

    /// Pool administrator.
    #[must_use]
    pub const fn admin(&self) -> Address {
        self.admin
    }

    /// Developer identity.
    #[must_use]
    pub const fn developer(&self) -> Address {
        self.developer
    }

    /// The engine's custody account.
    #[must_use]
    pub const fn custody(&self) -> Address {
        self.custody
    }

    /// Developer fee fraction.
    #[must_use]
    pub const fn dev_fee(&self) -> FeeRate {
        self.dev_fee
    }

    pub(crate) fn set_dev_fee(&mut self, fee: FeeRate) {
        self.dev_fee = fee;
    }
}
