//! Blueprint for creating a pool with `add_pool`.

use crate::domain::{FeeConfig, TokenInfo, TokenRef, PRECISION};
use crate::error::{AmmError, Result};
use crate::pool::MAX_A;

/// Fewest tokens a pool may hold.
pub const MIN_TOKENS: usize = 2;

/// Most tokens a pool may hold.
pub const MAX_TOKENS: usize = 4;

/// Parameters of a new StableSwap pool.
///
/// Token order defines the indices used by every later call.  The
/// reserves inside `token_info` are the initial deposit, transferred in
/// from the admin who receives the first shares.
///
/// # Validation
///
/// - 2–4 distinct tokens, one [`TokenInfo`] per token.
/// - Every rate and precision multiplier non-zero.
/// - Every initial reserve non-zero.
/// - `1 <= amplification <= MAX_A`.
/// - Pool fee fractions sum to at most 100%.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolConfig {
    tokens: Vec<TokenRef>,
    token_info: Vec<TokenInfo>,
    amplification: u128,
    #[cfg_attr(feature = "serde", serde(default))]
    fees: FeeConfig,
}

impl PoolConfig {
    /// Creates a validated pool blueprint.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidTokenSet`] for duplicate tokens or a count
    ///   outside `2..=4`.
    /// - [`AmmError::InvalidConfiguration`] for mismatched token info, zero
    ///   rates or multipliers, zero reserves, or `A` out of range.
    /// - [`AmmError::InvalidFee`] if the fee fractions exceed 100%.
    pub fn new(
        tokens: Vec<TokenRef>,
        token_info: Vec<TokenInfo>,
        amplification: u128,
        fees: FeeConfig,
    ) -> Result<Self> {
        let config = Self {
            tokens,
            token_info,
            amplification,
            fees,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates all configuration invariants.
    ///
    /// # Errors
    ///
    /// See [`PoolConfig::new`].
    pub fn validate(&self) -> Result<()> {
        validate_token_set(&self.tokens)?;
        if self.token_info.len() != self.tokens.len() {
            return Err(AmmError::InvalidConfiguration(
                "token_info length must match tokens",
            ));
        }
        for info in &self.token_info {
            if info.rate() == 0 || info.precision_multiplier() == 0 {
                return Err(AmmError::InvalidConfiguration(
                    "rate and precision multiplier must be non-zero",
                ));
            }
            if info.reserves() == 0 {
                return Err(AmmError::InvalidConfiguration(
                    "initial reserves must be non-zero",
                ));
            }
        }
        if self.amplification == 0 || self.amplification > MAX_A {
            return Err(AmmError::InvalidConfiguration(
                "amplification must be in 1..=MAX_A",
            ));
        }
        if self.fees.total() > PRECISION {
            return Err(AmmError::InvalidFee("pool fees exceed 100%"));
        }
        Ok(())
    }

    /// Ordered pool tokens.
    #[must_use]
    pub fn tokens(&self) -> &[TokenRef] {
        &self.tokens
    }

    /// Per-token rate, precision multiplier and initial reserve.
    #[must_use]
    pub fn token_info(&self) -> &[TokenInfo] {
        &self.token_info
    }

    /// Initial amplification coefficient.
    #[must_use]
    pub const fn amplification(&self) -> u128 {
        self.amplification
    }

    /// Initial fee schedule.
    #[must_use]
    pub const fn fees(&self) -> FeeConfig {
        self.fees
    }

    /// Initial reserves, in token order.
    #[must_use]
    pub fn reserves(&self) -> Vec<u128> {
        self.token_info.iter().map(TokenInfo::reserves).collect()
    }
}

/// Checks a pool token list: 2–4 entries, no duplicates.
///
/// # Errors
///
/// Returns [`AmmError::InvalidTokenSet`] otherwise.
pub fn validate_token_set(tokens: &[TokenRef]) -> Result<()> {
    if tokens.len() < MIN_TOKENS || tokens.len() > MAX_TOKENS {
        return Err(AmmError::InvalidTokenSet("pool needs 2 to 4 tokens"));
    }
    for (i, token) in tokens.iter().enumerate() {
        if tokens[i + 1..].contains(token) {
            return Err(AmmError::InvalidTokenSet("duplicate token"));
        }
    }
    Ok(())
}
