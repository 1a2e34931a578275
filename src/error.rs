//! Unified error types for the StableSwap engine.
//!
//! Every fallible operation in the crate returns [`AmmError`].  A returned
//! error always means the call was rejected as a whole: no pool, ledger or
//! escrow state was changed and no token transfer was emitted.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = core::result::Result<T, AmmError>;

/// Every way an engine call can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmmError {
    /// A pool with the same token set already exists and is live.
    #[error("pool already initialized")]
    AlreadyInitialized,

    /// Duplicate tokens, or a token count outside `2..=4`.
    #[error("invalid token set: {0}")]
    InvalidTokenSet(&'static str),

    /// Caller is not the admin, the developer, the owner or an operator.
    #[error("unauthorized: {0}")]
    Unauthorized(&'static str),

    /// `now` is past the caller-supplied deadline.
    #[error("deadline expired")]
    Expired,

    /// Output below the requested minimum, or shares above the maximum.
    #[error("slippage exceeded: {0}")]
    SlippageExceeded(&'static str),

    /// Ledger or stake balance too small for the requested amount.
    #[error("insufficient balance")]
    InsufficientBalance,

    /// Claim larger than the escrowed referral or developer balance.
    #[error("insufficient escrow balance")]
    InsufficientEscrow,

    /// Newton-Raphson did not converge within the iteration bound.
    #[error("invariant did not converge: {0}")]
    InvariantConvergenceFailure(&'static str),

    /// Amplification ramp started too early, too short, or too steep.
    #[error("ramp window violation: {0}")]
    RampWindowViolation(&'static str),

    /// Token index outside the pool, or a token the pool does not hold.
    #[error("invalid token: {0}")]
    InvalidToken(&'static str),

    /// No pool is registered under the requested id.
    #[error("pool not found")]
    PoolNotFound,

    /// Zero or otherwise unusable amount.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(&'static str),

    /// A configuration blueprint failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),

    /// Fee fractions exceed the precision denominator.
    #[error("invalid fee: {0}")]
    InvalidFee(&'static str),

    /// Pool reserves cannot cover the requested operation.
    #[error("insufficient liquidity")]
    InsufficientLiquidity,

    /// Checked arithmetic overflowed.
    #[error("arithmetic overflow: {0}")]
    Overflow(&'static str),

    /// Checked arithmetic underflowed.
    #[error("arithmetic underflow: {0}")]
    Underflow(&'static str),

    /// Division by zero in a pricing formula.
    #[error("division by zero")]
    DivisionByZero,

    /// The external token-transfer capability rejected a transfer.
    #[error("token transfer failed: {0}")]
    TokenTransferFailed(String),
}
