//! Convenience re-exports for common types and traits.
//!
//! ```rust
//! use hydra_stableswap::prelude::*;
//! ```

pub use crate::config::{DexConfig, PoolConfig};
pub use crate::domain::{
    Address, FeeConfig, FeeRate, PoolId, Rounding, TokenInfo, TokenRef, Transfer, PRECISION,
    RATE_PRECISION,
};
pub use crate::engine::{
    Call, CallContext, Dex, DivestImbalancedParams, DivestOneCoinParams, DivestParams,
    InvestParams, Receipt, StakeAction, SwapParams,
};
pub use crate::error::{AmmError, Result};
pub use crate::ledger::{OperatorParam, OperatorUpdate, TransferBatch, TransferLeg};
pub use crate::pool::{StablePool, MAX_A, MIN_RAMP_TIME};
pub use crate::traits::{TokenTransfer, TransferLog};
