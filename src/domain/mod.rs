//! Fundamental domain value types used throughout the engine.
//!
//! Identities, asset references, fee fractions, per-token pricing
//! metadata, pool handles and transfer records.  Types with invariants
//! validate them in their constructors.

mod address;
mod fee_config;
mod fee_rate;
mod pool_id;
mod rounding;
mod token_info;
mod token_ref;
mod transfer;

pub use address::Address;
pub use fee_config::FeeConfig;
pub use fee_rate::{FeeRate, PRECISION};
pub use pool_id::PoolId;
pub use rounding::Rounding;
pub use token_info::{TokenInfo, RATE_PRECISION};
pub use token_ref::TokenRef;
pub use transfer::Transfer;
