//! Declarative blueprints for the engine and its pools.
//!
//! [`DexConfig`] carries the engine-wide identities and developer fee;
//! [`PoolConfig`] is the argument of `add_pool`.  Both validate eagerly in
//! `new` and expose `validate` for configs loaded through serde.

mod dex_config;
mod pool_config;

pub use dex_config::DexConfig;
pub use pool_config::{validate_token_set, PoolConfig, MAX_TOKENS, MIN_TOKENS};
