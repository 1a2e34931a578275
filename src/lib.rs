//! # Hydra StableSwap
//!
//! Multi-asset StableSwap settlement engine: pools of 2–4 like-valued
//! tokens priced on the Curve invariant, ownership shares kept in a
//! multi-token ledger, and fees split between liquidity providers,
//! stakers, referrers and a developer account.
//!
//! The engine is a pure state machine.  The host supplies the caller
//! identity and the clock with every call, and settles the token
//! transfers each committed call returns.
//!
//! # Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `serde` | yes | `Serialize`/`Deserialize` for configs, calls and state |
//!
//! # Quick Start
//!
//! ```rust
//! use hydra_stableswap::prelude::*;
//!
//! let admin = Address::from_bytes([1; 32]);
//! let developer = Address::from_bytes([2; 32]);
//! let custody = Address::from_bytes([3; 32]);
//! let usdc = TokenRef::simple(Address::from_bytes([10; 32]));
//! let usdt = TokenRef::native(Address::from_bytes([11; 32]), 0);
//!
//! // 1. Engine with a zero developer fee
//! let config = DexConfig::new(admin, developer, custody, FeeRate::ZERO).expect("valid config");
//! let mut dex = Dex::new(config).expect("engine");
//!
//! // 2. A two-token pool, A = 100, 0.03% lp fee
//! let pool = PoolConfig::new(
//!     vec![usdc, usdt],
//!     vec![
//!         TokenInfo::canonical(1, 1_000_000_000).expect("rate"),
//!         TokenInfo::canonical(1, 1_000_000_000).expect("rate"),
//!     ],
//!     100,
//!     FeeConfig::new(FeeRate::new(300), FeeRate::ZERO, FeeRate::ZERO).expect("fees"),
//! )
//! .expect("valid pool");
//! let receipt = dex.add_pool(CallContext::new(admin, 0), &pool).expect("pool added");
//! let pool_id = receipt.pool_id().expect("pool id");
//!
//! // 3. Swap through the host transfer capability
//! let trader = Address::from_bytes([4; 32]);
//! let swap = Call::Swap(SwapParams::new(pool_id, 0, 1, 1_000_000, 990_000, 60));
//! let mut log = TransferLog::new();
//! let receipt = dex
//!     .execute(&swap, CallContext::new(trader, 10), &mut log)
//!     .expect("swap succeeded");
//!
//! assert!(receipt.amount_out() >= 990_000);
//! assert_eq!(log.transfers().len(), 2);
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │    Host      │  CallContext + TokenTransfer
//! └──────┬──────┘
//!        │ execute(&Call)
//!        ▼
//! ┌─────────────┐
//! │   Engine     │  Dex: atomic calls, receipts, views
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐   ┌─────────────┐
//! │    Pools     │   │ Ledger/Escrow│  shares, operators, fee balances
//! └──────┬──────┘   └─────────────┘
//!        │ invariant solver, fee routing, staking accumulator
//!        ▼
//! ┌─────────────┐
//! │ Math/Domain  │  U256, Rounding, TokenRef, FeeRate, …
//! └─────────────┘
//! ```
//!
//! # Module Guide
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`domain`] | Newtype value types: [`Address`](domain::Address), [`TokenRef`](domain::TokenRef), [`FeeRate`](domain::FeeRate), etc. |
//! | [`math`]   | U256 scratch integers, rounding, the Newton-Raphson invariant solver |
//! | [`config`] | Validated blueprints: [`PoolConfig`](config::PoolConfig), [`DexConfig`](config::DexConfig) |
//! | [`pool`]   | [`StablePool`](pool::StablePool), amplification ramp, fee routing, staking |
//! | [`ledger`] | [`ShareLedger`](ledger::ShareLedger): balances, operators, batched transfers |
//! | [`escrow`] | Referral and developer fee balances |
//! | [`traits`] | [`TokenTransfer`](traits::TokenTransfer) host capability |
//! | [`engine`] | [`Dex`](engine::Dex) orchestrator and [`Call`](engine::Call) envelope |
//! | [`error`]  | [`AmmError`](error::AmmError) unified error enum |
//! | [`prelude`] | Convenience re-exports for common types and traits |

pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod escrow;
pub mod ledger;
pub mod math;
pub mod pool;
pub mod prelude;
pub mod traits;

#[cfg(feature = "serde")]
mod serde_pairs;
