//! Multi-pool share accounting.
//!
//! Shares of every pool live in one [`ShareLedger`] keyed by
//! `(owner, pool)`.  Each entry tracks a liquid balance, a frozen
//! (staked) balance and the holder's reward position.  Batched transfers
//! and operator approvals follow the multi-token standard's shape.

mod batch;
mod share_ledger;

pub use batch::{OperatorParam, OperatorUpdate, TransferBatch, TransferLeg};
pub use share_ledger::{LedgerEntry, ShareLedger};
