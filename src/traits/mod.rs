//! Trait seams between the engine and its host.
//!
//! [`TokenTransfer`] is the only capability the engine needs from the
//! outside world: moving pool tokens between accounts.

mod token_transfer;

pub use token_transfer::{TokenTransfer, TransferLog};
