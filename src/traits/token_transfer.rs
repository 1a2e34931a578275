//! Host capability for moving pool tokens.
//!
//! The engine never holds tokens itself: every settlement is described
//! as a [`Transfer`] and handed to a [`TokenTransfer`] implementation
//! supplied by the host.  Any failure aborts the whole call and the
//! engine state is restored.
//!
//! # Implementors
//!
//! - Any `FnMut(&Transfer) -> Result<()>` closure.
//! - [`TransferLog`], which records transfers and always succeeds.

use crate::domain::Transfer;
use crate::error::Result;

/// Executes token transfers on behalf of the engine.
pub trait TokenTransfer {
    /// Moves `transfer.amount` of `transfer.token` from `transfer.from`
    /// to `transfer.to`.
    ///
    /// # Errors
    ///
    /// Implementations return
    /// [`AmmError::TokenTransferFailed`](crate::error::AmmError::TokenTransferFailed)
    /// or any other error to abort the call.
    fn transfer(&mut self, transfer: &Transfer) -> Result<()>;
}

impl<F> TokenTransfer for F
where
    F: FnMut(&Transfer) -> Result<()>,
{
    fn transfer(&mut self, transfer: &Transfer) -> Result<()> {
        self(transfer)
    }
}

/// Records every transfer in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferLog(Vec<Transfer>);

impl TransferLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Transfers seen so far.
    #[must_use]
    pub fn transfers(&self) -> &[Transfer] {
        &self.0
    }
}

impl TokenTransfer for TransferLog {
    fn transfer(&mut self, transfer: &Transfer) -> Result<()> {
        self.0.push(*transfer);
        Ok(())
    }
}
