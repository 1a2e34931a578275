//! Identity and clock supplied by the host with every call.

use crate::domain::Address;

/// Externally verified caller and the current time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    /// Authenticated caller.
    pub sender: Address,
    /// Current time in seconds, monotonic across calls.
    pub now: u64,
}

impl CallContext {
    /// Creates a context.
    #[must_use]
    pub const fn new(sender: Address, now: u64) -> Self {
        Self { sender, now }
    }
}
