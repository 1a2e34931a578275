//! Explicit rounding direction for integer division.

/// Direction of every truncating division in the pricing code.
///
/// Outputs paid to callers round [`Down`](Self::Down); fees and shares a
/// caller must burn round [`Up`](Self::Up), so dust always stays in the
/// pool.
///
/// # Examples
///
/// ```
/// use hydra_stableswap::domain::Rounding;
///
/// assert!(Rounding::Up.is_up());
/// assert!(Rounding::Down.is_down());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rounding {
    /// Toward positive infinity.
    Up,
    /// Toward zero.
    Down,
}

impl Rounding {
    /// Returns `true` if this is [`Rounding::Up`].
    #[must_use]
    pub const fn is_up(&self) -> bool {
        matches!(self, Self::Up)
    }

    /// Returns `true` if this is [`Rounding::Down`].
    #[must_use]
    pub const fn is_down(&self) -> bool {
        matches!(self, Self::Down)
    }
}
