//! StableSwap invariant solver for `n` tokens.
//!
//! # Invariant
//!
//! ```text
//! A·nⁿ·Σxᵢ + D = A·D·nⁿ + Dⁿ⁺¹ / (nⁿ·Πxᵢ)
//! ```
//!
//! where `xᵢ` are rate-normalised balances and `Ann = A·nⁿ`.
//!
//! | Function | Unknown | Held fixed |
//! |----------|---------|------------|
//! | [`compute_d`] | `D` | every balance |
//! | [`solve_y`] | one balance `x_j` | `D` and every other balance |
//!
//! Both are pure functions of their inputs and iterate Newton-Raphson at
//! most [`MAX_ITERATIONS`] times, stopping once consecutive iterates
//! differ by at most one unit.

use super::u256::{abs_diff, U256};
use crate::error::{AmmError, Result};

/// Newton-Raphson iteration bound.
pub const MAX_ITERATIONS: u32 = 255;

/// Absolute difference between iterates accepted as converged.
const CONVERGENCE_THRESHOLD: u64 = 1;

/// `A · nⁿ`.
///
/// # Errors
///
/// Returns [`AmmError::Overflow`] if the product exceeds 256 bits.
pub fn ann(amp: u128, n: usize) -> Result<U256> {
    let n = U256::from(n as u64);
    let mut ann = U256::from(amp);
    for _ in 0..n.low_u64() {
        ann = ann
            .checked_mul(n)
            .ok_or(AmmError::Overflow("Ann: A·nⁿ overflow"))?;
    }
    Ok(ann)
}

/// Computes the invariant `D` of normalised balances `xp`.
///
/// Starts from `D₀ = Σx` and iterates
///
/// ```text
/// D_P    = Dⁿ⁺¹ / (nⁿ · Πx)
/// D_next = (Ann·S + n·D_P) · D / ((Ann − 1)·D + (n + 1)·D_P)
/// ```
///
/// An all-zero pool has `D = 0`.
///
/// # Errors
///
/// - [`AmmError::DivisionByZero`] if some but not all balances are zero,
///   or `amp` is zero.
/// - [`AmmError::Overflow`] if an intermediate exceeds 256 bits.
/// - [`AmmError::InvariantConvergenceFailure`] if iteration does not
///   settle within [`MAX_ITERATIONS`].
pub fn compute_d(xp: &[U256], amp: u128) -> Result<U256> {
    let mut s = U256::zero();
    for x in xp {
        s = s
            .checked_add(*x)
            .ok_or(AmmError::Overflow("D: S overflow"))?;
    }
    if s.is_zero() {
        return Ok(U256::zero());
    }

    let n = U256::from(xp.len() as u64);
    let ann = ann(amp, xp.len())?;
    if ann.is_zero() {
        return Err(AmmError::DivisionByZero);
    }
    let ann_s = ann
        .checked_mul(s)
        .ok_or(AmmError::Overflow("D: Ann·S overflow"))?;

    let mut d = s;
    for _ in 0..MAX_ITERATIONS {
        let mut d_p = d;
        for x in xp {
            let nx = x
                .checked_mul(n)
                .ok_or(AmmError::Overflow("D: n·x overflow"))?;
            if nx.is_zero() {
                return Err(AmmError::DivisionByZero);
            }
            d_p = d_p
                .checked_mul(d)
                .ok_or(AmmError::Overflow("D: D_P·D overflow"))?
                / nx;
        }

        let d_prev = d;

        let numerator = d_p
            .checked_mul(n)
            .and_then(|n_dp| ann_s.checked_add(n_dp))
            .and_then(|inner| inner.checked_mul(d))
            .ok_or(AmmError::Overflow("D: numerator overflow"))?;

        let denominator = (ann - U256::one())
            .checked_mul(d)
            .and_then(|left| {
                (n + U256::one())
                    .checked_mul(d_p)
                    .and_then(|right| left.checked_add(right))
            })
            .ok_or(AmmError::Overflow("D: denominator overflow"))?;
        if denominator.is_zero() {
            return Err(AmmError::DivisionByZero);
        }

        d = numerator / denominator;

        if abs_diff(d, d_prev) <= U256::from(CONVERGENCE_THRESHOLD) {
            return Ok(d);
        }
    }

    Err(AmmError::InvariantConvergenceFailure(
        "D did not converge within 255 iterations",
    ))
}

/// Solves for the normalised balance of token `j` that keeps the
/// invariant at `d`, with every other entry of `xp` held fixed.
///
/// `xp[j]` is ignored.  Used with the input balance already credited to
/// price swaps, and with a reduced `d` to price single-token
/// withdrawals.
///
/// ```text
/// c = Dⁿ⁺¹ / (nⁿ · Π_{k≠j} x_k · Ann)
/// b = Σ_{k≠j} x_k + D / Ann
/// y_next = (y² + c) / (2y + b − D)
/// ```
///
/// # Errors
///
/// - [`AmmError::InvalidToken`] if `j` is out of range.
/// - [`AmmError::DivisionByZero`] if another balance is zero.
/// - [`AmmError::Underflow`] if `2y + b < D`.
/// - [`AmmError::InvariantConvergenceFailure`] on non-convergence.
pub fn solve_y(xp: &[U256], j: usize, d: U256, amp: u128) -> Result<U256> {
    if j >= xp.len() {
        return Err(AmmError::InvalidToken("solve_y: index out of range"));
    }
    let n = U256::from(xp.len() as u64);
    let ann = ann(amp, xp.len())?;
    if ann.is_zero() {
        return Err(AmmError::DivisionByZero);
    }

    let mut c = d;
    let mut s = U256::zero();
    for (k, x) in xp.iter().enumerate() {
        if k == j {
            continue;
        }
        s = s
            .checked_add(*x)
            .ok_or(AmmError::Overflow("y: S overflow"))?;
        let nx = x
            .checked_mul(n)
            .ok_or(AmmError::Overflow("y: n·x overflow"))?;
        if nx.is_zero() {
            return Err(AmmError::DivisionByZero);
        }
        c = c
            .checked_mul(d)
            .ok_or(AmmError::Overflow("y: c·D overflow"))?
            / nx;
    }
    let ann_n = ann
        .checked_mul(n)
        .ok_or(AmmError::Overflow("y: Ann·n overflow"))?;
    c = c
        .checked_mul(d)
        .ok_or(AmmError::Overflow("y: c·D overflow"))?
        / ann_n;
    let b = s
        .checked_add(d / ann)
        .ok_or(AmmError::Overflow("y: b overflow"))?;

    let mut y = d;
    for _ in 0..MAX_ITERATIONS {
        let y_prev = y;

        let numerator = y
            .checked_mul(y)
            .and_then(|y_sq| y_sq.checked_add(c))
            .ok_or(AmmError::Overflow("y: numerator overflow"))?;
        let denominator = y
            .checked_mul(U256::from(2u8))
            .and_then(|two_y| two_y.checked_add(b))
            .ok_or(AmmError::Overflow("y: denominator overflow"))?
            .checked_sub(d)
            .ok_or(AmmError::Underflow("y: 2y + b < D"))?;
        if denominator.is_zero() {
            return Err(AmmError::DivisionByZero);
        }

        y = numerator / denominator;

        if abs_diff(y, y_prev) <= U256::from(CONVERGENCE_THRESHOLD) {
            return Ok(y);
        }
    }

    Err(AmmError::InvariantConvergenceFailure(
        "y did not converge within 255 iterations",
    ))
}
