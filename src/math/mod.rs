//! Arithmetic for the StableSwap engine.
//!
//! - [`U256`] scratch integers and narrowing back to `u128`.
//! - [`div_round`] / [`mul_div`] with explicit [`Rounding`](crate::domain::Rounding).
//! - [`CheckedArithmetic`] for `?`-friendly ledger bookkeeping.
//! - [`normalize`] / [`denormalize`] between raw and common units.
//! - [`compute_d`] / [`solve_y`], the Newton-Raphson invariant solver.

mod checked;
mod invariant;
mod rounding;
mod scaling;
mod u256;

pub use checked::CheckedArithmetic;
pub use invariant::{ann, compute_d, solve_y, MAX_ITERATIONS};
pub use rounding::{div_round, mul_div};
pub use scaling::{denormalize, normalize};
pub use u256::{abs_diff, narrow, widen, U256};
