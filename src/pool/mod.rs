//! StableSwap pool state and the pieces it is built from.
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`amplification`] | Time-interpolated `A` ramp |
//! | [`fees`] | Fee scaling and routing |
//! | [`staking`] | Reward accumulator for staked shares |
//! | [`stable_pool`] | Reserves, shares and the pricing transitions |

pub mod amplification;
pub mod fees;
pub mod stable_pool;
pub mod staking;

#[cfg(test)]
mod proptest_properties;

pub use amplification::{AmplificationRamp, MAX_A, MAX_A_CHANGE, MIN_RAMP_TIME};
pub use fees::{FeeBase, FeeBreakdown, FeeDistributor};
pub use stable_pool::{DivestOutcome, InvestOutcome, StablePool, SwapOutcome};
pub use staking::{RewardPosition, StakingAccumulator, ACCUMULATOR_PRECISION};
