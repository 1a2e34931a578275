//! Amplification coefficient with time-based linear ramping.
//!
//! # States
//!
//! | State | Condition | Effective `A` |
//! |-------|-----------|---------------|
//! | Stable | `now >= future_time` | `future_a` |
//! | Ramping | `initial_time < now < future_time` | linear interpolation, floored toward `initial_a` |
//!
//! Time only enters through the `now` argument supplied with each call.

use crate::error::{AmmError, Result};

/// Largest accepted amplification coefficient.
pub const MAX_A: u128 = 1_000_000;

/// A single ramp may multiply or divide `A` by at most this factor.
pub const MAX_A_CHANGE: u128 = 10;

/// Minimum ramp duration, and cooldown between ramp starts, in seconds.
pub const MIN_RAMP_TIME: u64 = 86_400;

/// Ramp endpoints of a pool's amplification coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AmplificationRamp {
    initial_a: u128,
    future_a: u128,
    initial_time: u64,
    future_time: u64,
}

impl AmplificationRamp {
    /// A stable coefficient `a` fixed at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidConfiguration`] unless `1 <= a <= MAX_A`.
    pub fn new(a: u128, now: u64) -> Result<Self> {
        if a == 0 || a > MAX_A {
            return Err(AmmError::InvalidConfiguration(
                "amplification must be in 1..=MAX_A",
            ));
        }
        Ok(Self {
            initial_a: a,
            future_a: a,
            initial_time: now,
            future_time: now,
        })
    }

    /// Effective `A` at time `now`.
    #[must_use]
    pub fn current(&self, now: u64) -> u128 {
        if now >= self.future_time {
            return self.future_a;
        }
        if now <= self.initial_time {
            return self.initial_a;
        }
        // Both differences are bounded by MAX_A and u64::MAX, so the
        // products fit comfortably in u128.
        let elapsed = u128::from(now - self.initial_time);
        let duration = u128::from(self.future_time - self.initial_time);
        if self.future_a >= self.initial_a {
            self.initial_a + (self.future_a - self.initial_a) * elapsed / duration
        } else {
            self.initial_a - (self.initial_a - self.future_a) * elapsed / duration
        }
    }

    /// Returns `true` while `A` is still moving toward `future_a`.
    #[must_use]
    pub const fn is_ramping(&self, now: u64) -> bool {
        now < self.future_time
    }

    /// Starts a ramp from the current effective `A` to `future_a`,
    /// reached at `future_time`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::RampWindowViolation`] if:
    /// - fewer than [`MIN_RAMP_TIME`] seconds passed since the pool was
    ///   created or the previous ramp started;
    /// - `future_time` is less than [`MIN_RAMP_TIME`] seconds away;
    /// - `future_a` is zero or above [`MAX_A`];
    /// - `future_a` differs from the current `A` by more than
    ///   [`MAX_A_CHANGE`]×.
    pub fn start_ramp(&mut self, future_a: u128, future_time: u64, now: u64) -> Result<()> {
        if now < self.initial_time.saturating_add(MIN_RAMP_TIME) {
            return Err(AmmError::RampWindowViolation("ramp cooldown not elapsed"));
        }
        if future_time < now.saturating_add(MIN_RAMP_TIME) {
            return Err(AmmError::RampWindowViolation("ramp shorter than minimum"));
        }
        if future_a == 0 || future_a > MAX_A {
            return Err(AmmError::RampWindowViolation("future A out of range"));
        }
        let current = self.current(now);
        let too_steep = if future_a >= current {
            future_a > current * MAX_A_CHANGE
        } else {
            future_a * MAX_A_CHANGE < current
        };
        if too_steep {
            return Err(AmmError::RampWindowViolation("A change exceeds MAX_A_CHANGE"));
        }
        *self = Self {
            initial_a: current,
            future_a,
            initial_time: now,
            future_time,
        };
        Ok(())
    }

    /// Freezes the current effective `A` and ends any ramp.
    pub fn stop_ramp(&mut self, now: u64) {
        let current = self.current(now);
        *self = Self {
            initial_a: current,
            future_a: current,
            initial_time: now,
            future_time: now,
        };
    }

    /// `A` the ramp started from.
    #[must_use]
    pub const fn initial_a(&self) -> u128 {
        self.initial_a
    }

    /// `A` the ramp is heading to.
    #[must_use]
    pub const fn future_a(&self) -> u128 {
        self.future_a
    }

    /// Ramp start time.
    #[must_use]
    pub const fn initial_time(&self) -> u64 {
        self.initial_time
    }

    /// Ramp end time.
    #[must_use]
    pub const fn future_time(&self) -> u64 {
        self.future_time
    }
}
