//! Property-based tests using `proptest` for StableSwap pool invariants.
//!
//! 1. **Invariant growth**: `D` never decreases across a fee-charging swap.
//! 2. **Output bound**: a swap never pays out more of `j` than it holds,
//!    and in a balanced pool never more than the input amount.
//! 3. **Round trip**: swapping `i → j → i` returns at most the input.
//! 4. **Balanced conservation**: invest then divest returns at most the
//!    deposit.
//! 5. **Ramp monotonicity**: `A` moves monotonically toward its target.
//! 6. **Mixed precision**: pairing an 18-decimal token with a coarser one
//!    keeps `D` non-decreasing and never pays out more value than it
//!    receives.

use proptest::prelude::*;

use super::{AmplificationRamp, FeeDistributor, StablePool, MIN_RAMP_TIME};
use crate::config::PoolConfig;
use crate::domain::{Address, FeeConfig, FeeRate, TokenInfo, TokenRef};

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn token(tag: u8) -> TokenRef {
    TokenRef::simple(Address::from_bytes([tag; 32]))
}

fn fees_30ppm() -> FeeDistributor {
    let Ok(fees) = FeeConfig::new(FeeRate::new(20), FeeRate::new(5), FeeRate::new(5)) else {
        panic!("valid fees");
    };
    FeeDistributor::new(fees, FeeRate::ZERO)
}

fn make_pool(reserves: &[u128], amp: u128) -> StablePool {
    let info = reserves
        .iter()
        .map(|r| {
            let Ok(info) = TokenInfo::canonical(1, *r) else {
                panic!("valid token info");
            };
            info
        })
        .collect();
    make_pool_with(info, amp)
}

fn make_pool_with(info: Vec<TokenInfo>, amp: u128) -> StablePool {
    let reserves: Vec<u128> = info.iter().map(TokenInfo::reserves).collect();
    let tokens = (0..info.len()).map(|k| token(k as u8 + 1)).collect();
    let Ok(config) = PoolConfig::new(tokens, info, amp, FeeConfig::ZERO) else {
        panic!("valid pool config");
    };
    let Ok(mut pool) = StablePool::from_config(&config, 0) else {
        panic!("valid pool");
    };
    let Ok(_) = pool.invest(&reserves, 0, &fees_30ppm(), false) else {
        panic!("initial invest");
    };
    pool
}

fn reserve_strategy() -> impl Strategy<Value = u128> {
    1_000_000u128..=1_000_000_000_000_000u128
}

fn multiplier_strategy() -> impl Strategy<Value = u128> {
    prop::sample::select(vec![1u128, 1_000, 1_000_000, 1_000_000_000_000])
}

fn amplification_strategy() -> impl Strategy<Value = u128> {
    1u128..=100_000u128
}

// ---------------------------------------------------------------------------
// Property 1 & 2: Invariant growth and output bound
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_swap_never_decreases_invariant(
        ra in reserve_strategy(),
        rb in reserve_strategy(),
        rc in reserve_strategy(),
        amp in amplification_strategy(),
        frac in 1u128..=500u128,
    ) {
        let mut pool = make_pool(&[ra, rb, rc], amp);
        let Ok(d0) = pool.invariant(0) else {
            return Ok(());
        };
        let dx = (ra * frac / 1_000).max(1);
        let Ok(outcome) = pool.swap(0, 2, dx, 0, &fees_30ppm(), false) else {
            return Ok(());
        };
        let Ok(d1) = pool.invariant(0) else {
            return Ok(());
        };
        prop_assert!(d1 >= d0, "invariant dropped: {} -> {}", d0, d1);
        prop_assert!(outcome.amount_out < rc, "drained token: {} >= {}", outcome.amount_out, rc);
    }

    #[test]
    fn prop_balanced_swap_output_below_input(
        reserve in reserve_strategy(),
        amp in amplification_strategy(),
        frac in 1u128..=900u128,
    ) {
        let mut pool = make_pool(&[reserve, reserve], amp);
        let dx = (reserve * frac / 1_000).max(1);
        let Ok(outcome) = pool.swap(0, 1, dx, 0, &fees_30ppm(), false) else {
            return Ok(());
        };
        prop_assert!(outcome.amount_out < dx, "output {} >= input {}", outcome.amount_out, dx);
    }
}

// ---------------------------------------------------------------------------
// Property 3: Round trip
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_round_trip_loses_value(
        ra in reserve_strategy(),
        rb in reserve_strategy(),
        amp in amplification_strategy(),
    ) {
        let mut pool = make_pool(&[ra, rb], amp);
        let dx = (ra / 1_000).max(1);
        let Ok(there) = pool.swap(0, 1, dx, 0, &fees_30ppm(), false) else {
            return Ok(());
        };
        if there.amount_out == 0 { return Ok(()); }
        let Ok(back) = pool.swap(1, 0, there.amount_out, 0, &fees_30ppm(), false) else {
            return Ok(());
        };
        prop_assert!(back.amount_out <= dx, "round trip gained: {} > {}", back.amount_out, dx);
    }
}

// ---------------------------------------------------------------------------
// Property 4: Balanced conservation
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_invest_divest_returns_at_most_deposit(
        reserve in reserve_strategy(),
        amp in amplification_strategy(),
        frac in 1u128..=1_000u128,
    ) {
        let mut pool = make_pool(&[reserve, reserve], amp);
        let deposit = (reserve * frac / 1_000).max(1);
        let Ok(invest) = pool.invest(&[deposit, deposit], 0, &fees_30ppm(), false) else {
            return Ok(());
        };
        let Ok(divest) = pool.divest(invest.minted) else {
            return Ok(());
        };
        for out in &divest.amounts_out {
            prop_assert!(*out <= deposit, "withdrew {} > deposited {}", out, deposit);
        }
    }
}

// ---------------------------------------------------------------------------
// Property 5: Ramp monotonicity
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_ramp_is_monotonic(
        initial in 10u128..=10_000u128,
        factor in 1u128..=10u128,
        up in any::<bool>(),
        steps in 2u64..=32u64,
    ) {
        let target = if up { initial * factor } else { (initial / factor).max(1) };
        let Ok(mut ramp) = AmplificationRamp::new(initial, 0) else {
            return Ok(());
        };
        let start = MIN_RAMP_TIME;
        let end = start + MIN_RAMP_TIME * 2;
        let Ok(()) = ramp.start_ramp(target, end, start) else {
            return Ok(());
        };
        let mut previous = ramp.current(start);
        for step in 1..=steps {
            let now = start + (end - start) * step / steps;
            let a = ramp.current(now);
            if up {
                prop_assert!(a >= previous, "A fell during upward ramp");
            } else {
                prop_assert!(a <= previous, "A rose during downward ramp");
            }
            previous = a;
        }
        prop_assert_eq!(ramp.current(end), target);
    }
}

// ---------------------------------------------------------------------------
// Property 6: Mixed precision
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_mixed_precision_swap_is_value_bounded(
        value in 1_000_000_000_000_000u128..=1_000_000_000_000_000_000_000_000u128,
        multiplier in multiplier_strategy(),
        amp in amplification_strategy(),
        frac in 1u128..=500u128,
    ) {
        // Token 1 holds the same value as token 0 in coarser raw units,
        // rounded down, so it is never the larger side.
        let (Ok(fine), Ok(coarse)) = (
            TokenInfo::canonical(1, value),
            TokenInfo::canonical(multiplier, value / multiplier),
        ) else {
            panic!("valid token info");
        };
        let mut pool = make_pool_with(vec![fine, coarse], amp);
        let Ok(d0) = pool.invariant(0) else {
            return Ok(());
        };
        let dx = value * frac / 1_000;
        let Ok(outcome) = pool.swap(0, 1, dx, 0, &fees_30ppm(), false) else {
            return Ok(());
        };
        let Ok(d1) = pool.invariant(0) else {
            return Ok(());
        };
        prop_assert!(d1 >= d0, "invariant dropped: {} -> {}", d0, d1);
        prop_assert!(
            outcome.amount_out * multiplier < dx,
            "paid {} raw at multiplier {} for {}",
            outcome.amount_out,
            multiplier,
            dx
        );
    }
}
