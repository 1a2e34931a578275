//! Integration tests exercising the engine end to end through its public
//! API: pool creation, trading, liquidity, staking, fee claims, share
//! transfers, ramps and atomic rollback.

#![allow(clippy::panic)]

use std::collections::BTreeMap;

use hydra_stableswap::prelude::*;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

const FAR_FUTURE: u64 = 10_000_000_000;

fn addr(tag: u8) -> Address {
    Address::from_bytes([tag; 32])
}

fn admin() -> Address {
    addr(1)
}

fn developer() -> Address {
    addr(2)
}

fn custody() -> Address {
    addr(3)
}

fn alice() -> Address {
    addr(4)
}

fn bob() -> Address {
    addr(5)
}

fn trader() -> Address {
    addr(6)
}

fn token(tag: u8) -> TokenRef {
    TokenRef::simple(addr(100 + tag))
}

fn ctx(sender: Address) -> CallContext {
    CallContext::new(sender, 0)
}

fn standard_fees() -> FeeConfig {
    let Ok(fees) = FeeConfig::new(FeeRate::new(20), FeeRate::new(20), FeeRate::new(50)) else {
        panic!("valid fees");
    };
    fees
}

fn make_dex(dev_fee: u32) -> Dex {
    let Ok(config) = DexConfig::new(admin(), developer(), custody(), FeeRate::new(dev_fee)) else {
        panic!("valid dex config");
    };
    let Ok(dex) = Dex::new(config) else {
        panic!("valid dex");
    };
    dex
}

fn pool_config(reserves: &[u128], amp: u128, fees: FeeConfig) -> PoolConfig {
    let info = reserves
        .iter()
        .map(|r| {
            let Ok(info) = TokenInfo::canonical(1, *r) else {
                panic!("valid token info");
            };
            info
        })
        .collect();
    pool_config_with(info, amp, fees)
}

fn pool_config_with(info: Vec<TokenInfo>, amp: u128, fees: FeeConfig) -> PoolConfig {
    let tokens = (0..info.len()).map(|k| token(k as u8)).collect();
    let Ok(config) = PoolConfig::new(tokens, info, amp, fees) else {
        panic!("valid pool config");
    };
    config
}

fn add_pool_with(dex: &mut Dex, info: Vec<TokenInfo>, amp: u128, fees: FeeConfig) -> PoolId {
    let Ok(receipt) = dex.add_pool(ctx(admin()), &pool_config_with(info, amp, fees)) else {
        panic!("pool added");
    };
    let Some(pool_id) = receipt.pool_id() else {
        panic!("pool id in receipt");
    };
    pool_id
}

fn lp_fee_only(lp: u32) -> FeeConfig {
    let Ok(fees) = FeeConfig::new(FeeRate::new(lp), FeeRate::ZERO, FeeRate::ZERO) else {
        panic!("valid fees");
    };
    fees
}

const ONE_E18: u128 = 1_000_000_000_000_000_000;

/// One million units each of an 18-decimal token 0 and a 6-decimal
/// token 1.
fn mixed_decimals_pool(dex: &mut Dex, fees: FeeConfig) -> PoolId {
    let (Ok(wide), Ok(narrow)) = (
        TokenInfo::canonical(1, 1_000_000 * ONE_E18),
        TokenInfo::canonical(1_000_000_000_000, 1_000_000 * 1_000_000),
    ) else {
        panic!("valid token info");
    };
    add_pool_with(dex, vec![wide, narrow], 100, fees)
}

fn add_pool(dex: &mut Dex, reserves: &[u128], amp: u128, fees: FeeConfig) -> PoolId {
    let Ok(receipt) = dex.add_pool(ctx(admin()), &pool_config(reserves, amp, fees)) else {
        panic!("pool added");
    };
    let Some(pool_id) = receipt.pool_id() else {
        panic!("pool id in receipt");
    };
    pool_id
}

fn amounts(values: &[u128]) -> BTreeMap<usize, u128> {
    values.iter().copied().enumerate().collect()
}

fn invest(dex: &mut Dex, sender: Address, pool_id: PoolId, values: &[u128], referral: Option<Address>) -> Receipt {
    let mut params = InvestParams::new(pool_id, amounts(values), 1, FAR_FUTURE);
    if let Some(r) = referral {
        params = params.with_referral(r);
    }
    let Ok(receipt) = dex.invest(ctx(sender), &params) else {
        panic!("invest succeeded");
    };
    receipt
}

fn swap(dex: &mut Dex, pool_id: PoolId, i: usize, j: usize, amount: u128) -> Receipt {
    let params = SwapParams::new(pool_id, i, j, amount, 0, FAR_FUTURE);
    let Ok(receipt) = dex.swap(ctx(trader()), &params) else {
        panic!("swap succeeded");
    };
    receipt
}

fn divest(dex: &mut Dex, sender: Address, pool_id: PoolId, shares: u128) -> Receipt {
    let params = DivestParams::new(pool_id, shares, BTreeMap::new(), FAR_FUTURE);
    let Ok(receipt) = dex.divest(ctx(sender), &params) else {
        panic!("divest succeeded");
    };
    receipt
}

fn stake(dex: &mut Dex, sender: Address, action: StakeAction) -> Receipt {
    let Ok(receipt) = dex.stake(ctx(sender), action) else {
        panic!("stake succeeded");
    };
    receipt
}

fn total_out(receipt: &Receipt) -> u128 {
    receipt.transfers().iter().map(|t| t.amount).sum()
}

// ---------------------------------------------------------------------------
// Pricing and liquidity
// ---------------------------------------------------------------------------

#[test]
fn tiny_pool_divest_rounds_down() {
    let mut dex = make_dex(0);
    let pool_id = add_pool(&mut dex, &[3, 3], 1_000_000, FeeConfig::ZERO);

    let receipt = invest(&mut dex, alice(), pool_id, &[2, 2], None);
    assert_eq!(receipt.minted(), 4);

    swap(&mut dex, pool_id, 0, 1, 2);

    let receipt = divest(&mut dex, alice(), pool_id, 4);
    for transfer in receipt.transfers() {
        assert!(transfer.amount <= 2, "withdrew {}", transfer.amount);
        assert_eq!(transfer.to, alice());
        assert_eq!(transfer.from, custody());
    }
    assert_eq!(dex.get_balance(alice(), pool_id), 0);
}

#[test]
fn large_trade_slippage_bound() {
    let mut dex = make_dex(0);
    let pool_id = add_pool(&mut dex, &[1_000_000_000_000, 1_000_000_000_000], 1_000_000, FeeConfig::ZERO);

    let receipt = swap(&mut dex, pool_id, 0, 1, 100_000_000_000);
    let out = receipt.amount_out();
    assert!(out < 100_000_000_000);
    assert!(out > 99_900_000_000);
}

#[test]
fn swap_emits_inbound_then_outbound_transfer() {
    let mut dex = make_dex(0);
    let pool_id = add_pool(&mut dex, &[1_000_000_000, 1_000_000_000], 100, standard_fees());
    let Ok(quote) = dex.get_dy(pool_id, 0, 1, 1_000_000, 0) else {
        panic!("quote");
    };

    let params = SwapParams::new(pool_id, 0, 1, 1_000_000, 0, FAR_FUTURE).with_receiver(bob());
    let Ok(receipt) = dex.swap(ctx(trader()), &params) else {
        panic!("swap");
    };
    let transfers = receipt.transfers();
    assert_eq!(transfers.len(), 2);
    assert_eq!(
        transfers[0],
        Transfer::new(trader(), custody(), 1_000_000, token(0))
    );
    assert_eq!(transfers[1], Transfer::new(custody(), bob(), quote, token(1)));
}

#[test]
fn swap_rejects_expired_and_slippage() {
    let mut dex = make_dex(0);
    let pool_id = add_pool(&mut dex, &[1_000_000, 1_000_000], 100, FeeConfig::ZERO);
    let before = dex.clone();

    let expired = SwapParams::new(pool_id, 0, 1, 1_000, 0, 5);
    assert_eq!(
        dex.swap(CallContext::new(trader(), 6), &expired),
        Err(AmmError::Expired)
    );

    let greedy = SwapParams::new(pool_id, 0, 1, 1_000, 1_000, FAR_FUTURE);
    assert!(matches!(
        dex.swap(ctx(trader()), &greedy),
        Err(AmmError::SlippageExceeded(_))
    ));

    let same = SwapParams::new(pool_id, 1, 1, 1_000, 0, FAR_FUTURE);
    assert!(matches!(
        dex.swap(ctx(trader()), &same),
        Err(AmmError::InvalidToken(_))
    ));
    assert_eq!(dex, before);
}

#[test]
fn multiple_singular_invests() {
    let mut dex = make_dex(0);
    let pool_id = add_pool(&mut dex, &[10, 10], 1_000_000, FeeConfig::ZERO);

    for _ in 0..3 {
        let receipt = invest(&mut dex, alice(), pool_id, &[1, 1], None);
        assert_eq!(receipt.minted(), 2);
    }
    assert_eq!(dex.get_balance(alice(), pool_id), 6);

    let receipt = divest(&mut dex, alice(), pool_id, 6);
    let outs: Vec<u128> = receipt.transfers().iter().map(|t| t.amount).collect();
    assert_eq!(outs, vec![3, 3]);
}

#[test]
fn invest_rejects_unknown_index_and_min_shares() {
    let mut dex = make_dex(0);
    let pool_id = add_pool(&mut dex, &[1_000_000, 1_000_000], 100, FeeConfig::ZERO);

    let mut outside = BTreeMap::new();
    outside.insert(2, 10);
    let params = InvestParams::new(pool_id, outside, 1, FAR_FUTURE);
    assert!(matches!(
        dex.invest(ctx(alice()), &params),
        Err(AmmError::InvalidToken(_))
    ));

    let params = InvestParams::new(pool_id, amounts(&[1_000, 1_000]), 1_000_000, FAR_FUTURE);
    assert!(matches!(
        dex.invest(ctx(alice()), &params),
        Err(AmmError::SlippageExceeded(_))
    ));
}

#[test]
fn single_token_deposit_mints_less_than_balanced() {
    let mut balanced = make_dex(0);
    let pool_a = add_pool(&mut balanced, &[1_000_000_000_000, 1_000_000_000_000], 100_000, standard_fees());
    let mut single = balanced.clone();

    let minted_balanced = invest(&mut balanced, alice(), pool_a, &[500_000_000, 500_000_000], None).minted();
    let minted_single = invest(&mut single, alice(), pool_a, &[1_000_000_000, 0], None).minted();
    assert!(minted_single < minted_balanced);
}

#[test]
fn divest_only_burns_liquid_shares() {
    let mut dex = make_dex(0);
    let pool_id = add_pool(&mut dex, &[1_000_000, 1_000_000], 100, FeeConfig::ZERO);
    let Some(total) = dex.get_total_shares(pool_id).ok() else {
        panic!("shares");
    };
    stake(&mut dex, admin(), StakeAction::Add { pool_id, amount: 10 });

    let params = DivestParams::new(pool_id, total, BTreeMap::new(), FAR_FUTURE);
    assert_eq!(
        dex.divest(ctx(admin()), &params),
        Err(AmmError::InsufficientBalance)
    );
}

#[test]
fn divest_imbalanced_matches_one_coin() {
    let mut one_coin = make_dex(0);
    let pool_id = add_pool(&mut one_coin, &[1_000_000_000_000, 1_000_000_000_000], 100_000, standard_fees());
    let mut imbalanced = one_coin.clone();
    let shares = 1_000_000_000;

    let Ok(quote) = one_coin.calc_divest_one_coin(pool_id, shares, 0, 0) else {
        panic!("quote");
    };
    let params = DivestOneCoinParams::new(pool_id, shares, 0, 1, FAR_FUTURE);
    let Ok(receipt) = one_coin.divest_one_coin(ctx(admin()), &params) else {
        panic!("divest one coin");
    };
    assert_eq!(receipt.amount_out(), quote);
    assert_eq!(receipt.burned(), shares);

    let mut wanted = BTreeMap::new();
    wanted.insert(0, quote);
    let params = DivestImbalancedParams::new(pool_id, wanted, shares * 2, FAR_FUTURE);
    let Ok(receipt) = imbalanced.divest_imbalanced(ctx(admin()), &params) else {
        panic!("divest imbalanced");
    };
    assert!(receipt.burned().abs_diff(shares) <= shares / 1_000_000);
    assert_eq!(total_out(&receipt), quote);
}

#[test]
fn last_shares_leave_only_through_balanced_divest() {
    let mut dex = make_dex(0);
    let pool_id = add_pool(&mut dex, &[1_000_000, 1_000_000], 100, standard_fees());
    let shares = dex.get_balance(admin(), pool_id);

    let params = DivestOneCoinParams::new(pool_id, shares, 0, 1, FAR_FUTURE);
    assert_eq!(
        dex.divest_one_coin(ctx(admin()), &params),
        Err(AmmError::InsufficientLiquidity)
    );
    assert_eq!(dex.get_balance(admin(), pool_id), shares);
    assert_eq!(dex.get_reserves(pool_id), Ok(vec![1_000_000, 1_000_000]));

    let receipt = divest(&mut dex, admin(), pool_id, shares);
    assert_eq!(total_out(&receipt), 2_000_000);
    assert_eq!(dex.get_reserves(pool_id), Ok(vec![0, 0]));
}

#[test]
fn divest_imbalanced_respects_max_shares() {
    let mut dex = make_dex(0);
    let pool_id = add_pool(&mut dex, &[1_000_000_000, 1_000_000_000], 100, standard_fees());
    let params = DivestImbalancedParams::new(pool_id, amounts(&[1_000_000, 0]), 10, FAR_FUTURE);
    assert!(matches!(
        dex.divest_imbalanced(ctx(admin()), &params),
        Err(AmmError::SlippageExceeded(_))
    ));
}

#[test]
fn pools_are_isolated() {
    let mut dex = make_dex(0);
    let pool_a = add_pool(&mut dex, &[1_000_000_000, 1_000_000_000], 100, standard_fees());
    let pool_b = add_pool(&mut dex, &[1_000_000_000, 1_000_000_000, 1_000_000_000], 100, standard_fees());
    assert_ne!(pool_a, pool_b);

    let Ok(before) = dex.get_dy(pool_a, 0, 1, 1_000_000, 0) else {
        panic!("quote");
    };
    swap(&mut dex, pool_b, 0, 1, 100_000_000);
    let Ok(after) = dex.get_dy(pool_a, 0, 1, 1_000_000, 0) else {
        panic!("quote");
    };
    assert_eq!(before, after);
}

#[test]
fn lp_fees_split_evenly() {
    let mut dex = make_dex(0);
    let pool_id = add_pool(&mut dex, &[1_000_000_000_000, 1_000_000_000_000], 100_000, standard_fees());
    let a = invest(&mut dex, alice(), pool_id, &[100_000_000_000, 100_000_000_000], None).minted();
    let b = invest(&mut dex, bob(), pool_id, &[100_000_000_000, 100_000_000_000], None).minted();

    for _ in 0..5 {
        swap(&mut dex, pool_id, 0, 1, 10_000_000_000);
    }

    let alice_total = total_out(&divest(&mut dex, alice(), pool_id, a));
    let bob_total = total_out(&divest(&mut dex, bob(), pool_id, b));
    assert!(alice_total > 200_000_000_000);
    assert!(bob_total > 200_000_000_000);
    assert!(alice_total.abs_diff(bob_total) <= 1);
}

// ---------------------------------------------------------------------------
// Mixed precision and rates
// ---------------------------------------------------------------------------

#[test]
fn mixed_decimals_trade_at_par() {
    let mut dex = make_dex(0);
    let pool_id = mixed_decimals_pool(&mut dex, lp_fee_only(300));

    let out = swap(&mut dex, pool_id, 0, 1, ONE_E18).amount_out();
    assert!(out < 1_000_000, "got {out}");
    assert!(out > 999_000, "got {out}");

    let back = swap(&mut dex, pool_id, 1, 0, 1_000_000).amount_out();
    assert!(back < ONE_E18, "got {back}");
    assert!(back > ONE_E18 / 1_000 * 999, "got {back}");
    assert_eq!(dex.get_dy(pool_id, 1, 0, 1_000_000, 0).map(|q| q < ONE_E18), Ok(true));
}

#[test]
fn mixed_decimals_invest_is_valued_in_common_units() {
    let mut fine_only = make_dex(0);
    let pool_id = mixed_decimals_pool(&mut fine_only, FeeConfig::ZERO);
    let mut coarse_only = fine_only.clone();
    let mut balanced = fine_only.clone();

    let fine = invest(&mut fine_only, trader(), pool_id, &[ONE_E18, 0], None).minted();
    let coarse = invest(&mut coarse_only, trader(), pool_id, &[0, 1_000_000], None).minted();
    let even = invest(&mut balanced, trader(), pool_id, &[ONE_E18 / 2, 500_000], None).minted();

    // Shares are denominated in the common 18-decimal unit.
    assert!(even.abs_diff(ONE_E18) <= ONE_E18 / 1_000_000, "balanced minted {even}");
    assert!(fine.abs_diff(coarse) <= fine / 1_000_000, "{fine} vs {coarse}");
    assert!(fine < even);
    assert!(fine > even / 1_000 * 999);
}

#[test]
fn mixed_decimals_divest_one_coin() {
    let mut dex = make_dex(0);
    let pool_id = mixed_decimals_pool(&mut dex, standard_fees());
    let mut other = dex.clone();

    let params = DivestOneCoinParams::new(pool_id, ONE_E18, 1, 1, FAR_FUTURE);
    let Ok(receipt) = dex.divest_one_coin(ctx(admin()), &params) else {
        panic!("divest into the 6-decimal token");
    };
    let coarse = receipt.amount_out();
    assert!(coarse <= 1_000_000 && coarse > 999_000, "got {coarse}");
    assert_eq!(
        receipt.transfers(),
        &[Transfer::new(custody(), admin(), coarse, token(1))]
    );

    let params = DivestOneCoinParams::new(pool_id, ONE_E18, 0, 1, FAR_FUTURE);
    let Ok(receipt) = other.divest_one_coin(ctx(admin()), &params) else {
        panic!("divest into the 18-decimal token");
    };
    let fine = receipt.amount_out();
    assert!(fine <= ONE_E18 && fine > ONE_E18 / 1_000 * 999, "got {fine}");
}

#[test]
fn non_unit_rate_prices_at_the_peg() {
    let mut dex = make_dex(0);
    // Token 1 is worth 1.05 units of token 0; both sides hold about 1e24
    // in common units.
    let rate = 1_050_000_000_000_000_000;
    let (Ok(base), wrapped) = (
        TokenInfo::canonical(1, 1_000_000 * ONE_E18),
        TokenInfo::new(rate, 1, 952_380_952_380_952_380_952_380),
    ) else {
        panic!("valid token info");
    };
    let pool_id = add_pool_with(&mut dex, vec![base, wrapped], 100, lp_fee_only(300));

    let Ok(quote) = dex.get_dy(pool_id, 1, 0, ONE_E18, 0) else {
        panic!("quote");
    };
    let out = swap(&mut dex, pool_id, 1, 0, ONE_E18).amount_out();
    assert_eq!(out, quote);
    assert!(out < ONE_E18 / 100 * 105, "got {out}");
    assert!(out > ONE_E18 / 100 * 104, "got {out}");

    let out = swap(&mut dex, pool_id, 0, 1, ONE_E18).amount_out();
    // 1 / 1.05 = 0.95238...
    assert!(out < 952_381_000_000_000_000, "got {out}");
    assert!(out > 950_000_000_000_000_000, "got {out}");
}

// ---------------------------------------------------------------------------
// Fees and claims
// ---------------------------------------------------------------------------

#[test]
fn referral_fee_from_imbalanced_invest() {
    let mut dex = make_dex(0);
    let pool_id = add_pool(&mut dex, &[1_000_000_000_000, 1_000_000_000_000], 100_000, FeeConfig::ZERO);
    let Ok(_) = dex.set_fees(ctx(admin()), pool_id, standard_fees()) else {
        panic!("set fees");
    };

    invest(&mut dex, trader(), pool_id, &[100_000_000, 100_000_000], Some(alice()));
    for k in 0..2 {
        assert_eq!(
            dex.claim_referral(ctx(alice()), token(k), 1),
            Err(AmmError::InsufficientEscrow)
        );
    }

    invest(&mut dex, trader(), pool_id, &[100_000_000, 100_000], Some(alice()));
    for k in 0..2 {
        let Ok(receipt) = dex.claim_referral(ctx(alice()), token(k), 1_248) else {
            panic!("claim referral");
        };
        assert_eq!(
            receipt.transfers(),
            &[Transfer::new(custody(), alice(), 1_248, token(k))]
        );
        assert_eq!(
            dex.claim_referral(ctx(alice()), token(k), 1),
            Err(AmmError::InsufficientEscrow)
        );
    }
}

#[test]
fn developer_fee_from_imbalanced_invest() {
    let mut dex = make_dex(0);
    let pool_id = add_pool(&mut dex, &[1_000_000_000_000, 1_000_000_000_000], 100_000, FeeConfig::ZERO);
    assert!(matches!(
        dex.set_dev_fee(ctx(admin()), FeeRate::new(20)),
        Err(AmmError::Unauthorized(_))
    ));
    let Ok(_) = dex.set_dev_fee(ctx(developer()), FeeRate::new(20)) else {
        panic!("set dev fee");
    };

    invest(&mut dex, trader(), pool_id, &[100_000_000, 100_000_000], Some(alice()));
    assert_eq!(
        dex.claim_developer(ctx(developer()), token(0), 1),
        Err(AmmError::InsufficientEscrow)
    );

    invest(&mut dex, trader(), pool_id, &[100_000_000, 100_000], Some(alice()));
    assert!(matches!(
        dex.claim_developer(ctx(alice()), token(0), 499),
        Err(AmmError::Unauthorized(_))
    ));
    for k in 0..2 {
        assert_eq!(dex.get_developer_balance(token(k)), 499);
        let Ok(receipt) = dex.claim_developer(ctx(developer()), token(k), 499) else {
            panic!("claim developer");
        };
        assert_eq!(
            receipt.transfers(),
            &[Transfer::new(custody(), developer(), 499, token(k))]
        );
    }
    assert_eq!(dex.get_developer_balance(token(0)), 0);
}

#[test]
fn fees_above_total_precision_are_rejected() {
    let mut dex = make_dex(500_000);
    let pool_id = add_pool(&mut dex, &[1_000_000, 1_000_000], 100, FeeConfig::ZERO);
    let Ok(fees) = FeeConfig::new(FeeRate::new(600_000), FeeRate::ZERO, FeeRate::ZERO) else {
        panic!("valid fees");
    };
    assert!(matches!(
        dex.set_fees(ctx(admin()), pool_id, fees),
        Err(AmmError::InvalidFee(_))
    ));
    assert!(matches!(
        dex.set_fees(ctx(alice()), pool_id, FeeConfig::ZERO),
        Err(AmmError::Unauthorized(_))
    ));
}

// ---------------------------------------------------------------------------
// Staking
// ---------------------------------------------------------------------------

#[test]
fn staking_reward_paid_exactly_once() {
    let mut dex = make_dex(0);
    let pool_id = add_pool(&mut dex, &[100_000_000, 100_000_000], 1_000_000, standard_fees());

    let receipt = stake(&mut dex, admin(), StakeAction::Add { pool_id, amount: 20 });
    assert!(receipt.transfers().is_empty());
    assert_eq!(dex.get_frozen_balance(admin(), pool_id), 20);

    swap(&mut dex, pool_id, 0, 1, 1_000_000);
    let Ok(pending) = dex.get_staker_info(admin(), pool_id) else {
        panic!("staker info");
    };
    assert_eq!(pending, vec![0, 19]);

    let receipt = stake(&mut dex, admin(), StakeAction::Remove { pool_id, amount: 10 });
    assert_eq!(
        receipt.transfers(),
        &[Transfer::new(custody(), admin(), 19, token(1))]
    );

    let receipt = stake(&mut dex, admin(), StakeAction::Remove { pool_id, amount: 10 });
    assert!(receipt.transfers().is_empty());
    assert_eq!(dex.get_frozen_balance(admin(), pool_id), 0);

    assert_eq!(
        dex.stake(ctx(admin()), StakeAction::Remove { pool_id, amount: 1 }),
        Err(AmmError::InsufficientBalance)
    );
}

#[test]
fn staking_rewards_in_every_token() {
    let mut dex = make_dex(0);
    let pool_id = add_pool(&mut dex, &[100_000_000, 100_000_000, 100_000_000], 1_000_000, standard_fees());
    stake(&mut dex, admin(), StakeAction::Add { pool_id, amount: 20 });

    swap(&mut dex, pool_id, 0, 1, 1_000_000);
    swap(&mut dex, pool_id, 1, 2, 1_000_000);
    swap(&mut dex, pool_id, 2, 0, 1_000_000);

    let receipt = stake(&mut dex, admin(), StakeAction::Remove { pool_id, amount: 0 });
    let transfers = receipt.transfers();
    assert_eq!(transfers.len(), 3);
    for (k, transfer) in transfers.iter().enumerate() {
        assert_eq!(transfer.token, token(k as u8));
        assert!(transfer.amount.abs_diff(20) <= 1);
    }
}

#[test]
fn staking_rewards_are_proportional() {
    let mut dex = make_dex(0);
    let pool_id = add_pool(&mut dex, &[100_000_000, 100_000_000], 1_000_000, standard_fees());
    let Ok(_) = dex.transfer(
        ctx(admin()),
        &[TransferBatch::new(
            admin(),
            vec![
                TransferLeg::new(alice(), pool_id, 1_000_000),
                TransferLeg::new(bob(), pool_id, 1_000_000),
            ],
        )],
    ) else {
        panic!("share transfer");
    };

    stake(&mut dex, alice(), StakeAction::Add { pool_id, amount: 77 });
    stake(&mut dex, bob(), StakeAction::Add { pool_id, amount: 77 });
    swap(&mut dex, pool_id, 0, 1, 10_000_000);

    for who in [alice(), bob()] {
        let receipt = stake(&mut dex, who, StakeAction::Remove { pool_id, amount: 77 });
        assert_eq!(
            receipt.transfers(),
            &[Transfer::new(custody(), who, 99, token(1))]
        );
    }
}

#[test]
fn late_staker_earns_only_later_fees() {
    let mut dex = make_dex(0);
    let pool_id = add_pool(&mut dex, &[100_000_000, 100_000_000], 1_000_000, standard_fees());
    let Ok(_) = dex.transfer(
        ctx(admin()),
        &[TransferBatch::new(
            admin(),
            vec![
                TransferLeg::new(alice(), pool_id, 333_333),
                TransferLeg::new(bob(), pool_id, 333_333),
            ],
        )],
    ) else {
        panic!("share transfer");
    };

    stake(&mut dex, alice(), StakeAction::Add { pool_id, amount: 333_333 });
    swap(&mut dex, pool_id, 0, 1, 10_000_000);
    stake(&mut dex, bob(), StakeAction::Add { pool_id, amount: 333_333 });
    swap(&mut dex, pool_id, 0, 1, 10_000_000);

    let alice_reward = total_out(&stake(&mut dex, alice(), StakeAction::Remove { pool_id, amount: 0 }));
    let bob_reward = total_out(&stake(&mut dex, bob(), StakeAction::Remove { pool_id, amount: 0 }));
    assert!(alice_reward.abs_diff(300) <= 2, "alice got {alice_reward}");
    assert!(bob_reward.abs_diff(100) <= 2, "bob got {bob_reward}");
}

#[test]
fn dust_swap_pays_zero_and_accrues_nothing() {
    let mut dex = make_dex(0);
    let pool_id = add_pool(&mut dex, &[1_000_000_000_000, 1_000_000_000_000], 100_000, standard_fees());
    stake(&mut dex, admin(), StakeAction::Add { pool_id, amount: 20 });

    let params = SwapParams::new(pool_id, 0, 1, 1, 0, FAR_FUTURE).with_referral(alice());
    let Ok(receipt) = dex.swap(ctx(trader()), &params) else {
        panic!("swap");
    };
    assert_eq!(receipt.transfers().len(), 2);
    assert_eq!(receipt.transfers()[1].amount, 0);

    let receipt = stake(&mut dex, admin(), StakeAction::Remove { pool_id, amount: 20 });
    assert!(receipt.transfers().is_empty());
    assert_eq!(dex.get_referral_balance(alice(), token(1)), 0);
    assert_eq!(dex.get_developer_balance(token(1)), 0);
}

#[test]
fn staker_fee_below_accumulator_resolution_stays_in_reserves() {
    let mut dex = make_dex(20);
    let reserve = 1_000_000_000_000_000_000_000_000;
    let pool_id = add_pool(&mut dex, &[reserve, reserve], 100_000, standard_fees());
    let all_shares = dex.get_balance(admin(), pool_id);
    stake(&mut dex, admin(), StakeAction::Add { pool_id, amount: all_shares });

    let receipt = swap(&mut dex, pool_id, 0, 1, 1_000_000_000_000_000_000);
    let Ok(reserves) = dex.get_reserves(pool_id) else {
        panic!("reserves");
    };
    // Only the trader's output and the developer fee leave the pool.
    assert_eq!(
        reserve - reserves[1],
        receipt.amount_out() + dex.get_developer_balance(token(1))
    );
    assert_eq!(dex.get_staker_info(admin(), pool_id), Ok(vec![0, 0]));

    let receipt = stake(&mut dex, admin(), StakeAction::Remove { pool_id, amount: all_shares });
    assert!(receipt.transfers().is_empty());
}

#[test]
fn zero_stake_leaves_no_position_behind() {
    let mut dex = make_dex(0);
    let pool_id = add_pool(&mut dex, &[100_000_000, 100_000_000], 1_000_000, standard_fees());
    stake(&mut dex, admin(), StakeAction::Add { pool_id, amount: 20 });
    swap(&mut dex, pool_id, 0, 1, 1_000_000);

    for action in [
        StakeAction::Add { pool_id, amount: 0 },
        StakeAction::Remove { pool_id, amount: 0 },
    ] {
        let receipt = stake(&mut dex, bob(), action);
        assert!(receipt.transfers().is_empty());
        assert!(dex.ledger().entry(bob(), pool_id).is_none());
    }

    // A stale reward checkpoint does not keep an emptied position alive.
    let Ok(_) = dex.transfer(
        ctx(admin()),
        &[TransferBatch::new(admin(), vec![TransferLeg::new(alice(), pool_id, 10)])],
    ) else {
        panic!("share transfer");
    };
    stake(&mut dex, alice(), StakeAction::Add { pool_id, amount: 10 });
    stake(&mut dex, alice(), StakeAction::Remove { pool_id, amount: 10 });
    let Ok(_) = dex.transfer(
        ctx(alice()),
        &[TransferBatch::new(alice(), vec![TransferLeg::new(admin(), pool_id, 10)])],
    ) else {
        panic!("share transfer");
    };
    assert!(dex.ledger().entry(alice(), pool_id).is_none());
}

// ---------------------------------------------------------------------------
// Share ledger
// ---------------------------------------------------------------------------

#[test]
fn batched_transfer_cannot_double_spend() {
    let mut dex = make_dex(0);
    let pool_id = add_pool(&mut dex, &[1_000_000, 1_000_000], 100, FeeConfig::ZERO);
    let Ok(_) = dex.transfer(
        ctx(admin()),
        &[TransferBatch::new(admin(), vec![TransferLeg::new(alice(), pool_id, 10_000)])],
    ) else {
        panic!("fund alice");
    };

    let batch = TransferBatch::new(
        alice(),
        vec![
            TransferLeg::new(bob(), pool_id, 5_000),
            TransferLeg::new(trader(), pool_id, 6_000),
        ],
    );
    assert_eq!(
        dex.transfer(ctx(alice()), &[batch]),
        Err(AmmError::InsufficientBalance)
    );
    assert_eq!(dex.get_balance(alice(), pool_id), 10_000);
    assert_eq!(dex.get_balance(bob(), pool_id), 0);
}

#[test]
fn operators_move_shares_for_owner() {
    let mut dex = make_dex(0);
    let pool_id = add_pool(&mut dex, &[1_000_000, 1_000_000], 100, FeeConfig::ZERO);
    let batch = TransferBatch::new(admin(), vec![TransferLeg::new(bob(), pool_id, 100)]);

    assert!(matches!(
        dex.transfer(ctx(alice()), std::slice::from_ref(&batch)),
        Err(AmmError::Unauthorized(_))
    ));

    let grant = OperatorUpdate::Add(OperatorParam::new(admin(), alice(), pool_id));
    let Ok(_) = dex.update_operators(ctx(admin()), &[grant]) else {
        panic!("grant operator");
    };
    assert!(dex.is_operator(admin(), alice(), pool_id));
    let Ok(_) = dex.transfer(ctx(alice()), &[batch]) else {
        panic!("operator transfer");
    };
    assert_eq!(dex.get_balance(bob(), pool_id), 100);

    let unknown = TransferBatch::new(admin(), vec![TransferLeg::new(bob(), PoolId::new(9), 1)]);
    assert_eq!(
        dex.transfer(ctx(admin()), &[unknown]),
        Err(AmmError::PoolNotFound)
    );
}

// ---------------------------------------------------------------------------
// Administration
// ---------------------------------------------------------------------------

#[test]
fn add_pool_is_admin_only_and_unique() {
    let mut dex = make_dex(0);
    let config = pool_config(&[1_000_000, 1_000_000], 100, FeeConfig::ZERO);
    assert!(matches!(
        dex.add_pool(ctx(alice()), &config),
        Err(AmmError::Unauthorized(_))
    ));

    let Ok(receipt) = dex.add_pool(ctx(admin()), &config) else {
        panic!("pool added");
    };
    assert_eq!(receipt.pool_id(), Some(PoolId::new(0)));
    assert_eq!(receipt.transfers().len(), 2);
    assert_eq!(dex.get_balance(admin(), PoolId::new(0)), receipt.minted());
    assert_eq!(dex.pool_id_of(&[token(1), token(0)]), Some(PoolId::new(0)));

    assert_eq!(
        dex.add_pool(ctx(admin()), &config),
        Err(AmmError::AlreadyInitialized)
    );
    let next = add_pool(&mut dex, &[1_000_000, 1_000_000, 1_000_000], 100, FeeConfig::ZERO);
    assert_eq!(next, PoolId::new(1));
}

#[test]
fn duplicate_tokens_are_rejected() {
    let info = vec![TokenInfo::new(RATE_PRECISION, 1, 10); 2];
    assert!(matches!(
        PoolConfig::new(vec![token(0), token(0)], info, 100, FeeConfig::ZERO),
        Err(AmmError::InvalidTokenSet(_))
    ));
    let info = vec![TokenInfo::new(RATE_PRECISION, 1, 10); 5];
    let tokens = (0..5).map(token).collect();
    assert!(matches!(
        PoolConfig::new(tokens, info, 100, FeeConfig::ZERO),
        Err(AmmError::InvalidTokenSet(_))
    ));
}

#[test]
fn reinitialising_equals_invest_after_full_divest() {
    let config = pool_config(&[1_000_000, 1_000_000], 1_000_000, FeeConfig::ZERO);
    let mut via_add = make_dex(0);
    let pool_id = add_pool(&mut via_add, &[1_000_000, 1_000_000], 1_000_000, FeeConfig::ZERO);
    swap(&mut via_add, pool_id, 0, 1, 1_000);
    let shares = via_add.get_balance(admin(), pool_id);
    divest(&mut via_add, admin(), pool_id, shares);
    let mut via_invest = via_add.clone();

    let Ok(_) = via_add.add_pool(ctx(admin()), &config) else {
        panic!("reinitialised");
    };
    invest(&mut via_invest, admin(), pool_id, &[1_000_000, 1_000_000], None);

    assert_eq!(via_add, via_invest);
    assert_eq!(via_add.pool_count(), 1);
}

#[test]
fn ramp_moves_monotonically_then_holds() {
    let mut dex = make_dex(0);
    let pool_id = add_pool(&mut dex, &[1_000_000, 1_000_000], 100, FeeConfig::ZERO);
    let start = MIN_RAMP_TIME;
    let end = start + 2 * MIN_RAMP_TIME;

    assert!(matches!(
        dex.ramp_a(CallContext::new(admin(), 10), pool_id, 1_000, end),
        Err(AmmError::RampWindowViolation(_))
    ));
    assert!(matches!(
        dex.ramp_a(CallContext::new(admin(), start), pool_id, 1_001, end),
        Err(AmmError::RampWindowViolation(_))
    ));
    let Ok(_) = dex.ramp_a(CallContext::new(admin(), start), pool_id, 1_000, end) else {
        panic!("ramp started");
    };

    let mut previous = 100;
    for step in 0..=20 {
        let now = start + (end - start) * step / 20;
        let Ok(a) = dex.get_a(pool_id, now) else {
            panic!("A");
        };
        assert!(a >= previous);
        previous = a;
    }
    assert_eq!(dex.get_a(pool_id, end), Ok(1_000));
    assert_eq!(dex.get_a(pool_id, end + 1_000_000), Ok(1_000));

    let mid = start + MIN_RAMP_TIME;
    let Ok(frozen) = dex.get_a(pool_id, mid) else {
        panic!("A");
    };
    let Ok(_) = dex.stop_ramp_a(CallContext::new(admin(), mid), pool_id) else {
        panic!("ramp stopped");
    };
    assert_eq!(dex.get_a(pool_id, end), Ok(frozen));
}

// ---------------------------------------------------------------------------
// Atomicity and determinism
// ---------------------------------------------------------------------------

#[test]
fn failed_transfer_rolls_back_call() {
    let mut dex = make_dex(0);
    let pool_id = add_pool(&mut dex, &[1_000_000_000, 1_000_000_000], 100, standard_fees());
    let before = dex.clone();

    let call = Call::Swap(SwapParams::new(pool_id, 0, 1, 1_000_000, 0, FAR_FUTURE));
    let mut seen = 0;
    let mut failing = |_: &Transfer| -> Result<()> {
        seen += 1;
        if seen == 2 {
            return Err(AmmError::TokenTransferFailed("receiver rejected".into()));
        }
        Ok(())
    };
    assert_eq!(
        dex.execute(&call, ctx(trader()), &mut failing),
        Err(AmmError::TokenTransferFailed("receiver rejected".into()))
    );
    assert_eq!(dex, before);

    let mut log = TransferLog::new();
    let Ok(receipt) = dex.execute(&call, ctx(trader()), &mut log) else {
        panic!("swap");
    };
    assert_eq!(log.transfers(), receipt.transfers());
    assert_ne!(dex, before);
}

#[test]
fn identical_call_sequences_give_identical_state() {
    let calls = vec![
        Call::AddPool(pool_config(&[1_000_000_000, 2_000_000_000, 1_500_000_000], 500, standard_fees())),
        Call::Invest(InvestParams::new(PoolId::new(0), amounts(&[10_000, 0, 7]), 1, FAR_FUTURE).with_referral(alice())),
        Call::Swap(SwapParams::new(PoolId::new(0), 0, 2, 5_000_000, 0, FAR_FUTURE)),
        Call::Stake(StakeAction::Add { pool_id: PoolId::new(0), amount: 1_000 }),
        Call::Swap(SwapParams::new(PoolId::new(0), 2, 1, 3_000_000, 0, FAR_FUTURE)),
        Call::DivestOneCoin(DivestOneCoinParams::new(PoolId::new(0), 1_000_000, 1, 1, FAR_FUTURE)),
    ];
    let senders = [admin(), alice(), trader(), admin(), trader(), admin()];

    let run = || {
        let mut dex = make_dex(10);
        let mut log = TransferLog::new();
        for (call, sender) in calls.iter().zip(senders) {
            let Ok(_) = dex.execute(call, ctx(sender), &mut log) else {
                panic!("call succeeded");
            };
        }
        (dex, log)
    };
    let (first, first_log) = run();
    let (second, second_log) = run();
    assert_eq!(first, second);
    assert_eq!(first_log, second_log);

    let Ok(a) = serde_json::to_vec(&first) else {
        panic!("serialise");
    };
    let Ok(b) = serde_json::to_vec(&second) else {
        panic!("serialise");
    };
    assert_eq!(a, b);

    let Ok(restored) = serde_json::from_slice::<Dex>(&a) else {
        panic!("deserialise");
    };
    assert_eq!(restored, first);
}
