//! StableSwap settlement engine example.
//!
//! Creates a USDC / DAI pool (6 and 18 decimals), trades through it,
//! stakes shares, collects referral fees and exits.
//!
//! # Run
//!
//! ```bash
//! cargo run --example stableswap
//! ```

use std::collections::BTreeMap;

use hydra_stableswap::prelude::*;

const ONE_DAI: u128 = 1_000_000_000_000_000_000;
const ONE_USDC: u128 = 1_000_000;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    println!("=== StableSwap settlement engine ===\n");

    // ── 1. Identities and tokens ────────────────────────────────────────
    let admin = Address::from_bytes([1; 32]);
    let developer = Address::from_bytes([2; 32]);
    let custody = Address::from_bytes([3; 32]);
    let trader = Address::from_bytes([4; 32]);
    let referrer = Address::from_bytes([5; 32]);
    let usdc = TokenRef::simple(Address::from_bytes([10; 32]));
    let dai = TokenRef::native(Address::from_bytes([11; 32]), 0);

    // ── 2. Engine with a 0.002% developer fee ───────────────────────────
    let mut dex = Dex::new(DexConfig::new(admin, developer, custody, FeeRate::new(20))?)?;

    // ── 3. Pool: 10 M of each, A = 200 ──────────────────────────────────
    //    USDC has 6 decimals, so its precision multiplier is 1e12.
    let config = PoolConfig::new(
        vec![usdc, dai],
        vec![
            TokenInfo::canonical(1_000_000_000_000, 10_000_000 * ONE_USDC)?,
            TokenInfo::canonical(1, 10_000_000 * ONE_DAI)?,
        ],
        200,
        FeeConfig::new(FeeRate::new(300), FeeRate::new(100), FeeRate::new(100))?,
    )?;
    let receipt = dex.add_pool(CallContext::new(admin, 0), &config)?;
    let pool_id = receipt.pool_id().ok_or("add_pool returned no pool id")?;
    println!("Pool {pool_id} created");
    println!("  A:            {}", dex.get_a(pool_id, 0)?);
    println!("  Reserves:     {:?}", dex.get_reserves(pool_id)?);
    println!("  Total shares: {}", dex.get_total_shares(pool_id)?);

    // ── 4. Stake half of the admin's shares ─────────────────────────────
    let staked = dex.get_balance(admin, pool_id) / 2;
    dex.stake(
        CallContext::new(admin, 1),
        StakeAction::Add {
            pool_id,
            amount: staked,
        },
    )?;
    println!("\nAdmin staked {staked} shares");

    // ── 5. Swap 50 000 USDC for DAI through the host transfer log ──────
    let amount = 50_000 * ONE_USDC;
    let quote = dex.get_dy(pool_id, 0, 1, amount, 2)?;
    let call = Call::Swap(
        SwapParams::new(pool_id, 0, 1, amount, quote, 60).with_referral(referrer),
    );
    let mut log = TransferLog::new();
    let receipt = dex.execute(&call, CallContext::new(trader, 2), &mut log)?;
    println!("\nSwapped {amount} raw USDC for {} raw DAI", receipt.amount_out());
    for transfer in log.transfers() {
        println!(
            "  {} → {}: {} of {}",
            transfer.from, transfer.to, transfer.amount, transfer.token
        );
    }

    // ── 6. Harvest staking rewards and claim referral fees ──────────────
    println!("\nPending staker rewards: {:?}", dex.get_staker_info(admin, pool_id)?);
    let receipt = dex.stake(
        CallContext::new(admin, 3),
        StakeAction::Remove {
            pool_id,
            amount: staked,
        },
    )?;
    println!("Unstake paid {} transfer(s)", receipt.transfers().len());

    let referral = dex.get_referral_balance(referrer, dai);
    if referral > 0 {
        dex.claim_referral(CallContext::new(referrer, 4), dai, referral)?;
    }
    println!("Referrer claimed {referral} raw DAI");
    println!("Developer escrow: {} raw DAI", dex.get_developer_balance(dai));

    // ── 7. Withdraw 1 000 DAI worth of shares as USDC only ──────────────
    let shares = 1_000 * ONE_DAI;
    let out = dex.calc_divest_one_coin(pool_id, shares, 0, 5)?;
    let params = DivestOneCoinParams::new(pool_id, shares, 0, out, 60);
    dex.divest_one_coin(CallContext::new(admin, 5), &params)?;
    println!("\nBurned {shares} shares for {out} raw USDC");

    // ── 8. Balanced exit of everything left ─────────────────────────────
    let remaining = dex.get_balance(admin, pool_id);
    let params = DivestParams::new(pool_id, remaining, BTreeMap::new(), 60);
    let receipt = dex.divest(CallContext::new(admin, 6), &params)?;
    println!("Burned {remaining} shares for:");
    for transfer in receipt.transfers() {
        println!("  {} of {}", transfer.amount, transfer.token);
    }
    println!("Reserves now: {:?}", dex.get_reserves(pool_id)?);

    Ok(())
}
