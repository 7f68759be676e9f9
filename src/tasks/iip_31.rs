//! IIP-31: add the AA Euler staking tranche adapters to idleUSDT, idleUSDC
//! and idleWETH, zero the gauge distribution, and extend Best Yield
//! liquidity mining for three months at half rate.
//!
//! The gauge rate change is staged with setPendingRate and only lands at the
//! next epoch rollover, so the check skips a week ahead and rolls the epoch
//! by hand.

use crate::addresses::{self, ADDR_0};
use crate::abi::AbiValue;
use crate::checks::Checker;
use crate::contracts::{Distributor, Erc20, IdleController, GOVERNABLE_FUND_TRANSFER};
use crate::executor::Executor;
use crate::output;
use crate::proposal::ProposalBuilder;
use crate::provider::Transport;
use crate::tasks::{one, set_all, TaskContext};
use alloy_primitives::{address, Address, U256};

pub const NAME: &str = "iip-31";

const DESCRIPTION: &str = "IIP-31: Add AA Euler staking PYT wrappers to IdleUSDT, IdleUSDC and \
    IdleWETH. Set Gauges rate to 0. Extend LM (IdleController) for 3 months at half rate.";

/// Adapters between the idleTokens and the AA Euler staking tranches.
const E_USDT_WRAPPER: Address = address!("ab3919896975f43a81325b0ca98b72249e714e6c");
const E_USDC_WRAPPER: Address = address!("6c1a844e3077e6c39226c15b857436a6a92be5c0");
const E_WETH_WRAPPER: Address = address!("c24e0dd3a0bc6f19aeec2d7985dd3940d59db698");

/// AA tranche tokens of the Euler staking PYTs.
const AA_E_USDT_STAKING: Address = address!("6796fcd41e4fb26855bb9bdd7cad41128da1fd59");
const AA_E_USDC_STAKING: Address = address!("1e095cbf663491f15cc1bdb5919e701b27dde90c");
const AA_E_WETH_STAKING: Address = address!("2b7da260f101fb259710c0a4f2efef59f41c0810");

/// Blocks per day on mainnet.
const BLOCKS_PER_DAY: u64 = 7160;

/// Halved-speed comparisons absorb refresh timing drift.
const SPEED_TOLERANCE_PCT: u64 = 5;

/// One gauge epoch, after which the pending rate can be applied.
const EPOCH_SECS: u64 = 86_400 * 7;

pub async fn run<T: Transport>(ctx: &TaskContext<'_, T>) -> eyre::Result<()> {
    output::task_header(NAME, DESCRIPTION);
    let provider = ctx.provider;

    // 500 IDLE/day for 3 months, half the current rate: 500 * 30 * 3 = 45k.
    let lm_funds = U256::from(45_000u64) * one(18);
    let new_rate = U256::from(500u64) * one(18) / U256::from(BLOCKS_PER_DAY);
    output::param(&format!("IDLE for extended LM: {lm_funds}"));
    output::param(&format!("new controller rate: {new_rate}"));

    let idle = Erc20::new(provider, addresses::IDLE);
    let controller = IdleController::new(provider, addresses::IDLE_CONTROLLER);
    let distributor = Distributor::new(provider, addresses::GAUGE_DISTRIBUTOR);

    let edits = [
        (addresses::IDLE_USDT_V4, E_USDT_WRAPPER, AA_E_USDT_STAKING),
        (addresses::IDLE_USDC_V4, E_USDC_WRAPPER, AA_E_USDC_STAKING),
        (addresses::IDLE_WETH_V4, E_WETH_WRAPPER, AA_E_WETH_STAKING),
    ];
    let mut params = Vec::new();
    for (idle_token, wrapper, tranche) in edits {
        params.push(
            set_all::params_for_set_all(provider, idle_token, wrapper, tranche, ADDR_0).await?,
        );
    }

    if ctx.is_local {
        // Speeds lag the rate until someone pokes the controller.
        provider.fund_and_impersonate(addresses::TEST_ACCOUNT).await?;
        controller.refresh_idle_speeds(addresses::TEST_ACCOUNT).await?;
    }
    let markets = [
        addresses::IDLE_DAI_V4,
        addresses::IDLE_USDC_V4,
        addresses::IDLE_USDT_V4,
    ];
    let mut speeds_before = Vec::new();
    for market in markets {
        let speed = controller.idle_speed(market).await?;
        output::kv(&format!("speed {market}"), &speed.to_string());
        speeds_before.push(speed);
    }
    let controller_before = idle.balance_of(addresses::IDLE_CONTROLLER).await?;

    let mut builder = ProposalBuilder::new();
    for ((idle_token, _, _), p) in edits.iter().zip(&params) {
        builder = builder.add_action(p.action(*idle_token)?);
    }
    let proposal = builder
        .add_contract_action(
            addresses::GAUGE_DISTRIBUTOR,
            Distributor::<T>::SET_PENDING_RATE,
            vec![AbiValue::Uint(U256::ZERO)],
        )?
        .add_contract_action(
            addresses::ECOSYSTEM_FUND,
            GOVERNABLE_FUND_TRANSFER,
            vec![
                AbiValue::Address(addresses::IDLE),
                AbiValue::Address(addresses::IDLE_CONTROLLER),
                AbiValue::Uint(lm_funds),
            ],
        )?
        .add_contract_action(
            addresses::IDLE_CONTROLLER,
            IdleController::<T>::SET_IDLE_RATE,
            vec![AbiValue::Uint(new_rate)],
        )?
        .set_description(DESCRIPTION)
        .build()?;
    proposal.print_info();

    Executor::default()
        .execute_or_simulate(provider, &proposal, ctx.is_local)
        .await?;

    if !ctx.is_local {
        return Ok(());
    }

    let mut checker = Checker::new();
    for (market, before) in markets.iter().zip(&speeds_before) {
        checker.check_almost_equal(
            controller.idle_speed(*market).await?,
            *before / U256::from(2u64),
            U256::from(SPEED_TOLERANCE_PCT),
            &format!("speed for {market} halved"),
        );
    }
    checker.check(
        idle.balance_of(addresses::IDLE_CONTROLLER).await? == controller_before + lm_funds,
        "controller received the LM extension funds",
    );
    checker.check(
        controller.idle_rate().await? == new_rate,
        "controller idleRate updated",
    );

    // The zero gauge rate only applies once the epoch rolls over.
    provider.increase_time(EPOCH_SECS).await?;
    provider.mine_one().await?;
    provider.fund_and_impersonate(addresses::TEST_ACCOUNT).await?;
    distributor
        .update_distribution_parameters(addresses::TEST_ACCOUNT)
        .await?;
    checker.check(
        distributor.rate().await? == U256::ZERO,
        "gauge distribution rate is zero after the epoch rollover",
    );

    for ((idle_token, wrapper, tranche), p) in edits.iter().zip(&params) {
        set_all::check_effects(
            provider,
            &mut checker,
            *idle_token,
            p,
            *wrapper,
            *tranche,
            ADDR_0,
        )
        .await?;
    }

    checker.summary();
    Ok(())
}
