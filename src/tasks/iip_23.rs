//! IIP-23: cut Best Yield liquidity mining to 1000 IDLE/day and top up the
//! gauge distributor.
//!
//! The controller hands 49000 surplus IDLE to the gauge distributor, sets a
//! lower per-block rate, and the ecosystem fund tops the distributor up with
//! another 60000 IDLE. On a fork the claim path is exercised three times: right
//! after execution, again after roughly six months of blocks, and once more
//! past the point where the budget must be exhausted.

use crate::addresses;
use crate::abi::AbiValue;
use crate::checks::Checker;
use crate::contracts::{Distributor, Erc20, IdleController, GOVERNABLE_FUND_TRANSFER};
use crate::executor::Executor;
use crate::output;
use crate::proposal::ProposalBuilder;
use crate::provider::{Provider, Transport};
use crate::tasks::{one, TaskContext};
use alloy_primitives::U256;

pub const NAME: &str = "iip-23";

const DESCRIPTION: &str = "IIP-23: Reduce LM distribution for Best Yield to 1000 IDLE/day. \
    Top up gauges distributor \
    https://gov.idle.finance/t/idle-incentives-distribution-update/1030";

/// 1000 IDLE/day at ~6570 blocks/day.
const NEW_IDLE_RATE: u64 = 151_837_230_480_000_000;

/// Roughly six months of mainnet blocks.
const HALF_YEAR_BLOCKS: u64 = 1_536_000;

/// Past the end of the distribution budget.
const PAST_BUDGET_BLOCKS: u64 = 192_000;

pub async fn run<T: Transport>(ctx: &TaskContext<'_, T>) -> eyre::Result<()> {
    output::task_header(NAME, DESCRIPTION);
    let provider = ctx.provider;

    let idle_from_controller = U256::from(49_000u64) * one(18);
    let idle_from_ecosystem = U256::from(60_000u64) * one(18);
    let new_rate = U256::from(NEW_IDLE_RATE);
    output::param(&format!("IDLE from controller: {idle_from_controller}"));
    output::param(&format!("IDLE from ecosystem fund: {idle_from_ecosystem}"));
    output::param(&format!("new controller rate: {new_rate}"));

    let idle = Erc20::new(provider, addresses::IDLE);
    let controller = IdleController::new(provider, addresses::IDLE_CONTROLLER);
    let distributor = Distributor::new(provider, addresses::GAUGE_DISTRIBUTOR);

    let controller_before = idle.balance_of(addresses::IDLE_CONTROLLER).await?;
    let distributor_before = idle.balance_of(addresses::GAUGE_DISTRIBUTOR).await?;
    let dai_speed_before = controller.idle_speed(addresses::IDLE_DAI_V4).await?;
    output::kv("distributor rate", &distributor.rate().await?.to_string());
    output::kv("controller IDLE", &controller_before.to_string());
    output::kv("idleDAI speed", &dai_speed_before.to_string());

    let proposal = ProposalBuilder::new()
        .add_contract_action(
            addresses::IDLE_CONTROLLER,
            IdleController::<T>::WITHDRAW_TOKEN,
            vec![
                AbiValue::Address(addresses::IDLE),
                AbiValue::Address(addresses::GAUGE_DISTRIBUTOR),
                AbiValue::Uint(idle_from_controller),
            ],
        )?
        .add_contract_action(
            addresses::IDLE_CONTROLLER,
            IdleController::<T>::SET_IDLE_RATE,
            vec![AbiValue::Uint(new_rate)],
        )?
        .add_contract_action(
            addresses::ECOSYSTEM_FUND,
            GOVERNABLE_FUND_TRANSFER,
            vec![
                AbiValue::Address(addresses::IDLE),
                AbiValue::Address(addresses::GAUGE_DISTRIBUTOR),
                AbiValue::Uint(idle_from_ecosystem),
            ],
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
    let controller_after = idle.balance_of(addresses::IDLE_CONTROLLER).await?;
    let distributor_after = idle.balance_of(addresses::GAUGE_DISTRIBUTOR).await?;
    checker.check(
        controller_after == controller_before - idle_from_controller,
        "controller IDLE balance dropped by the withdrawn amount",
    );
    checker.check(
        distributor_after == distributor_before + idle_from_controller + idle_from_ecosystem,
        "gauge distributor received both tranches",
    );
    checker.check(
        controller.idle_rate().await? == new_rate,
        "controller idleRate updated",
    );
    checker.check(
        controller.idle_speed(addresses::IDLE_DAI_V4).await? != dai_speed_before,
        "idleDAI speed changed with the new rate",
    );

    // Distribution must keep paying immediately, still pay half a year out,
    // and be dry past the budget horizon.
    let claimed_now = claim_for_idle_dai(provider, &idle).await?;
    checker.check(claimed_now.1 > claimed_now.0, "claimIdle pays out right away");

    provider.mine_blocks(HALF_YEAR_BLOCKS).await?;
    let claimed_later = claim_for_idle_dai(provider, &idle).await?;
    checker.check(
        claimed_later.1 > claimed_later.0,
        "claimIdle still pays after six months of blocks",
    );

    provider.mine_blocks(PAST_BUDGET_BLOCKS).await?;
    let claimed_dry = claim_for_idle_dai(provider, &idle).await?;
    checker.check(
        claimed_dry.1 == claimed_dry.0,
        "claimIdle pays nothing once the budget is spent",
    );

    checker.summary();
    Ok(())
}

/// Claim accrued IDLE for the idleDAI market itself and return the market's
/// IDLE balance (before, after). Accrual goes to the idleToken contract, not
/// to any holder, so the empty holder list is deliberate.
async fn claim_for_idle_dai<T: Transport>(
    provider: &Provider<T>,
    idle: &Erc20<'_, T>,
) -> eyre::Result<(U256, U256)> {
    let controller = IdleController::new(provider, addresses::IDLE_CONTROLLER);
    let account = addresses::TEST_ACCOUNT;
    provider.fund_and_impersonate(account).await?;
    let before = idle.balance_of(addresses::IDLE_DAI_V4).await?;
    controller
        .claim_idle(account, &[], &[addresses::IDLE_DAI_V4])
        .await?;
    let after = idle.balance_of(addresses::IDLE_DAI_V4).await?;
    output::kv("idleDAI claimed IDLE", &(after - before).to_string());
    Ok((before, after))
}
