//! IIP-36: Best Yield adapter shuffle plus fee routing cleanup.
//!
//! Adds the Clearpool Fasanara USDC tranche to idleUSDC, drops the last
//! adapter from idleWETH, points every Best Yield token's fee address at the
//! fee treasury, and sweeps the fee collector's stablecoin balances there.

use crate::addresses::{self, ADDR_0};
use crate::abi::AbiValue;
use crate::checks::Checker;
use crate::contracts::{
    Erc20, IdleToken, FEE_COLLECTOR_WITHDRAW, IDLE_TOKEN_SET_FEE_ADDRESS,
};
use crate::executor::Executor;
use crate::output;
use crate::proposal::ProposalBuilder;
use crate::provider::Transport;
use crate::tasks::{set_all, TaskContext};
use alloy_primitives::{address, Address};

pub const NAME: &str = "iip-36";

const DESCRIPTION: &str = "IIP-36: Add Clearpool Fasanara USDC to idleUSDC Best Yield. Remove the \
    unused idleWETH adapter. Route fees to the Fee Treasury \
    https://gov.idle.finance/t/iip-36-by-upgrades-and-fees-management/1233";

/// Adapter between idleUSDC and the AA Clearpool Fasanara USDC tranche.
const CP_FAS_USDC_WRAPPER: Address = address!("3e9a5c91ec8b5022e88d1c2599fe3cd98406d898");

/// AA tranche token of the Clearpool Fasanara USDC pool.
const AA_CP_FAS_USDC: Address = address!("3872418402d1e967889ac609731fc9e11f438de5");

pub async fn run<T: Transport>(ctx: &TaskContext<'_, T>) -> eyre::Result<()> {
    output::task_header(NAME, DESCRIPTION);
    let provider = ctx.provider;

    let usdc_params = set_all::params_for_set_all(
        provider,
        addresses::IDLE_USDC_V4,
        CP_FAS_USDC_WRAPPER,
        AA_CP_FAS_USDC,
        ADDR_0,
    )
    .await?;
    let weth_params = set_all::params_for_set_all(
        provider,
        addresses::IDLE_WETH_V4,
        ADDR_0,
        ADDR_0,
        ADDR_0,
    )
    .await?;

    let usdc = Erc20::new(provider, addresses::USDC);
    let usdt = Erc20::new(provider, addresses::USDT);
    let dai = Erc20::new(provider, addresses::DAI);
    let collector = addresses::FEE_COLLECTOR;
    let treasury = addresses::FEE_TREASURY;

    // The withdraw amounts are the collector's balances at assembly time.
    let usdc_amount = usdc.balance_of(collector).await?;
    let usdt_amount = usdt.balance_of(collector).await?;
    let dai_amount = dai.balance_of(collector).await?;
    output::param(&format!("fee collector USDC: {usdc_amount}"));
    output::param(&format!("fee collector USDT: {usdt_amount}"));
    output::param(&format!("fee collector DAI: {dai_amount}"));

    let usdc_treasury_before = usdc.balance_of(treasury).await?;
    let usdt_treasury_before = usdt.balance_of(treasury).await?;
    let dai_treasury_before = dai.balance_of(treasury).await?;

    let mut builder = ProposalBuilder::new()
        .add_action(usdc_params.action(addresses::IDLE_USDC_V4)?)
        .add_action(weth_params.action(addresses::IDLE_WETH_V4)?);
    for idle_token in addresses::ALL_IDLE_TOKENS_BEST {
        builder = builder.add_contract_action(
            idle_token,
            IDLE_TOKEN_SET_FEE_ADDRESS,
            vec![AbiValue::Address(treasury)],
        )?;
    }
    for (token, amount) in [
        (addresses::USDT, usdt_amount),
        (addresses::USDC, usdc_amount),
        (addresses::DAI, dai_amount),
    ] {
        builder = builder.add_contract_action(
            collector,
            FEE_COLLECTOR_WITHDRAW,
            vec![
                AbiValue::Address(token),
                AbiValue::Address(treasury),
                AbiValue::Uint(amount),
            ],
        )?;
    }
    let proposal = builder.set_description(DESCRIPTION).build()?;
    proposal.print_info();

    Executor::default()
        .execute_or_simulate(provider, &proposal, ctx.is_local)
        .await?;

    if !ctx.is_local {
        return Ok(());
    }

    let mut checker = Checker::new();
    for idle_token in addresses::ALL_IDLE_TOKENS_BEST {
        let fee_address = IdleToken::new(provider, idle_token).fee_address().await?;
        checker.check(
            fee_address == treasury,
            &format!("fee address of {idle_token} is the fee treasury"),
        );
    }
    checker.check(
        usdc.balance_of(treasury).await? == usdc_treasury_before + usdc_amount,
        "fee treasury received the collector's USDC",
    );
    checker.check(
        usdt.balance_of(treasury).await? == usdt_treasury_before + usdt_amount,
        "fee treasury received the collector's USDT",
    );
    checker.check(
        dai.balance_of(treasury).await? == dai_treasury_before + dai_amount,
        "fee treasury received the collector's DAI",
    );

    set_all::check_effects(
        provider,
        &mut checker,
        addresses::IDLE_USDC_V4,
        &usdc_params,
        CP_FAS_USDC_WRAPPER,
        AA_CP_FAS_USDC,
        ADDR_0,
    )
    .await?;
    set_all::check_effects(
        provider,
        &mut checker,
        addresses::IDLE_WETH_V4,
        &weth_params,
        ADDR_0,
        ADDR_0,
        ADDR_0,
    )
    .await?;

    checker.summary();
    Ok(())
}
