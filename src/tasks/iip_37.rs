//! IIP-37: fund the Fasanara credit deal and the M3 Leagues budget.
//!
//! Two treasury moves to the treasury multisig: 150000 USDC from the fee
//! treasury and 337791 IDLE from the ecosystem fund.

use crate::addresses;
use crate::abi::AbiValue;
use crate::checks::Checker;
use crate::contracts::{Erc20, GOVERNABLE_FUND_TRANSFER};
use crate::executor::Executor;
use crate::output;
use crate::proposal::ProposalBuilder;
use crate::provider::Transport;
use crate::tasks::{one, TaskContext};
use alloy_primitives::U256;

pub const NAME: &str = "iip-37";

const DESCRIPTION: &str = "IIP-37: Transfer funds for the Fasanara deal and the M3 Leagues budget \
    to the Treasury League multisig \
    https://gov.idle.finance/t/m3-2023-leagues-mandates-budget/1177";

pub async fn run<T: Transport>(ctx: &TaskContext<'_, T>) -> eyre::Result<()> {
    output::task_header(NAME, DESCRIPTION);
    let provider = ctx.provider;

    let usdc_amount = U256::from(150_000u64) * one(6);
    let idle_amount = U256::from(337_791u64) * one(18);
    let receiver = addresses::TREASURY_MULTISIG;
    output::param(&format!("USDC from fee treasury: {usdc_amount}"));
    output::param(&format!("IDLE from ecosystem fund: {idle_amount}"));
    output::param(&format!("receiver: {receiver}"));

    let usdc = Erc20::new(provider, addresses::USDC);
    let idle = Erc20::new(provider, addresses::IDLE);
    let usdc_before = usdc.balance_of(receiver).await?;
    let idle_before = idle.balance_of(receiver).await?;

    let proposal = ProposalBuilder::new()
        .add_contract_action(
            addresses::ECOSYSTEM_FUND,
            GOVERNABLE_FUND_TRANSFER,
            vec![
                AbiValue::Address(addresses::IDLE),
                AbiValue::Address(receiver),
                AbiValue::Uint(idle_amount),
            ],
        )?
        .add_contract_action(
            addresses::FEE_TREASURY,
            GOVERNABLE_FUND_TRANSFER,
            vec![
                AbiValue::Address(addresses::USDC),
                AbiValue::Address(receiver),
                AbiValue::Uint(usdc_amount),
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
    let usdc_after = usdc.balance_of(receiver).await?;
    let idle_after = idle.balance_of(receiver).await?;
    checker.check(
        usdc_after == usdc_before + usdc_amount,
        "treasury multisig received the USDC",
    );
    checker.check(
        idle_after == idle_before + idle_amount,
        "treasury multisig received the IDLE",
    );
    output::kv("multisig USDC", &usdc_after.to_string());
    output::kv("multisig IDLE", &idle_after.to_string());
    checker.summary();
    Ok(())
}
