//! IIP-39: end Best Yield liquidity mining and add the Morpho Steakhouse
//! USDC adapter to idleUSDC.
//!
//! The controller rate goes to zero, outstanding IDLE accrued by the
//! treasury multisig is claimed, the AA_steakUSDC tranche is wired into
//! idleUSDC, and two treasury moves fund the multisig: 66490 IDLE from the
//! ecosystem fund and 125000 USDC from the fee treasury.

use crate::addresses::{self, ADDR_0};
use crate::abi::AbiValue;
use crate::checks::Checker;
use crate::contracts::{Erc20, IdleController, GOVERNABLE_FUND_TRANSFER};
use crate::executor::Executor;
use crate::output;
use crate::proposal::ProposalBuilder;
use crate::provider::Transport;
use crate::tasks::{one, set_all, TaskContext};
use alloy_primitives::{address, Address, U256};

pub const NAME: &str = "iip-39";

const DESCRIPTION: &str = "IIP-39: Stop Best Yield LM distribution. Add AA_steakUSDC tranche to \
    idleUSDC. Transfer funds to the Treasury League multisig \
    https://gov.idle.finance/t/iip-39-best-yield-upgrades-and-funds-transfer/1300";

/// Adapter between idleUSDC and the AA steakUSDC tranche.
const STEAK_USDC_WRAPPER: Address = address!("96dd27112bdd615c3a2d649fe22d8ee27e448152");

/// AA tranche token of the Morpho Steakhouse USDC vault.
const AA_STEAK_USDC: Address = address!("2b0e31b8ee653d2077db86dea3acf3f34ae9d5d2");

pub async fn run<T: Transport>(ctx: &TaskContext<'_, T>) -> eyre::Result<()> {
    output::task_header(NAME, DESCRIPTION);
    let provider = ctx.provider;

    let idle_amount = U256::from(66_490u64) * one(18);
    let usdc_amount = U256::from(125_000u64) * one(6);
    let receiver = addresses::TREASURY_MULTISIG;
    output::param(&format!("IDLE from ecosystem fund: {idle_amount}"));
    output::param(&format!("USDC from fee treasury: {usdc_amount}"));
    output::param(&format!("new adapter: {STEAK_USDC_WRAPPER} for {AA_STEAK_USDC}"));

    let idle = Erc20::new(provider, addresses::IDLE);
    let usdc = Erc20::new(provider, addresses::USDC);
    let controller = IdleController::new(provider, addresses::IDLE_CONTROLLER);

    let params = set_all::params_for_set_all(
        provider,
        addresses::IDLE_USDC_V4,
        STEAK_USDC_WRAPPER,
        AA_STEAK_USDC,
        ADDR_0,
    )
    .await?;

    let idle_before = idle.balance_of(receiver).await?;
    let usdc_before = usdc.balance_of(receiver).await?;
    let ecosystem_before = idle.balance_of(addresses::ECOSYSTEM_FUND).await?;
    let fee_treasury_before = usdc.balance_of(addresses::FEE_TREASURY).await?;

    let mut builder = ProposalBuilder::new().add_contract_action(
        addresses::IDLE_CONTROLLER,
        IdleController::<T>::SET_IDLE_RATE,
        vec![AbiValue::Uint(U256::ZERO)],
    )?;
    builder = builder.add_contract_action(
        addresses::IDLE_CONTROLLER,
        IdleController::<T>::CLAIM_IDLE,
        vec![
            AbiValue::AddressArray(vec![receiver]),
            AbiValue::AddressArray(addresses::ALL_IDLE_TOKENS_BEST.to_vec()),
        ],
    )?;
    builder = builder.add_action(params.action(addresses::IDLE_USDC_V4)?);
    let proposal = builder
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
    checker.check(
        controller.idle_rate().await? == U256::ZERO,
        "controller idleRate is zero",
    );
    for token in addresses::ALL_IDLE_TOKENS_BEST {
        checker.check(
            controller.idle_speed(token).await? == U256::ZERO,
            &format!("idle speed for {token} is zero"),
        );
    }

    checker.check(
        idle.balance_of(addresses::ECOSYSTEM_FUND).await? == ecosystem_before - idle_amount,
        "ecosystem fund IDLE balance dropped by the transfer",
    );
    // The claim action also moves IDLE to the multisig, so the received
    // amount is at least the explicit transfer.
    checker.check(
        idle.balance_of(receiver).await? >= idle_before + idle_amount,
        "treasury multisig received the IDLE plus claims",
    );
    checker.check(
        usdc.balance_of(addresses::FEE_TREASURY).await? == fee_treasury_before - usdc_amount,
        "fee treasury USDC balance dropped by the transfer",
    );
    checker.check(
        usdc.balance_of(receiver).await? == usdc_before + usdc_amount,
        "treasury multisig received the USDC",
    );

    set_all::check_effects(
        provider,
        &mut checker,
        addresses::IDLE_USDC_V4,
        &params,
        STEAK_USDC_WRAPPER,
        AA_STEAK_USDC,
        ADDR_0,
    )
    .await?;

    checker.summary();
    Ok(())
}
