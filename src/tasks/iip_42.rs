//! IIP-42: fund the M1 2025 Leagues budget and stage the Timelock admin
//! handover to the treasury multisig for the token migration.
//!
//! setPendingAdmin is only step one of the handover; the multisig must call
//! acceptAdmin itself afterwards, so the check here stops at pendingAdmin.

use crate::addresses::{self, ADDR_0};
use crate::abi::AbiValue;
use crate::checks::Checker;
use crate::contracts::{Erc20, Timelock, FEE_COLLECTOR_WITHDRAW, GOVERNABLE_FUND_TRANSFER};
use crate::executor::Executor;
use crate::output;
use crate::proposal::ProposalBuilder;
use crate::provider::Transport;
use crate::tasks::{one, TaskContext};
use alloy_primitives::U256;

pub const NAME: &str = "iip-42";

const DESCRIPTION: &str = "IIP-42: Get Leagues funding for M1 2025. Transfer Timelock ownership \
    to TL multisig for token migration";

/// The fee treasury USDT balance drifts with ongoing fee flows, so only its
/// decrease is checked loosely; the multisig side is exact.
const FEE_TREASURY_TOLERANCE_PCT: u64 = 100;

pub async fn run<T: Transport>(ctx: &TaskContext<'_, T>) -> eyre::Result<()> {
    output::task_header(NAME, DESCRIPTION);
    let provider = ctx.provider;

    let receiver = addresses::TREASURY_MULTISIG;
    let usdt_amount = U256::from(95_000u64) * one(6);
    output::param(&format!("USDT from fee treasury: {usdt_amount}"));

    // Accumulated fees swept from the collector, denominated per token.
    let collector_sweeps = [
        (addresses::DAI, U256::from(351u64) * one(18)),
        (addresses::COMP, U256::from(298u64) * one(16)),
        (addresses::USDC, U256::from(81u64) * one(6)),
        (addresses::SUSD, U256::from(51u64) * one(18)),
        (addresses::WBTC, U256::from(474u64) * one(2)),
        (addresses::RAI, U256::from(1317u64) * one(16)),
        (addresses::TUSD, U256::from(2865u64) * one(16)),
    ];

    let timelock = Timelock::new(provider, addresses::TIMELOCK);
    let usdt = Erc20::new(provider, addresses::USDT);

    let pending_before = timelock.pending_admin().await?;
    output::kv("timelock pendingAdmin", &pending_before.to_string());

    let fee_treasury_usdt_before = usdt.balance_of(addresses::FEE_TREASURY).await?;
    let receiver_usdt_before = usdt.balance_of(receiver).await?;
    let mut receiver_before = Vec::new();
    for (token, _) in collector_sweeps {
        receiver_before.push(Erc20::new(provider, token).balance_of(receiver).await?);
    }

    let mut builder = ProposalBuilder::new()
        .add_contract_action(
            addresses::TIMELOCK,
            Timelock::<T>::SET_PENDING_ADMIN,
            vec![AbiValue::Address(receiver)],
        )?
        .add_contract_action(
            addresses::FEE_TREASURY,
            GOVERNABLE_FUND_TRANSFER,
            vec![
                AbiValue::Address(addresses::USDT),
                AbiValue::Address(receiver),
                AbiValue::Uint(usdt_amount),
            ],
        )?;
    for (token, amount) in collector_sweeps {
        builder = builder.add_contract_action(
            addresses::FEE_COLLECTOR,
            FEE_COLLECTOR_WITHDRAW,
            vec![
                AbiValue::Address(token),
                AbiValue::Address(receiver),
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
    checker.check(pending_before == ADDR_0, "no admin handover was staged before");
    checker.check(
        timelock.pending_admin().await? == receiver,
        "timelock pendingAdmin set to the treasury multisig",
    );

    checker.check_almost_equal(
        usdt.balance_of(addresses::FEE_TREASURY).await?,
        fee_treasury_usdt_before - usdt_amount,
        U256::from(FEE_TREASURY_TOLERANCE_PCT),
        "fee treasury USDT balance dropped by the transfer",
    );
    checker.check(
        usdt.balance_of(receiver).await? == receiver_usdt_before + usdt_amount,
        "treasury multisig received the USDT",
    );

    for ((token, amount), before) in collector_sweeps.iter().zip(&receiver_before) {
        let balance = Erc20::new(provider, *token).balance_of(receiver).await?;
        checker.check(
            balance == *before + *amount,
            &format!("treasury multisig received the swept {token}"),
        );
    }

    checker.summary();
    Ok(())
}
