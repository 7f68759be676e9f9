//! IIP-35: halve Best Yield liquidity mining, swap in Clearpool adapters,
//! retire the idleWBTC market, and consolidate fee balances.
//!
//! idleUSDC and idleUSDT each get their last adapter replaced with a
//! Clearpool tranche wrapper. The controller rate drops to 250 IDLE/day and
//! idleWBTC is dropped from the controller entirely. The fee collector and
//! fee treasury sweep a basket of tokens to the treasury multisig.

use crate::addresses;
use crate::abi::AbiValue;
use crate::checks::Checker;
use crate::contracts::{
    Erc20, IdleController, FEE_COLLECTOR_WITHDRAW, GOVERNABLE_FUND_TRANSFER,
};
use crate::executor::Executor;
use crate::output;
use crate::proposal::ProposalBuilder;
use crate::provider::Transport;
use crate::tasks::{one, set_all, TaskContext};
use alloy_primitives::{address, Address, U256};

pub const NAME: &str = "iip-35";

const DESCRIPTION: &str = "IIP-35: Clearpool adapters for idleUSDC and idleUSDT Best Yield. Halve \
    LM distribution and deprecate idleWBTC. Consolidate fee funds \
    https://gov.idle.finance/t/iip-35-by-upgrades-lm-reduction/1221";

/// Adapter between idleUSDC and the AA Clearpool Portofino USDC tranche.
const CP_POR_USDC_WRAPPER: Address = address!("f1fdd2fbb34969b4cd034331d37a7360b0b75c51");

/// AA tranche token of the Clearpool Portofino USDC pool.
const AA_CP_POR_USDC: Address = address!("9cacd44cfdf22731bc99facf3531c809d56bd4a2");

/// Adapter between idleUSDT and the AA Clearpool Fasanara USDT tranche.
const CP_FAS_USDT_WRAPPER: Address = address!("ac64a8b5fae61b31f9edc6e3d15673039d8122b1");

/// AA tranche token of the Clearpool Fasanara USDT pool.
const AA_CP_FAS_USDT: Address = address!("0a6f2449c09769950cfb76f905ad11c341541f70");

/// Blocks per day on mainnet, used to express the rate as IDLE/day.
const BLOCKS_PER_DAY: u64 = 7160;

/// Speed comparisons allow 1% drift from block timing.
const SPEED_TOLERANCE_PCT: u64 = 1;

pub async fn run<T: Transport>(ctx: &TaskContext<'_, T>) -> eyre::Result<()> {
    output::task_header(NAME, DESCRIPTION);
    let provider = ctx.provider;

    let new_rate = U256::from(250u64) * one(18) / U256::from(BLOCKS_PER_DAY);
    output::param(&format!("new controller rate: {new_rate}"));

    let controller = IdleController::new(provider, addresses::IDLE_CONTROLLER);
    if ctx.is_local {
        // Speeds lag the rate until someone pokes the controller. Refresh
        // now so halved-speed comparisons start from a clean baseline.
        provider.fund_and_impersonate(addresses::TEST_ACCOUNT).await?;
        controller.refresh_idle_speeds(addresses::TEST_ACCOUNT).await?;
    }

    let remaining_markets = [
        addresses::IDLE_DAI_V4,
        addresses::IDLE_USDC_V4,
        addresses::IDLE_USDT_V4,
        addresses::IDLE_WETH_V4,
    ];
    let mut speeds_before = Vec::new();
    for market in remaining_markets {
        let speed = controller.idle_speed(market).await?;
        output::kv(&format!("speed {market}"), &speed.to_string());
        speeds_before.push(speed);
    }

    // Both edits replace whatever currently sits last in the adapter list.
    let usdc_old = last_adapter(provider, addresses::IDLE_USDC_V4).await?;
    let usdt_old = last_adapter(provider, addresses::IDLE_USDT_V4).await?;
    let usdc_params = set_all::params_for_set_all(
        provider,
        addresses::IDLE_USDC_V4,
        CP_POR_USDC_WRAPPER,
        AA_CP_POR_USDC,
        usdc_old,
    )
    .await?;
    let usdt_params = set_all::params_for_set_all(
        provider,
        addresses::IDLE_USDT_V4,
        CP_FAS_USDT_WRAPPER,
        AA_CP_FAS_USDT,
        usdt_old,
    )
    .await?;

    let treasury_multisig = addresses::TREASURY_MULTISIG;
    let collector_tokens = [addresses::STK_AAVE, addresses::SUSD, addresses::RAI];
    let treasury_tokens = [
        addresses::STK_AAVE,
        addresses::WETH,
        addresses::USDT,
        addresses::USDC,
    ];

    let mut collector_amounts = Vec::new();
    for token in collector_tokens {
        let amount = Erc20::new(provider, token)
            .balance_of(addresses::FEE_COLLECTOR)
            .await?;
        output::param(&format!("fee collector {token}: {amount}"));
        collector_amounts.push(amount);
    }
    let mut treasury_amounts = Vec::new();
    for token in treasury_tokens {
        let amount = Erc20::new(provider, token)
            .balance_of(addresses::FEE_TREASURY)
            .await?;
        output::param(&format!("fee treasury {token}: {amount}"));
        treasury_amounts.push(amount);
    }
    let mut multisig_before = Vec::new();
    for token in collector_tokens.iter().chain(treasury_tokens.iter()) {
        multisig_before.push(
            Erc20::new(provider, *token)
                .balance_of(treasury_multisig)
                .await?,
        );
    }

    let mut builder = ProposalBuilder::new()
        .add_action(usdc_params.action(addresses::IDLE_USDC_V4)?)
        .add_action(usdt_params.action(addresses::IDLE_USDT_V4)?)
        .add_contract_action(
            addresses::IDLE_CONTROLLER,
            IdleController::<T>::DROP_IDLE_MARKET,
            vec![AbiValue::Address(addresses::IDLE_WBTC_V4)],
        )?
        .add_contract_action(
            addresses::IDLE_CONTROLLER,
            IdleController::<T>::SET_IDLE_RATE,
            vec![AbiValue::Uint(new_rate)],
        )?;
    for (token, amount) in collector_tokens.iter().zip(&collector_amounts) {
        builder = builder.add_contract_action(
            addresses::FEE_COLLECTOR,
            FEE_COLLECTOR_WITHDRAW,
            vec![
                AbiValue::Address(*token),
                AbiValue::Address(treasury_multisig),
                AbiValue::Uint(*amount),
            ],
        )?;
    }
    for (token, amount) in treasury_tokens.iter().zip(&treasury_amounts) {
        builder = builder.add_contract_action(
            addresses::FEE_TREASURY,
            GOVERNABLE_FUND_TRANSFER,
            vec![
                AbiValue::Address(*token),
                AbiValue::Address(treasury_multisig),
                AbiValue::Uint(*amount),
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
    checker.check(
        controller.idle_rate().await? == new_rate,
        "controller idleRate updated",
    );
    checker.check(
        !controller.is_market_listed(addresses::IDLE_WBTC_V4).await?,
        "idleWBTC market dropped from the controller",
    );
    provider.fund_and_impersonate(addresses::TEST_ACCOUNT).await?;
    controller.refresh_idle_speeds(addresses::TEST_ACCOUNT).await?;
    for (market, before) in remaining_markets.iter().zip(&speeds_before) {
        let after = controller.idle_speed(*market).await?;
        checker.check_almost_equal(
            after,
            *before / U256::from(2u64),
            U256::from(SPEED_TOLERANCE_PCT),
            &format!("speed for {market} halved"),
        );
    }

    let amounts: Vec<U256> = collector_amounts
        .iter()
        .chain(treasury_amounts.iter())
        .copied()
        .collect();
    for ((token, amount), before) in collector_tokens
        .iter()
        .chain(treasury_tokens.iter())
        .zip(&amounts)
        .zip(&multisig_before)
    {
        let balance = Erc20::new(provider, *token).balance_of(treasury_multisig).await?;
        checker.check(
            balance == *before + *amount,
            &format!("treasury multisig received the swept {token}"),
        );
    }

    set_all::check_effects(
        provider,
        &mut checker,
        addresses::IDLE_USDC_V4,
        &usdc_params,
        CP_POR_USDC_WRAPPER,
        AA_CP_POR_USDC,
        usdc_old,
    )
    .await?;
    set_all::check_effects(
        provider,
        &mut checker,
        addresses::IDLE_USDT_V4,
        &usdt_params,
        CP_FAS_USDT_WRAPPER,
        AA_CP_FAS_USDT,
        usdt_old,
    )
    .await?;

    checker.summary();
    Ok(())
}

/// Last protocol token in an idleToken's current adapter list.
async fn last_adapter<T: Transport>(
    provider: &crate::provider::Provider<T>,
    idle_token: Address,
) -> eyre::Result<Address> {
    let (tokens, _) = crate::contracts::IdleToken::new(provider, idle_token)
        .get_aprs()
        .await?;
    tokens
        .last()
        .copied()
        .ok_or_else(|| eyre::eyre!("adapter list for {idle_token} is empty"))
}
