//! Rebalance test harness for a Best Yield idleToken.
//!
//! Run after any proposal that touches an idleToken's adapter list. Two
//! phases: impersonate the rebalancer and move all funds per the given
//! allocation vector, then mint and fully redeem with a whale-funded test
//! account to confirm reward (gov) tokens still accrue.
//!
//! Invoked as a best-effort nested task: bad arguments are logged and
//! swallowed so the calling script's remaining checks still run.

use crate::addresses::{self, ADDR_0};
use crate::checks::Checker;
use crate::contracts::{Erc20, IdleToken};
use crate::output;
use crate::provider::{Provider, Transport};
use alloy_primitives::{Address, U256};

/// Allocation vectors are parts-per-hundred-thousand.
pub const FULL_ALLOCATION: u64 = 100_000;

/// Blocks mined between mint and redeem so rewards accrue.
const REWARD_BLOCKS: u64 = 1000;

/// Underlying amount minted by the test account, in whole tokens.
const MINT_UNITS: u64 = 100;

/// Arguments for a harness run.
#[derive(Debug, Clone)]
pub struct RebalanceTest {
    pub idle_token: Option<Address>,
    pub allocations: Vec<u64>,
    /// Funded source of underlying; defaults to the per-asset lookup.
    pub whale: Option<Address>,
    /// Whole tokens to park unlent on the idleToken before rebalancing.
    pub unlent: u64,
    pub account: Address,
    /// Reward tokens to track; empty means read them from the idleToken.
    pub gov_tokens: Vec<Address>,
}

impl Default for RebalanceTest {
    fn default() -> Self {
        Self {
            idle_token: None,
            allocations: Vec::new(),
            whale: None,
            unlent: 0,
            account: addresses::TEST_ACCOUNT,
            gov_tokens: Vec::new(),
        }
    }
}

impl RebalanceTest {
    pub fn for_token(idle_token: Address, allocations: Vec<u64>) -> Self {
        Self {
            idle_token: Some(idle_token),
            allocations,
            ..Self::default()
        }
    }
}

/// Run both harness phases. Missing or malformed arguments log an error and
/// return `Ok(())`.
pub async fn test_idle_token<T: Transport>(
    provider: &Provider<T>,
    args: &RebalanceTest,
) -> eyre::Result<()> {
    let Some(token_address) = args.idle_token else {
        output::error("missing idle token for rebalance test");
        return Ok(());
    };
    if args.allocations.is_empty() {
        output::error("missing allocations for rebalance test");
        return Ok(());
    }
    let total: u64 = args.allocations.iter().sum();
    if total != FULL_ALLOCATION {
        output::error(&format!(
            "allocations sum to {total}, expected {FULL_ALLOCATION}"
        ));
        return Ok(());
    }

    let idle_token = IdleToken::new(provider, token_address);
    let underlying_addr = idle_token.token().await?;
    let underlying = Erc20::new(provider, underlying_addr);
    let one_token = underlying.one_unit().await?;

    set_allocations_and_rebalance(provider, &idle_token, &underlying, one_token, args).await?;
    mint_and_redeem(provider, &idle_token, &underlying, one_token, args).await?;
    Ok(())
}

async fn set_allocations_and_rebalance<T: Transport>(
    provider: &Provider<T>,
    idle_token: &IdleToken<'_, T>,
    underlying: &Erc20<'_, T>,
    one_token: U256,
    args: &RebalanceTest,
) -> eyre::Result<()> {
    output::section("#### Testing setAllocations and rebalance");
    let name = idle_token.name().await?;
    output::kv("idleToken", &name);
    output::kv("decimals", &underlying.decimals().await?.to_string());
    output::kv(
        "total supply",
        &idle_token.total_supply().await?.to_string(),
    );

    if args.unlent > 0 {
        let whale = args
            .whale
            .unwrap_or_else(|| addresses::whale_for(underlying.address));
        provider.fund_and_impersonate(whale).await?;
        let amount = one_token * U256::from(args.unlent);
        underlying
            .transfer(whale, idle_token.address, amount)
            .await?;
        output::info("whale transfer complete");
    }

    let unlent = underlying.balance_of(idle_token.address).await? / one_token;
    output::kv("unlent balance", &unlent.to_string());

    let (protocol_tokens, _) = idle_token.get_aprs().await?;
    let current: Vec<String> = idle_token
        .get_allocations()
        .await?
        .iter()
        .map(|a| a.to_string())
        .collect();
    output::kv("curr allocations", &current.join(", "));

    let new_allocations: Vec<U256> = args.allocations.iter().map(|a| U256::from(*a)).collect();
    let rebalancer = idle_token.rebalancer().await?;
    provider.fund_and_impersonate(rebalancer).await?;
    idle_token
        .set_allocations(rebalancer, &new_allocations)
        .await?;
    let set: Vec<String> = idle_token
        .get_allocations()
        .await?
        .iter()
        .map(|a| a.to_string())
        .collect();
    output::info(&format!(
        "done setting allocations for {name} - {}",
        set.join(", ")
    ));

    output::info("rebalancing");
    let receipt = idle_token.rebalance(rebalancer).await?;
    output::gas("rebalancing done", receipt.gas_used.to::<u64>());

    let unlent = underlying.balance_of(idle_token.address).await? / one_token;
    output::kv("unlent balance", &unlent.to_string());

    for protocol_token in &protocol_tokens {
        let token = Erc20::new(provider, *protocol_token);
        let balance = token.balance_of(idle_token.address).await? / token.one_unit().await?;
        output::info(&format!(
            "token balance {} {} {}",
            token.name().await?,
            protocol_token,
            balance
        ));
    }
    Ok(())
}

async fn mint_and_redeem<T: Transport>(
    provider: &Provider<T>,
    idle_token: &IdleToken<'_, T>,
    underlying: &Erc20<'_, T>,
    one_token: U256,
    args: &RebalanceTest,
) -> eyre::Result<()> {
    output::section(&format!(
        "#### Testing mint and redeem for user: {}",
        args.account
    ));
    let account = args.account;
    let whale = args
        .whale
        .unwrap_or_else(|| addresses::whale_for(underlying.address));

    provider.fund_and_impersonate(whale).await?;
    let amount = one_token * U256::from(MINT_UNITS);
    underlying.transfer(whale, account, amount).await?;

    provider.fund_and_impersonate(account).await?;
    underlying
        .approve(account, idle_token.address, amount)
        .await?;
    idle_token
        .mint_idle_token(account, amount, true, ADDR_0)
        .await?;

    let gov_tokens = if args.gov_tokens.is_empty() {
        idle_token.get_gov_tokens().await?
    } else {
        args.gov_tokens.clone()
    };
    let mut before = Vec::with_capacity(gov_tokens.len());
    for gov in &gov_tokens {
        let token = Erc20::new(provider, *gov);
        before.push((
            token.name().await?,
            token.balance_of(account).await?,
            token.balance_of(idle_token.address).await?,
        ));
    }

    output::info(&format!("mining {REWARD_BLOCKS} blocks..."));
    provider.mine_blocks(REWARD_BLOCKS).await?;

    let balance = idle_token.balance_of(account).await?;
    idle_token.redeem_idle_token(account, balance).await?;

    let mut checker = Checker::new();
    for (gov, (name, user_before, contract_before)) in gov_tokens.iter().zip(before) {
        let token = Erc20::new(provider, *gov);
        let user_after = token.balance_of(account).await?;
        let contract_after = token.balance_of(idle_token.address).await?;
        checker.check(
            user_after > user_before,
            &format!(
                "gov token {name} balance increased ({user_before} -> {user_after}, \
                 contractBal {contract_before} -> {contract_after})"
            ),
        );
    }
    checker.summary();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::testing::MockTransport;

    // Bad arguments must not error: the harness is a nested best-effort
    // task, so it logs and returns without touching the chain.

    #[tokio::test]
    async fn test_missing_token_is_soft() {
        let provider = Provider::new(MockTransport::new());
        let args = RebalanceTest {
            allocations: vec![FULL_ALLOCATION],
            ..Default::default()
        };
        test_idle_token(&provider, &args).await.unwrap();
        assert_eq!(provider.transport.calls.lock().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_empty_allocations_is_soft() {
        let provider = Provider::new(MockTransport::new());
        let args = RebalanceTest::for_token(crate::addresses::IDLE_USDC_V4, vec![]);
        test_idle_token(&provider, &args).await.unwrap();
        assert_eq!(provider.transport.calls.lock().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_allocation_sum_enforced() {
        let provider = Provider::new(MockTransport::new());
        let args =
            RebalanceTest::for_token(crate::addresses::IDLE_USDC_V4, vec![50_000, 49_999]);
        test_idle_token(&provider, &args).await.unwrap();
        assert_eq!(provider.transport.calls.lock().unwrap().len(), 0);
    }
}
