//! Shared plumbing for proposals that edit an idleToken's adapter list via
//! `setAllAvailableTokensAndWrappers`.
//!
//! The call replaces the whole list, so an add, a removal, or an in-place
//! replacement all start from the current on-chain list and rebuild it.
//! Which case applies is inferred from the (new, old) protocol token pair:
//! a zero new token removes the old one, a non-zero old token replaces it in
//! place, and otherwise the new token is appended.

use crate::abi::AbiValue;
use crate::addresses::{self, ADDR_0};
use crate::checks::Checker;
use crate::contracts::{Erc20, IdleToken, IDLE_TOKEN_SET_ALL};
use crate::harness::{self, RebalanceTest, FULL_ALLOCATION};
use crate::output;
use crate::proposal::{ProposalAction, ProposalError};
use crate::provider::{Provider, Transport};
use alloy_primitives::Address;

/// Full argument set for one `setAllAvailableTokensAndWrappers` call.
#[derive(Debug, Clone)]
pub struct SetAllParams {
    /// Adapter list before the edit, for post-execution comparisons.
    pub old_protocol_tokens: Vec<Address>,
    pub protocol_tokens: Vec<Address>,
    pub wrappers: Vec<Address>,
    /// Distinct reward tokens plus IDLE, in discovery order.
    pub gov_tokens: Vec<Address>,
    /// Per-adapter reward token, zero where an adapter has none.
    pub gov_tokens_equal_length: Vec<Address>,
}

impl SetAllParams {
    /// The proposal action applying these params to `idle_token`.
    pub fn action(&self, idle_token: Address) -> Result<ProposalAction, ProposalError> {
        ProposalAction::new(
            idle_token,
            IDLE_TOKEN_SET_ALL,
            vec![
                AbiValue::AddressArray(self.protocol_tokens.clone()),
                AbiValue::AddressArray(self.wrappers.clone()),
                AbiValue::AddressArray(self.gov_tokens.clone()),
                AbiValue::AddressArray(self.gov_tokens_equal_length.clone()),
            ],
        )
    }
}

/// Rebuild the adapter lists for `idle_token` with `new_protocol_token`
/// added, removed (`new_protocol_token == 0`), or substituted for
/// `old_protocol_token` in place.
pub async fn params_for_set_all<T: Transport>(
    provider: &Provider<T>,
    idle_token: Address,
    new_wrapper: Address,
    new_protocol_token: Address,
    old_protocol_token: Address,
) -> eyre::Result<SetAllParams> {
    let idle = IdleToken::new(provider, idle_token);
    let is_removing = new_protocol_token == ADDR_0;
    let is_replacing = old_protocol_token != ADDR_0;

    let (current_tokens, _) = idle.get_aprs().await?;
    if current_tokens.is_empty() {
        return Err(eyre::eyre!("adapter list for {idle_token} is empty"));
    }
    output::section(&format!(
        "Building setAll params for {} ({} adapters on-chain)",
        idle.name().await?,
        current_tokens.len()
    ));

    let mut protocol_tokens = Vec::new();
    let mut wrappers = Vec::new();
    let mut gov_tokens = Vec::new();
    let mut gov_tokens_equal_length = Vec::new();

    // When removing, the old token is the current last entry and the loop
    // simply stops short of it.
    let keep = current_tokens.len() - usize::from(is_removing);
    for &token in &current_tokens[..keep] {
        let gov = idle.gov_token_for(token).await?;
        if gov != ADDR_0 && !gov_tokens.contains(&gov) {
            gov_tokens.push(gov);
        }
        if is_replacing && token == old_protocol_token {
            output::param(&format!("replacing adapter for {token} with {new_protocol_token}"));
            protocol_tokens.push(new_protocol_token);
            wrappers.push(new_wrapper);
            gov_tokens_equal_length.push(ADDR_0);
            continue;
        }
        let wrapper = idle.protocol_wrappers(token).await?;
        output::param(&format!("keeping adapter {wrapper} for {token}"));
        protocol_tokens.push(token);
        wrappers.push(wrapper);
        gov_tokens_equal_length.push(gov);
    }

    if !is_removing && !is_replacing {
        output::param(&format!("appending adapter {new_wrapper} for {new_protocol_token}"));
        protocol_tokens.push(new_protocol_token);
        wrappers.push(new_wrapper);
        gov_tokens_equal_length.push(ADDR_0);
    }

    // IDLE itself is always distributed, independent of adapter rewards.
    gov_tokens.push(addresses::IDLE);

    Ok(SetAllParams {
        old_protocol_tokens: current_tokens,
        protocol_tokens,
        wrappers,
        gov_tokens,
        gov_tokens_equal_length,
    })
}

/// Re-read the adapter list after execution, compare it against the edit the
/// proposal was meant to make, then exercise the token with two full
/// rebalance rounds.
pub async fn check_effects<T: Transport>(
    provider: &Provider<T>,
    checker: &mut Checker,
    idle_token: Address,
    params: &SetAllParams,
    new_wrapper: Address,
    new_protocol_token: Address,
    old_protocol_token: Address,
) -> eyre::Result<()> {
    let idle = IdleToken::new(provider, idle_token);
    let is_removing = new_protocol_token == ADDR_0;
    let is_replacing = old_protocol_token != ADDR_0;

    let name = idle.name().await?;
    output::section(&format!("Checking effects on {name}"));

    let gov_after = idle.get_gov_tokens().await?;
    checker.check(
        gov_after.len() == params.gov_tokens.len(),
        &format!("{name}: gov token list has {} entries", params.gov_tokens.len()),
    );

    let (tokens_after, _) = idle.get_aprs().await?;
    if tokens_after.is_empty() {
        return Err(eyre::eyre!("adapter list for {idle_token} is empty"));
    }
    let old_len = params.old_protocol_tokens.len();
    if is_removing {
        checker.check(
            tokens_after.len() == old_len - 1,
            &format!("{name}: adapter list shrank to {}", old_len - 1),
        );
    } else if is_replacing {
        checker.check(
            tokens_after.len() == old_len,
            &format!("{name}: adapter list still has {old_len} entries"),
        );
    } else {
        checker.check(
            tokens_after.last() == Some(&new_protocol_token),
            &format!("{name}: new protocol token appended"),
        );
    }

    let replaced_idx = params
        .old_protocol_tokens
        .iter()
        .position(|t| *t == old_protocol_token);
    for (i, &token) in tokens_after.iter().enumerate() {
        let wrapper = idle.protocol_wrappers(token).await?;
        output::info(&format!("adapter {i}: token {token} wrapper {wrapper}"));
        if is_replacing && Some(i) == replaced_idx {
            checker.check(
                token == new_protocol_token,
                &format!("{name}: protocol token replaced at index {i}"),
            );
            checker.check(
                wrapper == new_wrapper,
                &format!("{name}: wrapper replaced at index {i}"),
            );
        }
        if !is_removing && !is_replacing && i == tokens_after.len() - 1 {
            checker.check(
                wrapper == new_wrapper,
                &format!("{name}: new wrapper appended at index {i}"),
            );
        }
    }

    // Route every unit of liquidity through the edited slot, then through a
    // different one, so both the new adapter and a survivor get exercised.
    let target_idx = match replaced_idx {
        Some(idx) if is_replacing => idx,
        _ => tokens_after.len() - 1,
    };
    harness::test_idle_token(
        provider,
        &RebalanceTest::for_token(idle_token, single_slot(tokens_after.len(), target_idx)),
    )
    .await?;

    let other_idx = usize::from(target_idx == 0);
    harness::test_idle_token(
        provider,
        &RebalanceTest::for_token(idle_token, single_slot(tokens_after.len(), other_idx)),
    )
    .await?;

    let underlying = Erc20::new(provider, idle.token().await?);
    output::kv(
        &format!("{name} underlying"),
        &underlying.name().await.unwrap_or_else(|_| "?".into()),
    );
    Ok(())
}

/// Allocation vector putting the full 100000 on one slot.
fn single_slot(len: usize, idx: usize) -> Vec<u64> {
    (0..len)
        .map(|i| if i == idx { FULL_ALLOCATION } else { 0 })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::testing::MockTransport;
    use alloy_primitives::{address, U256};
    use serde_json::{json, Value};

    const T1: Address = address!("1111111111111111111111111111111111111111");
    const T2: Address = address!("2222222222222222222222222222222222222222");
    const W1: Address = address!("aaa1111111111111111111111111111111111111");
    const W2: Address = address!("aaa2222222222222222222222222222222222222");
    const G1: Address = address!("ccc1111111111111111111111111111111111111");
    const NEW_TOKEN: Address = address!("bbb1111111111111111111111111111111111111");
    const NEW_WRAPPER: Address = address!("bbb2222222222222222222222222222222222222");

    fn addr_response(a: Address) -> Value {
        json!(format!("0x{}{}", "0".repeat(24), hex::encode(a)))
    }

    fn aprs_response(tokens: &[Address]) -> Value {
        let n = tokens.len();
        let mut data = Vec::new();
        data.extend_from_slice(&U256::from(64u64).to_be_bytes::<32>());
        data.extend_from_slice(&U256::from(64 + 32 + 32 * n as u64).to_be_bytes::<32>());
        data.extend_from_slice(&U256::from(n).to_be_bytes::<32>());
        for t in tokens {
            let mut word = [0u8; 32];
            word[12..].copy_from_slice(t.as_slice());
            data.extend_from_slice(&word);
        }
        data.extend_from_slice(&U256::from(n).to_be_bytes::<32>());
        for _ in tokens {
            data.extend_from_slice(&[0u8; 32]);
        }
        json!(format!("0x{}", hex::encode(data)))
    }

    fn string_response(s: &str) -> Value {
        let mut data = Vec::new();
        data.extend_from_slice(&U256::from(32u64).to_be_bytes::<32>());
        data.extend_from_slice(&U256::from(s.len()).to_be_bytes::<32>());
        data.extend_from_slice(s.as_bytes());
        data.resize(64 + s.len().div_ceil(32) * 32, 0);
        json!(format!("0x{}", hex::encode(data)))
    }

    /// Current list [T1, T2] with G1 rewarding T1 and nothing rewarding T2.
    fn queue_current_list(mock: &MockTransport, include_t1_wrapper: bool) {
        mock.push("eth_call", aprs_response(&[T1, T2]));
        mock.push("eth_call", string_response("Idle USDC"));
        mock.push("eth_call", addr_response(G1)); // gov for T1
        if include_t1_wrapper {
            mock.push("eth_call", addr_response(W1));
        }
        mock.push("eth_call", addr_response(ADDR_0)); // gov for T2
        mock.push("eth_call", addr_response(W2));
    }

    #[tokio::test]
    async fn test_params_append_new_adapter() {
        let mock = MockTransport::new();
        queue_current_list(&mock, true);
        let provider = Provider::new(mock);

        let params = params_for_set_all(
            &provider,
            addresses::IDLE_USDC_V4,
            NEW_WRAPPER,
            NEW_TOKEN,
            ADDR_0,
        )
        .await
        .unwrap();

        assert_eq!(params.old_protocol_tokens, vec![T1, T2]);
        assert_eq!(params.protocol_tokens, vec![T1, T2, NEW_TOKEN]);
        assert_eq!(params.wrappers, vec![W1, W2, NEW_WRAPPER]);
        assert_eq!(params.gov_tokens, vec![G1, addresses::IDLE]);
        assert_eq!(params.gov_tokens_equal_length, vec![G1, ADDR_0, ADDR_0]);
    }

    #[tokio::test]
    async fn test_params_remove_last_adapter() {
        let mock = MockTransport::new();
        // Only T1 survives, so only its gov and wrapper are read.
        mock.push("eth_call", aprs_response(&[T1, T2]));
        mock.push("eth_call", string_response("Idle USDC"));
        mock.push("eth_call", addr_response(G1));
        mock.push("eth_call", addr_response(W1));
        let provider = Provider::new(mock);

        let params =
            params_for_set_all(&provider, addresses::IDLE_USDC_V4, ADDR_0, ADDR_0, ADDR_0)
                .await
                .unwrap();

        assert_eq!(params.protocol_tokens, vec![T1]);
        assert_eq!(params.wrappers, vec![W1]);
        assert_eq!(params.gov_tokens, vec![G1, addresses::IDLE]);
        assert_eq!(params.gov_tokens_equal_length, vec![G1]);
    }

    #[tokio::test]
    async fn test_params_replace_in_place() {
        let mock = MockTransport::new();
        // T1 is replaced, so its wrapper is never read.
        queue_current_list(&mock, false);
        let provider = Provider::new(mock);

        let params =
            params_for_set_all(&provider, addresses::IDLE_USDC_V4, NEW_WRAPPER, NEW_TOKEN, T1)
                .await
                .unwrap();

        assert_eq!(params.protocol_tokens, vec![NEW_TOKEN, T2]);
        assert_eq!(params.wrappers, vec![NEW_WRAPPER, W2]);
        assert_eq!(params.gov_tokens, vec![G1, addresses::IDLE]);
        assert_eq!(params.gov_tokens_equal_length, vec![ADDR_0, ADDR_0]);
    }

    fn addr_array_response(tokens: &[Address]) -> Value {
        let mut data = Vec::new();
        data.extend_from_slice(&U256::from(32u64).to_be_bytes::<32>());
        data.extend_from_slice(&U256::from(tokens.len()).to_be_bytes::<32>());
        for t in tokens {
            let mut word = [0u8; 32];
            word[12..].copy_from_slice(t.as_slice());
            data.extend_from_slice(&word);
        }
        json!(format!("0x{}", hex::encode(data)))
    }

    #[tokio::test]
    async fn test_check_effects_rejects_empty_adapter_list() {
        let mock = MockTransport::new();
        mock.push("eth_call", string_response("Idle USDC"));
        mock.push("eth_call", addr_array_response(&[G1, addresses::IDLE]));
        mock.push("eth_call", aprs_response(&[]));
        let provider = Provider::new(mock);

        let params = SetAllParams {
            old_protocol_tokens: vec![T1, T2],
            protocol_tokens: vec![T1, T2, NEW_TOKEN],
            wrappers: vec![W1, W2, NEW_WRAPPER],
            gov_tokens: vec![G1, addresses::IDLE],
            gov_tokens_equal_length: vec![G1, ADDR_0, ADDR_0],
        };
        let mut checker = Checker::new();
        let res = check_effects(
            &provider,
            &mut checker,
            addresses::IDLE_USDC_V4,
            &params,
            NEW_WRAPPER,
            NEW_TOKEN,
            ADDR_0,
        )
        .await;
        assert!(res.is_err());
    }

    #[tokio::test]
    async fn test_params_reject_empty_adapter_list() {
        let mock = MockTransport::new();
        mock.push("eth_call", aprs_response(&[]));
        let provider = Provider::new(mock);

        let res =
            params_for_set_all(&provider, addresses::IDLE_USDC_V4, NEW_WRAPPER, NEW_TOKEN, ADDR_0)
                .await;
        assert!(res.is_err());
    }

    #[test]
    fn test_single_slot_sums_to_full() {
        let v = single_slot(4, 2);
        assert_eq!(v, vec![0, 0, FULL_ALLOCATION, 0]);
        assert_eq!(v.iter().sum::<u64>(), FULL_ALLOCATION);
    }

    #[test]
    fn test_action_encodes_four_arrays() {
        let params = SetAllParams {
            old_protocol_tokens: vec![],
            protocol_tokens: vec![address!("1111111111111111111111111111111111111111")],
            wrappers: vec![address!("2222222222222222222222222222222222222222")],
            gov_tokens: vec![addresses::IDLE],
            gov_tokens_equal_length: vec![ADDR_0],
        };
        let action = params.action(addresses::IDLE_USDC_V4).unwrap();
        assert_eq!(action.signature(), IDLE_TOKEN_SET_ALL);
        // Four dynamic heads plus four single-element array tails.
        assert_eq!(action.encoded_args().len(), 4 * 32 + 4 * 64);
    }
}
