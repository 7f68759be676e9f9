use super::{read, send};
use crate::abi::{self, AbiValue};
use crate::provider::{Provider, ProviderError, Transport, TxReceipt};
use alloy_primitives::{Address, U256};

/// A Best Yield idleToken (IdleTokenGovernance interface).
pub struct IdleToken<'a, T: Transport> {
    provider: &'a Provider<T>,
    pub address: Address,
}

impl<'a, T: Transport> IdleToken<'a, T> {
    pub fn new(provider: &'a Provider<T>, address: Address) -> Self {
        Self { provider, address }
    }

    pub async fn name(&self) -> Result<String, ProviderError> {
        let out = read(self.provider, self.address, "name()", &[]).await?;
        Ok(abi::decode_string(&out)?)
    }

    pub async fn total_supply(&self) -> Result<U256, ProviderError> {
        let out = read(self.provider, self.address, "totalSupply()", &[]).await?;
        Ok(abi::decode_u256(&out)?)
    }

    pub async fn balance_of(&self, owner: Address) -> Result<U256, ProviderError> {
        let out = read(
            self.provider,
            self.address,
            "balanceOf(address)",
            &[AbiValue::Address(owner)],
        )
        .await?;
        Ok(abi::decode_u256(&out)?)
    }

    /// The underlying asset (USDC for idleUSDC, etc).
    pub async fn token(&self) -> Result<Address, ProviderError> {
        let out = read(self.provider, self.address, "token()", &[]).await?;
        Ok(abi::decode_address(&out)?)
    }

    /// The account allowed to set allocations and trigger rebalances.
    pub async fn rebalancer(&self) -> Result<Address, ProviderError> {
        let out = read(self.provider, self.address, "rebalancer()", &[]).await?;
        Ok(abi::decode_address(&out)?)
    }

    pub async fn fee_address(&self) -> Result<Address, ProviderError> {
        let out = read(self.provider, self.address, "feeAddress()", &[]).await?;
        Ok(abi::decode_address(&out)?)
    }

    pub async fn get_gov_tokens(&self) -> Result<Vec<Address>, ProviderError> {
        let out = read(self.provider, self.address, "getGovTokens()", &[]).await?;
        Ok(abi::decode_address_array(&out)?)
    }

    /// `getAPRs()` returns the protocol token list alongside the APRs; the
    /// scripts only ever use the token list but both halves are decoded.
    pub async fn get_aprs(&self) -> Result<(Vec<Address>, Vec<U256>), ProviderError> {
        let out = read(self.provider, self.address, "getAPRs()", &[]).await?;
        Ok(abi::decode_address_and_u256_arrays(&out)?)
    }

    pub async fn get_allocations(&self) -> Result<Vec<U256>, ProviderError> {
        let out = read(self.provider, self.address, "getAllocations()", &[]).await?;
        Ok(abi::decode_u256_array(&out)?)
    }

    pub async fn protocol_wrappers(&self, protocol_token: Address) -> Result<Address, ProviderError> {
        let out = read(
            self.provider,
            self.address,
            "protocolWrappers(address)",
            &[AbiValue::Address(protocol_token)],
        )
        .await?;
        Ok(abi::decode_address(&out)?)
    }

    pub async fn gov_token_for(&self, protocol_token: Address) -> Result<Address, ProviderError> {
        let out = read(
            self.provider,
            self.address,
            "getProtocolTokenToGov(address)",
            &[AbiValue::Address(protocol_token)],
        )
        .await?;
        Ok(abi::decode_address(&out)?)
    }

    pub async fn set_allocations(
        &self,
        from: Address,
        allocations: &[U256],
    ) -> Result<TxReceipt, ProviderError> {
        send(
            self.provider,
            from,
            self.address,
            "setAllocations(uint256[])",
            &[AbiValue::UintArray(allocations.to_vec())],
        )
        .await
    }

    pub async fn rebalance(&self, from: Address) -> Result<TxReceipt, ProviderError> {
        send(self.provider, from, self.address, "rebalance()", &[]).await
    }

    pub async fn mint_idle_token(
        &self,
        from: Address,
        amount: U256,
        skip_whole_rebalance: bool,
        referral: Address,
    ) -> Result<TxReceipt, ProviderError> {
        send(
            self.provider,
            from,
            self.address,
            "mintIdleToken(uint256,bool,address)",
            &[
                AbiValue::Uint(amount),
                AbiValue::Bool(skip_whole_rebalance),
                AbiValue::Address(referral),
            ],
        )
        .await
    }

    pub async fn redeem_idle_token(
        &self,
        from: Address,
        amount: U256,
    ) -> Result<TxReceipt, ProviderError> {
        send(
            self.provider,
            from,
            self.address,
            "redeemIdleToken(uint256)",
            &[AbiValue::Uint(amount)],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::encode_args;
    use crate::provider::testing::MockTransport;
    use alloy_primitives::address;
    use serde_json::json;

    fn hex_response(data: Vec<u8>) -> serde_json::Value {
        json!(format!("0x{}", hex::encode(data)))
    }

    #[tokio::test]
    async fn test_get_aprs_decodes_both_arrays() {
        let tokens = vec![
            address!("16de59092dae5ccf4a1e6439d611fd0653f0bd01"),
            address!("5274891bec421b39d23760c04a6755ecb444797c"),
        ];
        let aprs = vec![U256::from(250), U256::from(310)];
        let body = encode_args(&[
            AbiValue::AddressArray(tokens.clone()),
            AbiValue::UintArray(aprs.clone()),
        ]);

        let mock = MockTransport::new();
        mock.push("eth_call", hex_response(body));
        let provider = Provider::new(mock);
        let idle_token = IdleToken::new(&provider, crate::addresses::IDLE_USDC_V4);

        let (got_tokens, got_aprs) = idle_token.get_aprs().await.unwrap();
        assert_eq!(got_tokens, tokens);
        assert_eq!(got_aprs, aprs);
    }

    #[tokio::test]
    async fn test_set_allocations_sends_from_rebalancer() {
        let mock = MockTransport::new();
        let provider = Provider::new(mock);
        let idle_token = IdleToken::new(&provider, crate::addresses::IDLE_USDC_V4);
        let rebalancer = crate::addresses::REBALANCER_MANAGER;

        let receipt = idle_token
            .set_allocations(rebalancer, &[U256::from(100_000u64), U256::ZERO])
            .await
            .unwrap();
        assert!(receipt.ok());

        let calls = provider.transport.calls.lock().unwrap();
        let (method, params) = &calls[0];
        assert_eq!(method, "eth_sendTransaction");
        assert_eq!(params[0]["from"], serde_json::to_value(rebalancer).unwrap());
    }
}
