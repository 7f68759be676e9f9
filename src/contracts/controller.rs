use super::{read, send};
use crate::abi::{self, AbiValue};
use crate::provider::{Provider, ProviderError, Transport, TxReceipt};
use alloy_primitives::{Address, U256};

/// The IdleController distributing IDLE to the Best Yield markets.
///
/// Rate/market setters are timelock-only and appear here solely so their
/// signatures are pinned for proposal actions; the scripts never call them
/// directly.
pub struct IdleController<'a, T: Transport> {
    provider: &'a Provider<T>,
    pub address: Address,
}

impl<'a, T: Transport> IdleController<'a, T> {
    pub const SET_IDLE_RATE: &'static str = "_setIdleRate(uint256)";
    pub const WITHDRAW_TOKEN: &'static str = "_withdrawToken(address,address,uint256)";
    pub const DROP_IDLE_MARKET: &'static str = "_dropIdleMarket(address)";
    pub const CLAIM_IDLE: &'static str = "claimIdle(address[],address[])";

    pub fn new(provider: &'a Provider<T>, address: Address) -> Self {
        Self { provider, address }
    }

    /// IDLE distributed per block across all markets.
    pub async fn idle_rate(&self) -> Result<U256, ProviderError> {
        let out = read(self.provider, self.address, "idleRate()", &[]).await?;
        Ok(abi::decode_u256(&out)?)
    }

    /// Per-market distribution speed.
    pub async fn idle_speed(&self, idle_token: Address) -> Result<U256, ProviderError> {
        let out = read(
            self.provider,
            self.address,
            "idleSpeeds(address)",
            &[AbiValue::Address(idle_token)],
        )
        .await?;
        Ok(abi::decode_u256(&out)?)
    }

    /// Whether a market is still listed (`markets(addr).isIdled`, the first
    /// field of the returned struct).
    pub async fn is_market_listed(&self, idle_token: Address) -> Result<bool, ProviderError> {
        let out = read(
            self.provider,
            self.address,
            "markets(address)",
            &[AbiValue::Address(idle_token)],
        )
        .await?;
        Ok(abi::decode_bool(&out)?)
    }

    /// Claim accrued IDLE for holders and/or markets. Callable by anyone.
    pub async fn claim_idle(
        &self,
        from: Address,
        holders: &[Address],
        idle_tokens: &[Address],
    ) -> Result<TxReceipt, ProviderError> {
        send(
            self.provider,
            from,
            self.address,
            Self::CLAIM_IDLE,
            &[
                AbiValue::AddressArray(holders.to_vec()),
                AbiValue::AddressArray(idle_tokens.to_vec()),
            ],
        )
        .await
    }

    /// Recompute per-market speeds from current rates. Callable by anyone.
    pub async fn refresh_idle_speeds(&self, from: Address) -> Result<TxReceipt, ProviderError> {
        send(self.provider, from, self.address, "refreshIdleSpeeds()", &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::testing::MockTransport;
    use serde_json::json;

    #[tokio::test]
    async fn test_idle_rate_decode() {
        let mock = MockTransport::new();
        // the IIP-23 target rate
        mock.push(
            "eth_call",
            json!(format!("0x{:064x}", 151_837_230_480_000_000u64)),
        );
        let provider = Provider::new(mock);
        let controller = IdleController::new(&provider, crate::addresses::IDLE_CONTROLLER);

        let rate = controller.idle_rate().await.unwrap();
        assert_eq!(rate, U256::from(151_837_230_480_000_000u64));
    }

    #[tokio::test]
    async fn test_market_listed_reads_first_word() {
        let mock = MockTransport::new();
        let mut body = vec![0u8; 64];
        body[31] = 1;
        mock.push("eth_call", json!(format!("0x{}", hex::encode(body))));
        let provider = Provider::new(mock);
        let controller = IdleController::new(&provider, crate::addresses::IDLE_CONTROLLER);

        assert!(controller
            .is_market_listed(crate::addresses::IDLE_WBTC_V4)
            .await
            .unwrap());
    }
}
