//! Thin JSON-RPC provider for the scripts.
//!
//! All on-chain traffic goes through [`Provider`], which wraps a [`Transport`]
//! so tests can drive the full task flow against an in-memory mock while the
//! binary talks to a hardhat/anvil fork or a live node over HTTP.
//!
//! The fork-control methods (`hardhat_*`, `evm_*`) only exist on a local
//! fork; calling them against a live node is a hard failure, which is the
//! desired behavior since no script should ever impersonate on mainnet.

pub mod transport;

pub use transport::{HttpTransport, ProviderError, Transport};

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

/// Receipt polling: hardhat auto-mines, so the first poll normally hits.
const RECEIPT_ATTEMPTS: u32 = 60;
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// An `eth_call`/`eth_estimateGas`/`eth_sendTransaction` request body.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    pub to: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<U256>,
}

impl CallRequest {
    pub fn call(to: Address, data: &[u8]) -> Self {
        Self {
            to,
            data: Some(format!("0x{}", hex::encode(data))),
            ..Default::default()
        }
    }

    pub fn from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }
}

/// The subset of the transaction receipt the scripts read.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    pub transaction_hash: B256,
    pub status: Option<U256>,
    pub gas_used: U256,
    pub block_number: Option<U256>,
}

impl TxReceipt {
    /// Whether the transaction executed successfully.
    pub fn ok(&self) -> bool {
        self.status.map(|s| s == U256::from(1)).unwrap_or(true)
    }
}

/// JSON-RPC provider over a pluggable transport.
pub struct Provider<T: Transport> {
    pub(crate) transport: T,
}

impl<T: Transport> Provider<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    async fn request<R: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<R, ProviderError> {
        let value = self.transport.request(method, params).await?;
        Ok(serde_json::from_value(value)?)
    }

    // ── Eth namespace ──────────────────────────────────────────────

    /// `eth_call` against the latest block; returns the raw return data.
    pub async fn call(&self, to: Address, data: &[u8]) -> Result<Vec<u8>, ProviderError> {
        let req = CallRequest::call(to, data);
        let hex_data: String = self
            .request("eth_call", vec![serde_json::to_value(&req)?, json!("latest")])
            .await?;
        Ok(hex::decode(hex_data.trim_start_matches("0x"))?)
    }

    /// `eth_sendTransaction` from an (impersonated) account, then wait for
    /// the receipt. Reverts surface as RPC errors and propagate.
    pub async fn send_transaction(
        &self,
        from: Address,
        to: Address,
        data: &[u8],
        value: U256,
    ) -> Result<TxReceipt, ProviderError> {
        let mut req = CallRequest::call(to, data).from(from);
        if !value.is_zero() {
            req.value = Some(value);
        }
        let hash: B256 = self
            .request("eth_sendTransaction", vec![serde_json::to_value(&req)?])
            .await?;
        self.wait_for_receipt(hash).await
    }

    /// `eth_sendRawTransaction` with a signed payload; returns the tx hash
    /// without waiting (live submissions are voted on by humans, not polled).
    pub async fn send_raw_transaction(&self, raw: &[u8]) -> Result<B256, ProviderError> {
        self.request(
            "eth_sendRawTransaction",
            vec![json!(format!("0x{}", hex::encode(raw)))],
        )
        .await
    }

    /// Poll for a transaction receipt.
    pub async fn wait_for_receipt(&self, hash: B256) -> Result<TxReceipt, ProviderError> {
        for _ in 0..RECEIPT_ATTEMPTS {
            let receipt: Option<TxReceipt> = self
                .request("eth_getTransactionReceipt", vec![serde_json::to_value(hash)?])
                .await?;
            if let Some(receipt) = receipt {
                return Ok(receipt);
            }
            tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
        }
        Err(ProviderError::ReceiptTimeout(
            format!("{hash}"),
            RECEIPT_ATTEMPTS,
        ))
    }

    pub async fn balance(&self, addr: Address) -> Result<U256, ProviderError> {
        self.request("eth_getBalance", vec![serde_json::to_value(addr)?, json!("latest")])
            .await
    }

    pub async fn block_number(&self) -> Result<u64, ProviderError> {
        let n: U256 = self.request("eth_blockNumber", vec![]).await?;
        Ok(n.to::<u64>())
    }

    pub async fn chain_id(&self) -> Result<u64, ProviderError> {
        let id: U256 = self.request("eth_chainId", vec![]).await?;
        Ok(id.to::<u64>())
    }

    pub async fn nonce(&self, addr: Address) -> Result<u64, ProviderError> {
        let n: U256 = self
            .request(
                "eth_getTransactionCount",
                vec![serde_json::to_value(addr)?, json!("pending")],
            )
            .await?;
        Ok(n.to::<u64>())
    }

    pub async fn gas_price(&self) -> Result<U256, ProviderError> {
        self.request("eth_gasPrice", vec![]).await
    }

    pub async fn estimate_gas(&self, req: &CallRequest) -> Result<u64, ProviderError> {
        let gas: U256 = self
            .request("eth_estimateGas", vec![serde_json::to_value(req)?])
            .await?;
        Ok(gas.to::<u64>())
    }

    // ── Fork control (hardhat/anvil only) ──────────────────────────

    pub async fn impersonate(&self, addr: Address) -> Result<(), ProviderError> {
        let _: Value = self
            .request("hardhat_impersonateAccount", vec![serde_json::to_value(addr)?])
            .await?;
        Ok(())
    }

    pub async fn set_balance(&self, addr: Address, balance: U256) -> Result<(), ProviderError> {
        let _: Value = self
            .request(
                "hardhat_setBalance",
                vec![serde_json::to_value(addr)?, json!(format!("0x{balance:x}"))],
            )
            .await?;
        Ok(())
    }

    /// Fund an account with plenty of ether and impersonate it.
    pub async fn fund_and_impersonate(&self, addr: Address) -> Result<(), ProviderError> {
        self.set_balance(addr, U256::from(0xffffffffffffffffu64)).await?;
        self.impersonate(addr).await
    }

    /// Mine `n` blocks in one `hardhat_mine` batch.
    pub async fn mine_blocks(&self, n: u64) -> Result<(), ProviderError> {
        let _: Value = self
            .request("hardhat_mine", vec![json!(format!("0x{n:x}"))])
            .await?;
        Ok(())
    }

    /// Mine a single block with `evm_mine`.
    pub async fn mine_one(&self) -> Result<(), ProviderError> {
        let _: Value = self.request("evm_mine", vec![]).await?;
        Ok(())
    }

    /// Advance the fork's clock by `secs` seconds.
    pub async fn increase_time(&self, secs: u64) -> Result<(), ProviderError> {
        let _: Value = self.request("evm_increaseTime", vec![json!(secs)]).await?;
        Ok(())
    }
}

// ── In-memory transport for tests ─────────────────────────────────

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use async_trait::async_trait;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    /// Mock transport: per-method FIFO queues of canned responses.
    ///
    /// Fork-control and transaction methods fall back to a benign default so
    /// a test only has to enqueue the reads it cares about.
    pub struct MockTransport {
        responses: Mutex<HashMap<String, VecDeque<Value>>>,
        pub calls: Mutex<Vec<(String, Vec<Value>)>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self {
                responses: Mutex::new(HashMap::new()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn push(&self, method: &str, response: Value) {
            self.responses
                .lock()
                .unwrap()
                .entry(method.to_string())
                .or_default()
                .push_back(response);
        }

        /// Number of recorded calls to `method`.
        pub fn count(&self, method: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|(m, _)| m == method)
                .count()
        }

        fn default_response(method: &str) -> Option<Value> {
            match method {
                "hardhat_impersonateAccount" | "hardhat_setBalance" | "hardhat_mine"
                | "evm_mine" | "evm_increaseTime" => Some(Value::Null),
                "eth_sendTransaction" => Some(json!(format!("0x{}", "11".repeat(32)))),
                "eth_getTransactionReceipt" => Some(json!({
                    "transactionHash": format!("0x{}", "11".repeat(32)),
                    "status": "0x1",
                    "gasUsed": "0x5208",
                    "blockNumber": "0x1",
                })),
                _ => None,
            }
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, ProviderError> {
            self.calls
                .lock()
                .unwrap()
                .push((method.to_string(), params));
            let queued = self
                .responses
                .lock()
                .unwrap()
                .get_mut(method)
                .and_then(|q| q.pop_front());
            match queued.or_else(|| Self::default_response(method)) {
                Some(v) => Ok(v),
                None => Err(ProviderError::Rpc(format!("no mock response for {method}"))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::MockTransport;
    use super::*;
    use alloy_primitives::address;

    #[tokio::test]
    async fn test_call_hex_round_trip() {
        let mock = MockTransport::new();
        mock.push("eth_call", json!(format!("0x{:064x}", 42)));
        let provider = Provider::new(mock);

        let to = address!("5274891bec421b39d23760c04a6755ecb444797c");
        let out = provider.call(to, &[0xde, 0xad]).await.unwrap();
        assert_eq!(out.len(), 32);
        assert_eq!(out[31], 42);
    }

    #[tokio::test]
    async fn test_call_params_shape() {
        let mock = MockTransport::new();
        mock.push("eth_call", json!("0x"));
        let provider = Provider::new(mock);
        let to = address!("5274891bec421b39d23760c04a6755ecb444797c");
        provider.call(to, &[0xa9, 0x05, 0x9c, 0xbb]).await.unwrap();

        let calls = provider.transport.calls.lock().unwrap();
        let (method, params) = &calls[0];
        assert_eq!(method, "eth_call");
        assert_eq!(params[0]["data"], json!("0xa9059cbb"));
        assert_eq!(params[1], json!("latest"));
    }

    #[tokio::test]
    async fn test_send_transaction_waits_for_receipt() {
        let mock = MockTransport::new();
        let provider = Provider::new(mock);
        let from = address!("b3c8e5534f0063545cbbb7ce86854bf42db8872b");
        let to = address!("5274891bec421b39d23760c04a6755ecb444797c");

        let receipt = provider
            .send_transaction(from, to, &[0x01], U256::ZERO)
            .await
            .unwrap();
        assert!(receipt.ok());
        assert_eq!(receipt.gas_used, U256::from(21000));
    }

    #[tokio::test]
    async fn test_set_balance_encodes_quantity() {
        let mock = MockTransport::new();
        let provider = Provider::new(mock);
        let addr = address!("e8ea8bae250028a8709a3841e0ae1a44820d677b");
        provider
            .set_balance(addr, U256::from(0xffu64))
            .await
            .unwrap();

        let calls = provider.transport.calls.lock().unwrap();
        assert_eq!(calls[0].1[1], json!("0xff"));
    }

    #[tokio::test]
    async fn test_mine_blocks_hex_count() {
        let mock = MockTransport::new();
        let provider = Provider::new(mock);
        provider.mine_blocks(1000).await.unwrap();
        let calls = provider.transport.calls.lock().unwrap();
        assert_eq!(calls[0].0, "hardhat_mine");
        assert_eq!(calls[0].1[0], json!("0x3e8"));
    }
}
