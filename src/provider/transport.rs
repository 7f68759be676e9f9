use async_trait::async_trait;
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::params::ArrayParams;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the RPC layer.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The node rejected the request or the connection failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// A response did not deserialize into the expected shape.
    #[error("Unexpected RPC response: {0}")]
    Response(#[from] serde_json::Error),

    /// Returned calldata could not be decoded.
    #[error(transparent)]
    Decode(#[from] crate::abi::AbiError),

    /// A hex quantity/blob field was malformed.
    #[error("Malformed hex in response: {0}")]
    Hex(#[from] hex::FromHexError),

    /// A transaction never got a receipt within the polling window.
    #[error("No receipt for transaction {0} after {1} attempts")]
    ReceiptTimeout(String, u32),
}

/// A JSON-RPC transport. Production uses [`HttpTransport`]; tests swap in an
/// in-memory mock, the same seam the node state readers use for storage.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, ProviderError>;
}

/// HTTP JSON-RPC transport over jsonrpsee.
pub struct HttpTransport {
    client: HttpClient,
}

impl HttpTransport {
    /// Connect to the node at `url`. Mainnet proposals can take a while to
    /// estimate and submit, so the request timeout is generous.
    pub fn new(url: &str) -> Result<Self, ProviderError> {
        let client = HttpClientBuilder::default()
            .request_timeout(Duration::from_secs(600))
            .build(url)
            .map_err(|e| ProviderError::Rpc(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, ProviderError> {
        let mut array = ArrayParams::new();
        for param in params {
            array
                .insert(param)
                .map_err(|e| ProviderError::Rpc(e.to_string()))?;
        }
        self.client
            .request(method, array)
            .await
            .map_err(|e| ProviderError::Rpc(e.to_string()))
    }
}
