use super::{read, send};
use crate::abi;
use crate::provider::{Provider, ProviderError, Transport, TxReceipt};
use alloy_primitives::{Address, U256};

/// The gauge Distributor streaming IDLE to gauges.
pub struct Distributor<'a, T: Transport> {
    provider: &'a Provider<T>,
    pub address: Address,
}

impl<'a, T: Transport> Distributor<'a, T> {
    /// Rate change staged by governance, applied at the next epoch rollover.
    pub const SET_PENDING_RATE: &'static str = "setPendingRate(uint256)";

    pub fn new(provider: &'a Provider<T>, address: Address) -> Self {
        Self { provider, address }
    }

    /// Current emission rate per second.
    pub async fn rate(&self) -> Result<U256, ProviderError> {
        let out = read(self.provider, self.address, "rate()", &[]).await?;
        Ok(abi::decode_u256(&out)?)
    }

    /// Roll the distribution epoch forward, picking up any pending rate.
    /// Callable by anyone once enough time has passed.
    pub async fn update_distribution_parameters(
        &self,
        from: Address,
    ) -> Result<TxReceipt, ProviderError> {
        send(
            self.provider,
            from,
            self.address,
            "updateDistributionParameters()",
            &[],
        )
        .await
    }
}
