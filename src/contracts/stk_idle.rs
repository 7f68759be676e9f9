use super::{read, send};
use crate::abi::{self, AbiValue};
use crate::provider::{Provider, ProviderError, Transport, TxReceipt};
use alloy_primitives::Address;

/// The stkIDLE voting escrow. Vyper contract, hence the snake_case
/// function names in the signatures.
pub struct StkIdle<'a, T: Transport> {
    provider: &'a Provider<T>,
    pub address: Address,
}

impl<'a, T: Transport> StkIdle<'a, T> {
    /// Two-step checker install: commit, then apply.
    pub const COMMIT_SMART_WALLET_CHECKER: &'static str = "commit_smart_wallet_checker(address)";
    pub const APPLY_SMART_WALLET_CHECKER: &'static str = "apply_smart_wallet_checker()";

    pub fn new(provider: &'a Provider<T>, address: Address) -> Self {
        Self { provider, address }
    }

    /// The contract gating smart-wallet deposits, zero when none is set.
    pub async fn smart_wallet_checker(&self) -> Result<Address, ProviderError> {
        let out = read(self.provider, self.address, "smart_wallet_checker()", &[]).await?;
        Ok(abi::decode_address(&out)?)
    }
}

/// Whitelist consulted by stkIDLE before a contract may lock. Ownable by the
/// treasury multisig, with a global open switch.
pub struct SmartWalletChecker<'a, T: Transport> {
    provider: &'a Provider<T>,
    pub address: Address,
}

impl<'a, T: Transport> SmartWalletChecker<'a, T> {
    pub fn new(provider: &'a Provider<T>, address: Address) -> Self {
        Self { provider, address }
    }

    /// Whether `wallet` is allowed to lock into stkIDLE.
    pub async fn check(&self, wallet: Address) -> Result<bool, ProviderError> {
        let out = read(
            self.provider,
            self.address,
            "check(address)",
            &[AbiValue::Address(wallet)],
        )
        .await?;
        Ok(abi::decode_bool(&out)?)
    }

    /// Whitelist or de-whitelist a single contract.
    pub async fn toggle_address(
        &self,
        from: Address,
        wallet: Address,
        allowed: bool,
    ) -> Result<TxReceipt, ProviderError> {
        send(
            self.provider,
            from,
            self.address,
            "toggleAddress(address,bool)",
            &[AbiValue::Address(wallet), AbiValue::Bool(allowed)],
        )
        .await
    }

    /// Open or close the whitelist for every contract at once.
    pub async fn toggle_is_open(&self, from: Address, open: bool) -> Result<TxReceipt, ProviderError> {
        send(
            self.provider,
            from,
            self.address,
            "toggleIsOpen(bool)",
            &[AbiValue::Bool(open)],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::testing::MockTransport;
    use serde_json::json;

    #[tokio::test]
    async fn test_check_decodes_bool_and_targets_checker() {
        let mock = MockTransport::new();
        mock.push("eth_call", json!(format!("0x{}1", "0".repeat(63))));
        let provider = Provider::new(mock);
        let checker = SmartWalletChecker::new(&provider, Address::ZERO);

        assert!(checker.check(Address::ZERO).await.unwrap());
        assert_eq!(provider.transport.count("eth_call"), 1);
    }

    #[tokio::test]
    async fn test_toggle_address_encodes_bool_word() {
        let provider = Provider::new(MockTransport::new());
        let checker = SmartWalletChecker::new(&provider, Address::ZERO);
        checker
            .toggle_address(Address::ZERO, Address::ZERO, true)
            .await
            .unwrap();

        let calls = provider.transport.calls.lock().unwrap();
        let (_, params) = calls
            .iter()
            .find(|(m, _)| m == "eth_sendTransaction")
            .unwrap();
        let data = params[0]["data"].as_str().unwrap();
        // selector + address word + bool word
        assert_eq!(data.len(), 2 + 8 + 64 + 64);
        assert!(data.ends_with('1'));
    }
}
