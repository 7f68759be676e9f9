//! Typed call wrappers for the external contracts the scripts drive.
//!
//! Each wrapper is a thin view over a [`Provider`]: reads go through
//! `eth_call`, writes through `eth_sendTransaction` from an impersonated
//! sender. The contracts' logic lives entirely on-chain; these types only
//! pin down signatures and return shapes.

pub mod controller;
pub mod distributor;
pub mod erc20;
pub mod fund;
pub mod governor;
pub mod idle_token;
pub mod stk_idle;

pub use controller::IdleController;
pub use distributor::Distributor;
pub use erc20::Erc20;
pub use fund::{
    FEE_COLLECTOR_WITHDRAW, GOVERNABLE_FUND_TRANSFER, IDLE_TOKEN_SET_ALL,
    IDLE_TOKEN_SET_FEE_ADDRESS,
};
pub use governor::{Governor, ProposalState, Timelock};
pub use idle_token::IdleToken;
pub use stk_idle::{SmartWalletChecker, StkIdle};

use crate::abi::{self, AbiValue, Signature};
use crate::provider::{Provider, ProviderError, Transport, TxReceipt};
use alloy_primitives::{Address, U256};

/// Build calldata for `sig` with validated `args`.
pub(crate) fn calldata(sig: &str, args: &[AbiValue]) -> Result<Vec<u8>, ProviderError> {
    let signature = Signature::parse(sig)?;
    Ok(abi::encode_call(&signature, args)?)
}

/// `eth_call` a view function and return the raw result.
pub(crate) async fn read<T: Transport>(
    provider: &Provider<T>,
    to: Address,
    sig: &str,
    args: &[AbiValue],
) -> Result<Vec<u8>, ProviderError> {
    let data = calldata(sig, args)?;
    provider.call(to, &data).await
}

/// Send a state-changing call from `from` and wait for the receipt.
pub(crate) async fn send<T: Transport>(
    provider: &Provider<T>,
    from: Address,
    to: Address,
    sig: &str,
    args: &[AbiValue],
) -> Result<TxReceipt, ProviderError> {
    let data = calldata(sig, args)?;
    provider.send_transaction(from, to, &data, U256::ZERO).await
}

#[cfg(test)]
mod tests {
    // Callers reach the governance types through this module, not through
    // `contracts::governor` directly.
    use super::{Governor, ProposalState, Timelock};
    use crate::provider::{testing::MockTransport, Provider};
    use alloy_primitives::Address;

    #[test]
    fn test_reexports_cover_governance_types() {
        assert_eq!(ProposalState::from(7), ProposalState::Executed);
        let provider = Provider::new(MockTransport::new());
        let _ = Governor::new(&provider, Address::ZERO);
        let _ = Timelock::new(&provider, Address::ZERO);
    }
}
