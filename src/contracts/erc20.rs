use super::{read, send};
use crate::abi::{self, AbiValue};
use crate::provider::{Provider, ProviderError, Transport, TxReceipt};
use alloy_primitives::{Address, U256};

/// Minimal ERC-20 surface, plus the Comp-style `delegate` the IDLE token has.
pub struct Erc20<'a, T: Transport> {
    provider: &'a Provider<T>,
    pub address: Address,
}

impl<'a, T: Transport> Erc20<'a, T> {
    pub fn new(provider: &'a Provider<T>, address: Address) -> Self {
        Self { provider, address }
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

    pub async fn decimals(&self) -> Result<u8, ProviderError> {
        let out = read(self.provider, self.address, "decimals()", &[]).await?;
        Ok(abi::decode_u256(&out)?.to::<u8>())
    }

    pub async fn name(&self) -> Result<String, ProviderError> {
        let out = read(self.provider, self.address, "name()", &[]).await?;
        Ok(abi::decode_string(&out)?)
    }

    /// One whole token unit, `10^decimals`.
    pub async fn one_unit(&self) -> Result<U256, ProviderError> {
        let decimals = self.decimals().await?;
        Ok(U256::from(10u64).pow(U256::from(decimals)))
    }

    pub async fn transfer(
        &self,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<TxReceipt, ProviderError> {
        send(
            self.provider,
            from,
            self.address,
            "transfer(address,uint256)",
            &[AbiValue::Address(to), AbiValue::Uint(amount)],
        )
        .await
    }

    pub async fn approve(
        &self,
        from: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxReceipt, ProviderError> {
        send(
            self.provider,
            from,
            self.address,
            "approve(address,uint256)",
            &[AbiValue::Address(spender), AbiValue::Uint(amount)],
        )
        .await
    }

    /// Comp-style vote delegation (IDLE only).
    pub async fn delegate(
        &self,
        from: Address,
        delegatee: Address,
    ) -> Result<TxReceipt, ProviderError> {
        send(
            self.provider,
            from,
            self.address,
            "delegate(address)",
            &[AbiValue::Address(delegatee)],
        )
        .await
    }
}
