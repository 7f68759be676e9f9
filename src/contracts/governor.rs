use super::{read, send};
use crate::abi::{self, AbiValue};
use crate::provider::{Provider, ProviderError, Transport, TxReceipt};
use alloy_primitives::{Address, U256};

/// Compound-style proposal lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalState {
    Pending,
    Active,
    Canceled,
    Defeated,
    Succeeded,
    Queued,
    Expired,
    Executed,
    Unknown(u8),
}

impl From<u8> for ProposalState {
    fn from(v: u8) -> Self {
        match v {
            0 => Self::Pending,
            1 => Self::Active,
            2 => Self::Canceled,
            3 => Self::Defeated,
            4 => Self::Succeeded,
            5 => Self::Queued,
            6 => Self::Expired,
            7 => Self::Executed,
            other => Self::Unknown(other),
        }
    }
}

impl std::fmt::Display for ProposalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown(v) => write!(f, "Unknown({v})"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// The GovernorBravo delegator, driven through its alpha-compatible surface.
pub struct Governor<'a, T: Transport> {
    provider: &'a Provider<T>,
    pub address: Address,
}

impl<'a, T: Transport> Governor<'a, T> {
    pub const PROPOSE: &'static str = "propose(address[],uint256[],string[],bytes[],string)";

    pub fn new(provider: &'a Provider<T>, address: Address) -> Self {
        Self { provider, address }
    }

    /// Blocks between proposal submission and the start of voting.
    pub async fn voting_delay(&self) -> Result<u64, ProviderError> {
        let out = read(self.provider, self.address, "votingDelay()", &[]).await?;
        Ok(abi::decode_u256(&out)?.to::<u64>())
    }

    /// Voting window length in blocks.
    pub async fn voting_period(&self) -> Result<u64, ProviderError> {
        let out = read(self.provider, self.address, "votingPeriod()", &[]).await?;
        Ok(abi::decode_u256(&out)?.to::<u64>())
    }

    /// Total proposals ever created; the id of the latest one.
    pub async fn proposal_count(&self) -> Result<U256, ProviderError> {
        let out = read(self.provider, self.address, "proposalCount()", &[]).await?;
        Ok(abi::decode_u256(&out)?)
    }

    pub async fn state(&self, proposal_id: U256) -> Result<ProposalState, ProviderError> {
        let out = read(
            self.provider,
            self.address,
            "state(uint256)",
            &[AbiValue::Uint(proposal_id)],
        )
        .await?;
        Ok(ProposalState::from(abi::decode_u256(&out)?.to::<u8>()))
    }

    /// The timelock that will execute queued actions.
    pub async fn timelock(&self) -> Result<Address, ProviderError> {
        let out = read(self.provider, self.address, "timelock()", &[]).await?;
        Ok(abi::decode_address(&out)?)
    }

    /// Submit a proposal from `from` (must hold enough votes at the previous
    /// block). `args` is the full five-element propose argument list.
    pub async fn propose(
        &self,
        from: Address,
        args: &[AbiValue],
    ) -> Result<TxReceipt, ProviderError> {
        send(self.provider, from, self.address, Self::PROPOSE, args).await
    }

    /// GovernorBravo `castVote(id, support)`: 0 against, 1 for, 2 abstain.
    pub async fn cast_vote(
        &self,
        from: Address,
        proposal_id: U256,
        support: u8,
    ) -> Result<TxReceipt, ProviderError> {
        send(
            self.provider,
            from,
            self.address,
            "castVote(uint256,uint8)",
            &[AbiValue::Uint(proposal_id), AbiValue::Uint(U256::from(support))],
        )
        .await
    }

    pub async fn queue(&self, from: Address, proposal_id: U256) -> Result<TxReceipt, ProviderError> {
        send(
            self.provider,
            from,
            self.address,
            "queue(uint256)",
            &[AbiValue::Uint(proposal_id)],
        )
        .await
    }

    pub async fn execute(
        &self,
        from: Address,
        proposal_id: U256,
    ) -> Result<TxReceipt, ProviderError> {
        send(
            self.provider,
            from,
            self.address,
            "execute(uint256)",
            &[AbiValue::Uint(proposal_id)],
        )
        .await
    }
}

/// The governance Timelock.
pub struct Timelock<'a, T: Transport> {
    provider: &'a Provider<T>,
    pub address: Address,
}

impl<'a, T: Transport> Timelock<'a, T> {
    /// Admin handover, step one; the new admin must still accept.
    pub const SET_PENDING_ADMIN: &'static str = "setPendingAdmin(address)";

    pub fn new(provider: &'a Provider<T>, address: Address) -> Self {
        Self { provider, address }
    }

    /// Seconds a queued proposal must wait before execution.
    pub async fn delay(&self) -> Result<u64, ProviderError> {
        let out = read(self.provider, self.address, "delay()", &[]).await?;
        Ok(abi::decode_u256(&out)?.to::<u64>())
    }

    /// Admin-elect, zero when no handover is staged.
    pub async fn pending_admin(&self) -> Result<Address, ProviderError> {
        let out = read(self.provider, self.address, "pendingAdmin()", &[]).await?;
        Ok(abi::decode_address(&out)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proposal_state_mapping() {
        assert_eq!(ProposalState::from(7), ProposalState::Executed);
        assert_eq!(ProposalState::from(4), ProposalState::Succeeded);
        assert_eq!(ProposalState::from(9), ProposalState::Unknown(9));
        assert_eq!(ProposalState::Executed.to_string(), "Executed");
    }
}
