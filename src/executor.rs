//! Proposal execution: full lifecycle simulation on a fork, or a signed
//! `propose` submission on a live network.
//!
//! On a fork the effects land immediately; on mainnet the transaction only
//! opens the vote, which is why callers skip their post-condition checks
//! there.

use crate::addresses;
use crate::contracts::{self, Erc20, Governor, ProposalState, Timelock};
use crate::output;
use crate::proposal::Proposal;
use crate::provider::{CallRequest, Provider, Transport};
use alloy_consensus::{SignableTransaction, TxEip1559, TxEnvelope};
use alloy_eips::eip2718::Encodable2718;
use alloy_primitives::{Address, TxKind, U256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;

/// Tip offered on live submissions (2 gwei).
const PRIORITY_FEE: u128 = 2_000_000_000;

/// Governance endpoints plus the voters impersonated during simulation.
pub struct Executor {
    pub governor: Address,
    pub voting_token: Address,
    pub voters: Vec<Address>,
}

impl Default for Executor {
    fn default() -> Self {
        Self {
            governor: addresses::GOVERNOR,
            voting_token: addresses::IDLE,
            voters: addresses::FORK_VOTERS.to_vec(),
        }
    }
}

impl Executor {
    /// Submit on a live network, or run the whole propose → vote → queue →
    /// execute lifecycle against the fork.
    pub async fn execute_or_simulate<T: Transport>(
        &self,
        provider: &Provider<T>,
        proposal: &Proposal,
        is_local: bool,
    ) -> eyre::Result<()> {
        if is_local {
            self.simulate(provider, proposal).await
        } else {
            self.submit(provider, proposal).await
        }
    }

    /// Drive the proposal through governance on the fork.
    async fn simulate<T: Transport>(
        &self,
        provider: &Provider<T>,
        proposal: &Proposal,
    ) -> eyre::Result<()> {
        let governor = Governor::new(provider, self.governor);
        let idle = Erc20::new(provider, self.voting_token);

        output::section("Simulating proposal through governance...");

        // Voting power checkpoints at the block before propose, so fund the
        // voters, make each self-delegate, and mine one block first.
        for voter in &self.voters {
            provider.fund_and_impersonate(*voter).await?;
            idle.delegate(*voter, *voter).await?;
        }
        provider.mine_one().await?;

        let proposer = self.voters[0];
        governor.propose(proposer, &proposal.propose_args()).await?;
        let proposal_id = governor.proposal_count().await?;
        output::kv("Proposal id", &proposal_id.to_string());

        let voting_delay = governor.voting_delay().await?;
        provider.mine_blocks(voting_delay + 1).await?;

        for voter in &self.voters {
            governor.cast_vote(*voter, proposal_id, 1).await?;
        }
        output::info(&format!("voted with {} accounts", self.voters.len()));

        let voting_period = governor.voting_period().await?;
        provider.mine_blocks(voting_period + 1).await?;

        governor.queue(proposer, proposal_id).await?;
        output::info("proposal queued");

        let timelock = Timelock::new(provider, governor.timelock().await?);
        provider.increase_time(timelock.delay().await? + 1).await?;
        provider.mine_one().await?;

        governor.execute(proposer, proposal_id).await?;

        let state = governor.state(proposal_id).await?;
        if state == ProposalState::Executed {
            output::check_ok(&format!("proposal {proposal_id} executed"));
        } else {
            output::check_fail(&format!(
                "proposal {proposal_id} in state {state}, expected Executed"
            ));
        }
        Ok(())
    }

    /// Sign and submit the bare `propose` transaction; voting is up to the
    /// community from here.
    async fn submit<T: Transport>(
        &self,
        provider: &Provider<T>,
        proposal: &Proposal,
    ) -> eyre::Result<()> {
        let key = std::env::var("PRIVATE_KEY")
            .map_err(|_| eyre::eyre!("PRIVATE_KEY is required to submit on a live network"))?;
        let signer: PrivateKeySigner = key.trim().parse()?;
        let from = signer.address();

        let data = contracts::calldata(Governor::<T>::PROPOSE, &proposal.propose_args())?;
        let gas = provider
            .estimate_gas(&CallRequest::call(self.governor, &data).from(from))
            .await?;
        let gas_price = provider.gas_price().await?;

        let tx = TxEip1559 {
            chain_id: provider.chain_id().await?,
            nonce: provider.nonce(from).await?,
            // headroom over the estimate; governor proposes are state-heavy
            gas_limit: gas + gas / 5,
            max_fee_per_gas: gas_price.to::<u128>() * 2 + PRIORITY_FEE,
            max_priority_fee_per_gas: PRIORITY_FEE,
            to: TxKind::Call(self.governor),
            value: U256::ZERO,
            input: data.into(),
            ..Default::default()
        };
        let signature = signer.sign_hash_sync(&tx.signature_hash())?;
        let envelope = TxEnvelope::Eip1559(tx.into_signed(signature));
        let mut raw = Vec::new();
        envelope.encode_2718(&mut raw);

        let hash = provider.send_raw_transaction(&raw).await?;
        output::section("Proposal submitted for voting");
        output::kv("Tx hash", &format!("{hash}"));
        output::kv("Proposer", &format!("{from}"));
        Ok(())
    }
}
