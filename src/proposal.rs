//! Proposal assembly.
//!
//! A proposal is an ordered list of contract actions plus a description,
//! built once and submitted atomically to governance. Actions are validated
//! against their function signatures when added, so an argument mismatch
//! aborts the script at assembly time instead of reverting on-chain later.

use crate::abi::{self, AbiError, AbiValue, Signature};
use crate::output;
use alloy_primitives::{Address, U256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProposalError {
    #[error(transparent)]
    Abi(#[from] AbiError),

    /// `build()` without any actions.
    #[error("Proposal has no actions")]
    Empty,

    /// `build()` without a description for the voters.
    #[error("Proposal has no description")]
    NoDescription,
}

/// One (target, function, arguments) triple. Immutable once created.
#[derive(Debug, Clone)]
pub struct ProposalAction {
    pub target: Address,
    signature: Signature,
    pub args: Vec<AbiValue>,
    /// Ether attached to the call; always zero for the IIPs.
    pub value: U256,
}

impl ProposalAction {
    pub fn new(target: Address, sig: &str, args: Vec<AbiValue>) -> Result<Self, ProposalError> {
        let signature = Signature::parse(sig)?;
        signature.validate(&args)?;
        Ok(Self {
            target,
            signature,
            args,
            value: U256::ZERO,
        })
    }

    /// Canonical signature string, as the governor hashes it.
    pub fn signature(&self) -> &str {
        self.signature.canonical()
    }

    /// ABI-encoded arguments WITHOUT the selector: the governor receives the
    /// signature separately and prepends the selector itself.
    pub fn encoded_args(&self) -> Vec<u8> {
        abi::encode_args(&self.args)
    }
}

/// Accumulates actions and a description, hardhat-proposals style.
#[derive(Debug, Default)]
pub struct ProposalBuilder {
    actions: Vec<ProposalAction>,
    description: Option<String>,
}

impl ProposalBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a validated contract action; consumes and returns the builder so
    /// actions chain in proposal order.
    pub fn add_contract_action(
        mut self,
        target: Address,
        sig: &str,
        args: Vec<AbiValue>,
    ) -> Result<Self, ProposalError> {
        self.actions.push(ProposalAction::new(target, sig, args)?);
        Ok(self)
    }

    /// Add an already-validated action.
    pub fn add_action(mut self, action: ProposalAction) -> Self {
        self.actions.push(action);
        self
    }

    pub fn set_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn build(self) -> Result<Proposal, ProposalError> {
        if self.actions.is_empty() {
            return Err(ProposalError::Empty);
        }
        let description = self.description.ok_or(ProposalError::NoDescription)?;
        Ok(Proposal {
            description,
            actions: self.actions,
        })
    }
}

/// An immutable, fully-assembled governance proposal.
#[derive(Debug)]
pub struct Proposal {
    pub description: String,
    actions: Vec<ProposalAction>,
}

impl Proposal {
    pub fn actions(&self) -> &[ProposalAction] {
        &self.actions
    }

    pub fn targets(&self) -> Vec<Address> {
        self.actions.iter().map(|a| a.target).collect()
    }

    pub fn values(&self) -> Vec<U256> {
        self.actions.iter().map(|a| a.value).collect()
    }

    pub fn signatures(&self) -> Vec<String> {
        self.actions
            .iter()
            .map(|a| a.signature().to_string())
            .collect()
    }

    pub fn calldatas(&self) -> Vec<Vec<u8>> {
        self.actions.iter().map(|a| a.encoded_args()).collect()
    }

    /// The five arguments of the governor's
    /// `propose(address[],uint256[],string[],bytes[],string)`.
    pub fn propose_args(&self) -> Vec<AbiValue> {
        vec![
            AbiValue::AddressArray(self.targets()),
            AbiValue::UintArray(self.values()),
            AbiValue::StrArray(self.signatures()),
            AbiValue::BytesArray(self.calldatas()),
            AbiValue::Str(self.description.clone()),
        ]
    }

    /// Print the action list for operator review before submission.
    pub fn print_info(&self) {
        output::section("Proposal actions:");
        for (i, action) in self.actions.iter().enumerate() {
            output::info(&format!(
                "  {}. {} -> {}",
                i + 1,
                action.target,
                action.signature()
            ));
            for arg in &action.args {
                output::info(&format!("       {}", arg.display()));
            }
        }
        output::kv("Description", &self.description);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addresses;
    use crate::contracts::{GOVERNABLE_FUND_TRANSFER, IDLE_TOKEN_SET_ALL};
    use alloy_primitives::address;

    fn transfer_args() -> Vec<AbiValue> {
        vec![
            AbiValue::Address(addresses::IDLE),
            AbiValue::Address(addresses::TREASURY_MULTISIG),
            AbiValue::Uint(U256::from(1_000u64)),
        ]
    }

    #[test]
    fn test_builder_preserves_action_order() {
        let proposal = ProposalBuilder::new()
            .add_contract_action(addresses::ECOSYSTEM_FUND, GOVERNABLE_FUND_TRANSFER, transfer_args())
            .unwrap()
            .add_contract_action(addresses::FEE_TREASURY, GOVERNABLE_FUND_TRANSFER, transfer_args())
            .unwrap()
            .set_description("two transfers")
            .build()
            .unwrap();

        assert_eq!(
            proposal.targets(),
            vec![addresses::ECOSYSTEM_FUND, addresses::FEE_TREASURY]
        );
        assert_eq!(proposal.values(), vec![U256::ZERO, U256::ZERO]);
        assert_eq!(
            proposal.signatures(),
            vec![GOVERNABLE_FUND_TRANSFER.to_string(); 2]
        );
    }

    #[test]
    fn test_action_args_validated_at_assembly() {
        // wrong arity
        let err = ProposalAction::new(
            addresses::ECOSYSTEM_FUND,
            GOVERNABLE_FUND_TRANSFER,
            vec![AbiValue::Address(addresses::IDLE)],
        )
        .unwrap_err();
        assert!(matches!(err, ProposalError::Abi(AbiError::ArityMismatch { .. })));

        // wrong type in an array slot
        let err = ProposalAction::new(
            addresses::IDLE_USDC_V4,
            IDLE_TOKEN_SET_ALL,
            vec![
                AbiValue::AddressArray(vec![]),
                AbiValue::AddressArray(vec![]),
                AbiValue::AddressArray(vec![]),
                AbiValue::Uint(U256::ZERO),
            ],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ProposalError::Abi(AbiError::TypeMismatch { index: 3, .. })
        ));
    }

    #[test]
    fn test_build_requires_description_and_actions() {
        assert!(matches!(
            ProposalBuilder::new().build().unwrap_err(),
            ProposalError::Empty
        ));

        let builder = ProposalBuilder::new()
            .add_contract_action(addresses::ECOSYSTEM_FUND, GOVERNABLE_FUND_TRANSFER, transfer_args())
            .unwrap();
        assert!(matches!(
            builder.build().unwrap_err(),
            ProposalError::NoDescription
        ));
    }

    #[test]
    fn test_calldatas_exclude_selector() {
        let to = address!("fb3bd022d5dacf95ee28a6b07825d4ff9c5b3814");
        let proposal = ProposalBuilder::new()
            .add_contract_action(
                addresses::ECOSYSTEM_FUND,
                GOVERNABLE_FUND_TRANSFER,
                vec![
                    AbiValue::Address(addresses::IDLE),
                    AbiValue::Address(to),
                    AbiValue::Uint(U256::from(5u64)),
                ],
            )
            .unwrap()
            .set_description("d")
            .build()
            .unwrap();

        let calldata = &proposal.calldatas()[0];
        // three static words, no 4-byte selector prefix
        assert_eq!(calldata.len(), 96);
        assert_eq!(&calldata[12..32], addresses::IDLE.as_slice());
    }

    #[test]
    fn test_propose_args_shape() {
        let proposal = ProposalBuilder::new()
            .add_contract_action(addresses::ECOSYSTEM_FUND, GOVERNABLE_FUND_TRANSFER, transfer_args())
            .unwrap()
            .set_description("shape")
            .build()
            .unwrap();

        let args = proposal.propose_args();
        assert_eq!(args.len(), 5);
        assert!(matches!(args[0], AbiValue::AddressArray(ref t) if t.len() == 1));
        assert!(matches!(args[2], AbiValue::StrArray(_)));
        assert!(matches!(args[3], AbiValue::BytesArray(_)));
        assert!(matches!(args[4], AbiValue::Str(ref d) if d == "shape"));
    }
}
