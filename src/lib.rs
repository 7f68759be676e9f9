//! # Idle Proposals - Governance Proposal Runner Library
//!
//! Assembles, simulates, and submits Idle Finance governance proposals
//! (IIPs) against a hardhat mainnet fork or mainnet itself, driving the
//! GovernorBravo lifecycle end to end and verifying each proposal's
//! on-chain effects afterwards.

pub mod abi;
pub mod addresses;
pub mod checks;
pub mod cli;
pub mod contracts;
pub mod executor;
pub mod harness;
pub mod output;
pub mod proposal;
pub mod provider;
pub mod tasks;
