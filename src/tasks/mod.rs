//! One module per historical governance proposal (IIP).
//!
//! Each task is strictly linear: read current state, assemble the action
//! list, execute or simulate, then (fork only) re-read state and print
//! pass/fail comparisons. The tasks are historical records; parameter
//! literals are what went on-chain, not values to reconcile across scripts.

pub mod iip_22;
pub mod iip_23;
pub mod iip_31;
pub mod iip_35;
pub mod iip_36;
pub mod iip_37;
pub mod iip_39;
pub mod iip_42;
pub mod set_all;

use crate::provider::{Provider, Transport};
use alloy_primitives::U256;

/// Everything a task needs, passed explicitly rather than captured from
/// module state.
pub struct TaskContext<'a, T: Transport> {
    pub provider: &'a Provider<T>,
    /// Running against a local fork: effects apply immediately and checks run.
    pub is_local: bool,
}

/// `10^decimals`, for scaling whole-token literals.
pub(crate) fn one(decimals: u32) -> U256 {
    U256::from(10u64).pow(U256::from(decimals))
}
