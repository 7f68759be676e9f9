//! Mainnet address registry for every contract the IIP scripts touch.
//!
//! The fork used for simulation is a mainnet snapshot, so the "live"
//! addresses are the only variant kept. Per-proposal literals (new wrapper
//! deployments, one-off whales) stay inside the task that uses them.

use alloy_primitives::{address, Address};

/// The zero address, used as the "no gov token" / "no protocol token" marker.
pub const ADDR_0: Address = Address::ZERO;

// ── Tokens ─────────────────────────────────────────────────────────

pub const IDLE: Address = address!("875773784af8135ea0ef43b5a374aad105c5d39e");
pub const STK_IDLE: Address = address!("aac13a116ea7016689993193fce4badc8038136f");
pub const USDC: Address = address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");
pub const USDT: Address = address!("dac17f958d2ee523a2206206994597c13d831ec7");
pub const DAI: Address = address!("6b175474e89094c44da98b954eedeac495271d0f");
pub const WETH: Address = address!("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");
pub const WBTC: Address = address!("2260fac5e5542a773aa44fbcfedf7c193bc2c599");
pub const SUSD: Address = address!("57ab1ec28d129707052df4df418d58a2d46d5f51");
pub const TUSD: Address = address!("0000000000085d4780b73119b644ae5ecd22b376");
pub const RAI: Address = address!("03ab458634910aad20ef5f1c8ee96f1d6ac54919");
pub const COMP: Address = address!("c00e94cb662c3520282e6f5717214004a7f26888");
pub const FEI: Address = address!("956f47f50a910163d8bf957cf5846d573e7f87ca");
pub const STK_AAVE: Address = address!("4da27a545c0c5b758a6ba100e3a049001de870f5");

// ── Best Yield idleTokens (v4) ─────────────────────────────────────

pub const IDLE_DAI_V4: Address = address!("3fe7940616e5bc47b0775a0dccf6237893353bb4");
pub const IDLE_USDC_V4: Address = address!("5274891bec421b39d23760c04a6755ecb444797c");
pub const IDLE_USDT_V4: Address = address!("f34842d05a1c888ca02769a633df37177415c2f8");
pub const IDLE_WETH_V4: Address = address!("c8e6ca6e96a326dc448307a5fde90a0b21fd7f80");
pub const IDLE_WBTC_V4: Address = address!("8c81121b15197fa0eeaee1dc75533419dcfd3151");

/// The idleTokens still receiving Best Yield liquidity-mining rewards.
pub const ALL_IDLE_TOKENS_BEST: [Address; 4] =
    [IDLE_DAI_V4, IDLE_USDC_V4, IDLE_USDT_V4, IDLE_WETH_V4];

// ── Protocol contracts ─────────────────────────────────────────────

pub const IDLE_CONTROLLER: Address = address!("275da8e61ea8e02d51edd8d0dc5c0e62b4cdb0be");
pub const GAUGE_DISTRIBUTOR: Address = address!("1276a8ee84900bd8cca6e9b3ccb99ff4771fe329");
pub const ECOSYSTEM_FUND: Address = address!("b0aa1f98523ec15932dd5faac5d86e57115571c7");
pub const FEE_COLLECTOR: Address = address!("becc659bfc6edca552fa1a67451cc6b38a0108e4");
pub const FEE_TREASURY: Address = address!("69a62c24f16d4914a48919613e8ee330641bcb94");
pub const REBALANCER_MANAGER: Address = address!("b3c8e5534f0063545cbbb7ce86854bf42db8872b");
pub const TREASURY_MULTISIG: Address = address!("fb3bd022d5dacf95ee28a6b07825d4ff9c5b3814");
/// Whitelist gating smart-wallet deposits into stkIDLE.
pub const SMART_WALLET_CHECKER: Address = address!("2d8b5b65c6464651403955ac6d71f9c0204169d3");
pub const DEV_LEAGUE_MULTISIG: Address = address!("e8ea8bae250028a8709a3841e0ae1a44820d677b");

// ── Governance ─────────────────────────────────────────────────────

/// GovernorBravo delegator; proposals go through its alpha-compatible surface.
pub const GOVERNOR: Address = address!("3d5fc645320be0a085a32885f078f7121e5e5375");
/// Timelock executing queued proposals.
pub const TIMELOCK: Address = address!("d6dabbc2b275114a2366555d6c481ef08fdc2556");

/// Large IDLE delegates impersonated on a fork to move proposals through the
/// vote. Order matters: the first entry is also the proposer.
pub const FORK_VOTERS: [Address; 3] = [
    address!("3675d2a334f17bcd4689533b7af263d48d96ec72"),
    DEV_LEAGUE_MULTISIG,
    TREASURY_MULTISIG,
];

/// First hardhat dev account, used as the test user in the fork harness.
pub const TEST_ACCOUNT: Address = address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");

// ── Whales for fork liquidity ──────────────────────────────────────

pub const WHALE: Address = address!("47ac0fb4f2d84898e4d9e7b4dab3c24507a6d503");
pub const SUSD_WHALE: Address = address!("a5407eae9ba41422680e2e00537571bcc53efbfd");
pub const TUSD_WHALE: Address = address!("f977814e90da44bfa03b6295a0616a897441acec");
pub const WETH_WHALE: Address = address!("2f0b23f53734252bda2277357e97e1517d6b042a");
pub const WBTC_WHALE: Address = address!("ccf4429db6322d5c611ee964527d42e5d685dd6a");
pub const RAI_WHALE: Address = address!("618788357d0ebd8a37e763adab3bc575d54c2c7d");
pub const FEI_WHALE: Address = address!("ba12222222228d8ba445958a75a0704d566bf2c8");

/// Pick a funded account for a given underlying asset, falling back to the
/// default whale for the stables.
pub fn whale_for(underlying: Address) -> Address {
    match underlying {
        a if a == SUSD => SUSD_WHALE,
        a if a == TUSD => TUSD_WHALE,
        a if a == WETH => WETH_WHALE,
        a if a == WBTC => WBTC_WHALE,
        a if a == RAI => RAI_WHALE,
        a if a == FEI => FEI_WHALE,
        _ => WHALE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whale_lookup_specifics() {
        assert_eq!(whale_for(WETH), WETH_WHALE);
        assert_eq!(whale_for(WBTC), WBTC_WHALE);
        assert_eq!(whale_for(RAI), RAI_WHALE);
    }

    #[test]
    fn test_whale_lookup_falls_back_to_default() {
        assert_eq!(whale_for(USDC), WHALE);
        assert_eq!(whale_for(DAI), WHALE);
        assert_eq!(whale_for(Address::ZERO), WHALE);
    }

    #[test]
    fn test_voters_are_distinct() {
        assert_ne!(FORK_VOTERS[0], FORK_VOTERS[1]);
        assert_ne!(FORK_VOTERS[1], FORK_VOTERS[2]);
    }
}
