use alloy_primitives::Address;
use clap::{Parser, Subcommand, ValueEnum};

/// CLI arguments for the proposal runner
#[derive(Parser, Debug)]
#[command(name = "iip", about = "Idle governance proposal runner")]
pub struct Cli {
    /// Network to run against
    #[arg(long, value_enum, default_value_t = Network::Local)]
    pub network: Network,

    /// Explicit RPC endpoint, overriding the network default.
    /// Can also be set via the RPC_URL environment variable.
    #[arg(long, env = "RPC_URL")]
    pub rpc_url: Option<String>,

    /// Alchemy API key used to build the mainnet endpoint.
    #[arg(long, env = "ALCHEMY_API_KEY", hide_env_values = true)]
    pub alchemy_api_key: Option<String>,

    #[command(subcommand)]
    pub task: Task,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Network {
    /// Local hardhat fork at 127.0.0.1:8545
    Local,
    /// Ethereum mainnet via Alchemy
    Mainnet,
}

#[derive(Subcommand, Debug)]
pub enum Task {
    /// Install the smart-wallet whitelist on stkIDLE
    #[command(name = "iip-22")]
    Iip22,
    /// Reduce Best Yield LM to 1000 IDLE/day, top up the gauge distributor
    #[command(name = "iip-23")]
    Iip23,
    /// Euler staking adapters, zero the gauge rate, extend LM at half rate
    #[command(name = "iip-31")]
    Iip31,
    /// Clearpool adapters, halve LM, drop idleWBTC, consolidate fees
    #[command(name = "iip-35")]
    Iip35,
    /// Add Clearpool Fasanara USDC, prune idleWETH, route fees to treasury
    #[command(name = "iip-36")]
    Iip36,
    /// Fund the Fasanara deal and the M3 Leagues budget
    #[command(name = "iip-37")]
    Iip37,
    /// Stop Best Yield LM, add AA_steakUSDC, transfer treasury funds
    #[command(name = "iip-39")]
    Iip39,
    /// Leagues M1 2025 budget, stage the Timelock admin handover
    #[command(name = "iip-42")]
    Iip42,
    /// Rebalance and mint/redeem a Best Yield idleToken on the fork
    TestIdleToken {
        /// idleToken address
        #[arg(long)]
        idle_token: Address,
        /// Comma-separated allocations summing to 100000
        #[arg(long, value_delimiter = ',')]
        allocations: Vec<u64>,
        /// Funded holder of the underlying; defaults to a per-asset lookup
        #[arg(long)]
        whale: Option<Address>,
        /// Whole tokens to park unlent on the idleToken before rebalancing
        #[arg(long, default_value = "0")]
        unlent: u64,
    },
    /// Give the dev league multisig an ETH balance on the fork
    SetBalanceTest,
}

impl Cli {
    /// Endpoint to connect to, from the override or the network default.
    pub fn endpoint(&self) -> eyre::Result<String> {
        if let Some(url) = &self.rpc_url {
            return Ok(url.clone());
        }
        match self.network {
            Network::Local => Ok("http://127.0.0.1:8545".to_string()),
            Network::Mainnet => {
                let key = self
                    .alchemy_api_key
                    .as_deref()
                    .ok_or_else(|| eyre::eyre!("mainnet needs --alchemy-api-key or RPC_URL"))?;
                Ok(format!("https://eth-mainnet.g.alchemy.com/v2/{key}"))
            }
        }
    }

    pub fn is_local(&self) -> bool {
        self.network == Network::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_endpoint_default() {
        let cli = Cli::parse_from(["iip", "iip-37"]);
        assert!(cli.is_local());
        assert_eq!(cli.endpoint().unwrap(), "http://127.0.0.1:8545");
    }

    #[test]
    fn test_rpc_url_overrides_network() {
        let cli = Cli::parse_from(["iip", "--network", "mainnet", "--rpc-url", "http://x", "iip-37"]);
        assert!(!cli.is_local());
        assert_eq!(cli.endpoint().unwrap(), "http://x");
    }

    #[test]
    fn test_mainnet_requires_key() {
        let cli = Cli {
            network: Network::Mainnet,
            rpc_url: None,
            alchemy_api_key: None,
            task: Task::SetBalanceTest,
        };
        assert!(cli.endpoint().is_err());
    }

    #[test]
    fn test_test_idle_token_args() {
        let cli = Cli::parse_from([
            "iip",
            "test-idle-token",
            "--idle-token",
            "0x5274891bEC421B39D23760c04A6755eCB444797C",
            "--allocations",
            "100000,0",
        ]);
        match cli.task {
            Task::TestIdleToken { allocations, unlent, whale, .. } => {
                assert_eq!(allocations, vec![100_000, 0]);
                assert_eq!(unlent, 0);
                assert!(whale.is_none());
            }
            _ => panic!("wrong subcommand"),
        }
    }
}
