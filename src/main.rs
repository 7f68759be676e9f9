use idle_proposals::addresses;
use idle_proposals::cli::{Cli, Task};
use idle_proposals::harness::{self, RebalanceTest};
use idle_proposals::output;
use idle_proposals::provider::{HttpTransport, Provider};
use idle_proposals::tasks::{self, TaskContext};

use alloy_primitives::U256;
use clap::Parser;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let endpoint = cli.endpoint()?;
    output::info(&format!("connecting to {endpoint}"));
    let transport = HttpTransport::new(&endpoint)?;
    let provider = Provider::new(transport);
    let ctx = TaskContext {
        provider: &provider,
        is_local: cli.is_local(),
    };

    match cli.task {
        Task::Iip22 => tasks::iip_22::run(&ctx).await,
        Task::Iip23 => tasks::iip_23::run(&ctx).await,
        Task::Iip31 => tasks::iip_31::run(&ctx).await,
        Task::Iip35 => tasks::iip_35::run(&ctx).await,
        Task::Iip36 => tasks::iip_36::run(&ctx).await,
        Task::Iip37 => tasks::iip_37::run(&ctx).await,
        Task::Iip39 => tasks::iip_39::run(&ctx).await,
        Task::Iip42 => tasks::iip_42::run(&ctx).await,
        Task::TestIdleToken {
            idle_token,
            allocations,
            whale,
            unlent,
        } => {
            let args = RebalanceTest {
                idle_token: Some(idle_token),
                allocations,
                whale,
                unlent,
                ..RebalanceTest::default()
            };
            harness::test_idle_token(&provider, &args).await
        }
        Task::SetBalanceTest => {
            let target = addresses::DEV_LEAGUE_MULTISIG;
            let balance = U256::from(1u128 << 64);
            provider.set_balance(target, balance).await?;
            output::kv("new balance", &provider.balance(target).await?.to_string());
            Ok(())
        }
    }
}
