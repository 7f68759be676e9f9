//! IIP-22: install the smart-wallet whitelist on stkIDLE.
//!
//! The voting escrow only accepts locks from EOAs until a checker contract
//! is installed. The proposal commits and applies the deployed whitelist;
//! afterwards the treasury multisig can admit individual contracts or open
//! the gate for all of them.

use crate::addresses;
use crate::abi::AbiValue;
use crate::checks::Checker;
use crate::contracts::{SmartWalletChecker, StkIdle};
use crate::executor::Executor;
use crate::output;
use crate::proposal::ProposalBuilder;
use crate::provider::Transport;
use crate::tasks::TaskContext;

pub const NAME: &str = "iip-22";

const DESCRIPTION: &str = "IIP-22: Setup smart contract whitelist for stkIDLE \
    https://gov.idle.finance/t/stkidle-whitelisting-process-implementation/958";

pub async fn run<T: Transport>(ctx: &TaskContext<'_, T>) -> eyre::Result<()> {
    output::task_header(NAME, DESCRIPTION);
    let provider = ctx.provider;

    let whitelist = addresses::SMART_WALLET_CHECKER;
    output::param(&format!("smart wallet checker: {whitelist}"));

    let stk_idle = StkIdle::new(provider, addresses::STK_IDLE);
    let checker_contract = SmartWalletChecker::new(provider, whitelist);

    let proposal = ProposalBuilder::new()
        .add_contract_action(
            addresses::STK_IDLE,
            StkIdle::<T>::COMMIT_SMART_WALLET_CHECKER,
            vec![AbiValue::Address(whitelist)],
        )?
        .add_contract_action(
            addresses::STK_IDLE,
            StkIdle::<T>::APPLY_SMART_WALLET_CHECKER,
            vec![],
        )?
        .set_description(DESCRIPTION)
        .build()?;
    proposal.print_info();

    Executor::default()
        .execute_or_simulate(provider, &proposal, ctx.is_local)
        .await?;

    if !ctx.is_local {
        return Ok(());
    }

    let mut checker = Checker::new();
    checker.check(
        stk_idle.smart_wallet_checker().await? == whitelist,
        "stkIDLE smart wallet checker installed",
    );

    // Exercise the whitelist with two existing protocol contracts standing
    // in for third-party smart wallets.
    let wallet = addresses::ECOSYSTEM_FUND;
    let other_wallet = addresses::FEE_COLLECTOR;
    checker.check(
        !checker_contract.check(wallet).await?,
        "contracts start out not whitelisted",
    );

    let owner = addresses::TREASURY_MULTISIG;
    provider.fund_and_impersonate(owner).await?;
    checker_contract.toggle_address(owner, wallet, true).await?;
    checker.check(
        checker_contract.check(wallet).await?,
        "toggled contract is whitelisted",
    );
    checker.check(
        !checker_contract.check(other_wallet).await?,
        "other contracts stay blocked",
    );

    checker_contract.toggle_is_open(owner, true).await?;
    checker.check(
        checker_contract.check(other_wallet).await?,
        "open whitelist admits every contract",
    );

    checker.summary();
    Ok(())
}
