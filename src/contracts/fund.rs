//! Signatures for the treasury contracts. Both are timelock-only movers of
//! tokens, so there is nothing to read from them directly; proposals target
//! them with these signatures and balances are checked on the tokens.

/// GovernableFund (ecosystem fund, fee treasury): `transfer(token, to, amount)`.
pub const GOVERNABLE_FUND_TRANSFER: &str = "transfer(address,address,uint256)";

/// FeeCollector: `withdraw(token, to, amount)`.
pub const FEE_COLLECTOR_WITHDRAW: &str = "withdraw(address,address,uint256)";

/// IdleTokenGovernance setters driven only through proposals.
pub const IDLE_TOKEN_SET_ALL: &str =
    "setAllAvailableTokensAndWrappers(address[],address[],address[],address[])";
pub const IDLE_TOKEN_SET_FEE_ADDRESS: &str = "setFeeAddress(address)";
