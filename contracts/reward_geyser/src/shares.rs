//! Exchange rate between the staking asset and internal shares.
//!
//! The rate is read from the live ledger totals at every conversion, so a
//! rebase reconciled through `sync` is spread pro-rata over all shares.
//! Minting and valuation floor; burning rounds up. Either way the rounding
//! dust stays with the pool.

use soroban_sdk::Env;

use crate::{
    ledger::GlobalLedger,
    rewards::{mul_div, mul_div_ceil},
    ContractError,
};

fn pool_is_empty(ledger: &GlobalLedger) -> bool {
    ledger.total_staking_shares <= 0 || ledger.total_staked_amount <= 0
}

/// Shares minted for a deposit of `amount`.
///
/// ```text
/// no shares:  shares = amount × initial_shares_per_token
/// otherwise:  shares = amount × total_shares / total_staked
/// ```
///
/// Outstanding shares backed by nothing (a rebase to zero) cannot be priced,
/// so deposits are refused until the balance recovers.
pub fn mint_shares(
    env: &Env,
    ledger: &GlobalLedger,
    amount: i128,
    initial_shares_per_token: i128,
) -> Result<i128, ContractError> {
    if amount <= 0 {
        return Err(ContractError::InvalidAmount);
    }
    if ledger.total_staking_shares <= 0 {
        return amount
            .checked_mul(initial_shares_per_token)
            .ok_or(ContractError::ArithmeticOverflow);
    }
    if ledger.total_staked_amount <= 0 {
        return Err(ContractError::PoolDepleted);
    }
    mul_div(
        env,
        amount,
        ledger.total_staking_shares,
        ledger.total_staked_amount,
    )
}

/// Asset amount backing `shares` at the current rate.
pub fn to_amount(env: &Env, ledger: &GlobalLedger, shares: i128) -> Result<i128, ContractError> {
    if shares <= 0 || pool_is_empty(ledger) {
        return Ok(0);
    }
    mul_div(
        env,
        shares,
        ledger.total_staked_amount,
        ledger.total_staking_shares,
    )
}

/// Shares burned to release exactly `amount` at the current rate, rounded
/// up so the remaining holders never subsidise the withdrawal.
pub fn shares_to_burn(
    env: &Env,
    ledger: &GlobalLedger,
    amount: i128,
) -> Result<i128, ContractError> {
    if amount <= 0 || pool_is_empty(ledger) {
        return Ok(0);
    }
    mul_div_ceil(
        env,
        amount,
        ledger.total_staking_shares,
        ledger.total_staked_amount,
    )
}
