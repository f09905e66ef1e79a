//! The admin role and its two-step handover.
//!
//! A handover is only complete once the proposed address signs `accept`;
//! until then the current admin keeps every privilege and may withdraw the
//! proposal.

use soroban_sdk::{symbol_short, Address, Env, Symbol};

use crate::ContractError;

const ADMIN: Symbol = symbol_short!("ADMIN");
const PENDING_ADMIN: Symbol = symbol_short!("PEND_ADM");

pub fn current(env: &Env) -> Result<Address, ContractError> {
    env.storage()
        .instance()
        .get(&ADMIN)
        .ok_or(ContractError::NotInitialized)
}

pub fn install(env: &Env, admin: &Address) {
    env.storage().instance().set(&ADMIN, admin);
}

pub fn pending(env: &Env) -> Option<Address> {
    env.storage().instance().get(&PENDING_ADMIN)
}

/// Require `caller` to sign and to hold the admin role.
pub fn authorize(env: &Env, caller: &Address) -> Result<(), ContractError> {
    caller.require_auth();
    if *caller != current(env)? {
        return Err(ContractError::NotAuthorized);
    }
    Ok(())
}

/// Record `proposed` as the next admin, replacing any earlier proposal.
pub fn propose(env: &Env, caller: &Address, proposed: &Address) -> Result<(), ContractError> {
    authorize(env, caller)?;
    env.storage().instance().set(&PENDING_ADMIN, proposed);
    Ok(())
}

/// Hand the role to `claimant` if it is the proposed address.
///
/// Returns the outgoing admin.
pub fn accept(env: &Env, claimant: &Address) -> Result<Address, ContractError> {
    claimant.require_auth();
    let proposed = pending(env).ok_or(ContractError::NoPendingAdmin)?;
    if *claimant != proposed {
        return Err(ContractError::NotAuthorized);
    }

    let outgoing = current(env)?;
    install(env, claimant);
    env.storage().instance().remove(&PENDING_ADMIN);
    Ok(outgoing)
}

/// Drop the outstanding proposal. Returns the address that was proposed.
pub fn withdraw_proposal(env: &Env, caller: &Address) -> Result<Address, ContractError> {
    authorize(env, caller)?;
    let proposed = pending(env).ok_or(ContractError::NoPendingAdmin)?;
    env.storage().instance().remove(&PENDING_ADMIN);
    Ok(proposed)
}
