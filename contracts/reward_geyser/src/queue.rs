use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol, Vec};

use crate::{rewards, ContractError};

const USER_BATCHES: Symbol = symbol_short!("BATCHES");

const TTL_THRESHOLD: u32 = 518_400;
const TTL_EXTEND_TO: u32 = 3_110_400;

// ── Types ───────────────────────────────────────────────────────────────────

/// One deposit. Batches sit in the owner's queue oldest-first.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakeBatch {
    /// Fixed at mint time and never recomputed.
    pub shares: i128,
    /// Staking-asset amount received for this deposit.
    pub deposited_amount: i128,
    pub timestamp: u64,
    pub commitment_seconds: u64,
}

/// How a withdrawal treats the last batch it only needs part of.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ReleasePolicy {
    /// Split the batch; the remainder stays queued with its original clock.
    Partial = 0,
    /// Release every batch the withdrawal touches in full.
    WholeBatch = 1,
}

// ── Storage helpers ─────────────────────────────────────────────────────────

fn batches_key(user: &Address) -> (Symbol, Address) {
    (USER_BATCHES, user.clone())
}

pub fn load(env: &Env, user: &Address) -> Vec<StakeBatch> {
    env.storage()
        .persistent()
        .get(&batches_key(user))
        .unwrap_or(Vec::new(env))
}

/// Persist a user's queue; an empty queue removes the entry entirely.
pub fn store(env: &Env, user: &Address, batches: &Vec<StakeBatch>) {
    let key = batches_key(user);
    if batches.is_empty() {
        env.storage().persistent().remove(&key);
        return;
    }
    env.storage().persistent().set(&key, batches);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

// ── Queue operations ────────────────────────────────────────────────────────

pub fn push(batches: &mut Vec<StakeBatch>, batch: StakeBatch) {
    batches.push_back(batch);
}

pub fn total_shares(batches: &Vec<StakeBatch>) -> i128 {
    batches.iter().map(|b| b.shares).sum()
}

/// Remove `shares` worth of stake from the tail of the queue (LIFO).
///
/// Returns the consumed portions newest-first. Each portion keeps the
/// `timestamp` and `commitment_seconds` of the batch it came from. Under
/// `ReleasePolicy::WholeBatch` the returned shares may exceed the request.
pub fn pop_shares(
    env: &Env,
    batches: &mut Vec<StakeBatch>,
    shares: i128,
    policy: ReleasePolicy,
) -> Result<Vec<StakeBatch>, ContractError> {
    if shares <= 0 {
        return Err(ContractError::AmountTooSmall);
    }
    if total_shares(batches) < shares {
        return Err(ContractError::InsufficientBalance);
    }

    let mut consumed = Vec::new(env);
    let mut remaining = shares;

    while remaining > 0 {
        let mut last = batches
            .pop_back()
            .ok_or(ContractError::InsufficientBalance)?;

        if last.shares <= remaining || policy == ReleasePolicy::WholeBatch {
            remaining = remaining.saturating_sub(last.shares);
            consumed.push_back(last);
            continue;
        }

        // Split: the tail keeps its clock and the unconsumed shares.
        let taken_amount = rewards::mul_div(env, last.deposited_amount, remaining, last.shares)?;
        consumed.push_back(StakeBatch {
            shares: remaining,
            deposited_amount: taken_amount,
            timestamp: last.timestamp,
            commitment_seconds: last.commitment_seconds,
        });
        last.shares -= remaining;
        last.deposited_amount -= taken_amount;
        batches.push_back(last);
        remaining = 0;
    }

    Ok(consumed)
}
