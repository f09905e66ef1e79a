//! Time-weighted reward and penalty accounting.
//!
//! Every public operation starts from `refresh` (or the read-only `project`)
//! so share-seconds and the unlocked pool are current as of the ledger
//! timestamp before any stake is minted or released.

use soroban_sdk::{contracttype, Env, Vec};

use crate::{
    ledger::{self, GlobalLedger},
    queue::{self, StakeBatch},
    rewards, schedule, shares, Config, ContractError,
};

/// What a withdrawal released.
///
/// The staker receives `principal − penalty` staking tokens and `reward`
/// reward tokens; `penalty` goes to the penalty recipient.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UnstakeOutcome {
    pub principal: i128,
    pub reward: i128,
    pub penalty: i128,
}

struct PortionSettlement {
    reward: i128,
    penalty: i128,
    share_seconds: i128,
}

// ── Refresh ─────────────────────────────────────────────────────────────────

/// Advance global accounting to `now` and persist it.
///
/// Returns the refreshed ledger and the effective timestamp.
pub fn refresh(env: &Env, now: u64) -> Result<(GlobalLedger, u64), ContractError> {
    let mut state = ledger::load(env);
    let released = schedule::advance(env, now)?;
    let now = state.accrue(now, released)?;
    ledger::store(env, &state);
    Ok((state, now))
}

/// Same transition as `refresh`, without writing anything.
pub fn project(env: &Env, now: u64) -> Result<(GlobalLedger, u64), ContractError> {
    let mut state = ledger::load(env);
    let pending = schedule::pending_unlock(env, now)?;
    let now = state.accrue(now, pending)?;
    Ok((state, now))
}

// ── Stake / unstake ─────────────────────────────────────────────────────────

/// Mint shares for `amount` and queue a new batch stamped `now`.
pub fn stake(
    env: &Env,
    config: &Config,
    state: &mut GlobalLedger,
    batches: &mut Vec<StakeBatch>,
    amount: i128,
    commitment_seconds: u64,
    now: u64,
) -> Result<StakeBatch, ContractError> {
    let minted = shares::mint_shares(env, state, amount, config.initial_shares_per_token)?;
    if minted <= 0 {
        return Err(ContractError::AmountTooSmall);
    }

    let batch = StakeBatch {
        shares: minted,
        deposited_amount: amount,
        timestamp: now,
        commitment_seconds,
    };
    queue::push(batches, batch.clone());

    state.total_staking_shares = state
        .total_staking_shares
        .checked_add(minted)
        .ok_or(ContractError::ArithmeticOverflow)?;
    state.total_staked_amount = state
        .total_staked_amount
        .checked_add(amount)
        .ok_or(ContractError::ArithmeticOverflow)?;

    Ok(batch)
}

/// Release `amount` of stake from the tail of `batches` and settle each
/// consumed portion.
///
/// Rewards are computed against the totals as they stood before this
/// withdrawal, so forfeited rewards stay in the pool for other stakers.
pub fn unstake(
    env: &Env,
    config: &Config,
    state: &mut GlobalLedger,
    batches: &mut Vec<StakeBatch>,
    amount: i128,
    now: u64,
) -> Result<UnstakeOutcome, ContractError> {
    if amount <= 0 {
        return Err(ContractError::ZeroAmount);
    }

    let user_shares = queue::total_shares(batches);
    let user_value = shares::to_amount(env, state, user_shares)?;
    if amount > user_value {
        return Err(ContractError::InsufficientBalance);
    }

    // A full exit takes every share, including any whose value floors to zero.
    let burn = if amount == user_value {
        user_shares
    } else {
        shares::shares_to_burn(env, state, amount)?.min(user_shares)
    };
    if burn <= 0 {
        return Err(ContractError::AmountTooSmall);
    }

    let portions = queue::pop_shares(env, batches, burn, config.release_policy)?;
    let consumed_shares = queue::total_shares(&portions);
    // Exactly the requested amount, unless whole-batch release took more.
    let principal_total = if consumed_shares > burn {
        shares::to_amount(env, state, consumed_shares)?.max(amount)
    } else {
        amount
    };

    let snapshot = state.clone();
    let mut outcome = UnstakeOutcome {
        principal: principal_total,
        ..UnstakeOutcome::default()
    };
    let mut released_share_seconds: i128 = 0;
    let mut principal_left = principal_total;
    let last_index = portions.len().saturating_sub(1);

    for (i, portion) in portions.iter().enumerate() {
        // The oldest portion absorbs the rounding remainder.
        let principal = if i as u32 == last_index {
            principal_left
        } else {
            rewards::mul_div(env, principal_total, portion.shares, consumed_shares)?
        };
        principal_left -= principal;

        let settled = settle_portion(env, config, &snapshot, &portion, principal, now)?;
        outcome.reward = outcome
            .reward
            .checked_add(settled.reward)
            .ok_or(ContractError::ArithmeticOverflow)?;
        outcome.penalty = outcome
            .penalty
            .checked_add(settled.penalty)
            .ok_or(ContractError::ArithmeticOverflow)?;
        released_share_seconds = released_share_seconds
            .checked_add(settled.share_seconds)
            .ok_or(ContractError::ArithmeticOverflow)?;
    }

    state.total_staking_share_seconds = state
        .total_staking_share_seconds
        .saturating_sub(released_share_seconds)
        .max(0);
    state.total_staking_shares -= consumed_shares;
    state.total_staked_amount = state
        .total_staked_amount
        .saturating_sub(principal_total)
        .max(0);
    state.total_rewards_disbursed = state
        .total_rewards_disbursed
        .checked_add(outcome.reward)
        .ok_or(ContractError::ArithmeticOverflow)?;

    Ok(outcome)
}

/// Reward the user could realise right now: matured batches only.
pub fn eligible_rewards(
    env: &Env,
    config: &Config,
    state: &GlobalLedger,
    batches: &Vec<StakeBatch>,
    now: u64,
) -> Result<i128, ContractError> {
    let mut total: i128 = 0;
    for batch in batches.iter() {
        let held = now.saturating_sub(batch.timestamp);
        if held < batch.commitment_seconds {
            continue;
        }
        let share_seconds = batch_share_seconds(&batch, held)?;
        total = total
            .checked_add(matured_reward(env, config, state, share_seconds, held)?)
            .ok_or(ContractError::ArithmeticOverflow)?;
    }
    Ok(total)
}

// ── Internal helpers ────────────────────────────────────────────────────────

fn batch_share_seconds(batch: &StakeBatch, held: u64) -> Result<i128, ContractError> {
    batch
        .shares
        .checked_mul(i128::from(held))
        .ok_or(ContractError::ArithmeticOverflow)
}

fn matured_reward(
    env: &Env,
    config: &Config,
    snapshot: &GlobalLedger,
    share_seconds: i128,
    held: u64,
) -> Result<i128, ContractError> {
    let gross = rewards::gross_reward(
        env,
        snapshot.available_rewards(),
        share_seconds,
        snapshot.total_staking_share_seconds,
    )?;
    let bonus = rewards::bonus_multiplier(
        env,
        config.start_bonus_bps,
        config.bonus_period_seconds,
        held,
    )?;
    rewards::apply_bonus(env, gross, bonus)
}

fn settle_portion(
    env: &Env,
    config: &Config,
    snapshot: &GlobalLedger,
    portion: &StakeBatch,
    principal: i128,
    now: u64,
) -> Result<PortionSettlement, ContractError> {
    let held = now.saturating_sub(portion.timestamp);
    let share_seconds = batch_share_seconds(portion, held)?;

    if held < portion.commitment_seconds {
        let penalty =
            rewards::early_withdrawal_penalty(env, principal, held, portion.commitment_seconds)?;
        return Ok(PortionSettlement {
            reward: 0,
            penalty,
            share_seconds,
        });
    }

    Ok(PortionSettlement {
        reward: matured_reward(env, config, snapshot, share_seconds, held)?,
        penalty: 0,
        share_seconds,
    })
}
