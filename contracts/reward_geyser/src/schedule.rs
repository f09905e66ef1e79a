use soroban_sdk::{contracttype, symbol_short, Env, Symbol, Vec};

use crate::{rewards, ContractError};

const SCHEDULES: Symbol = symbol_short!("SCHEDULES");

/// Upper bound on coexisting schedules; every refresh walks the full list.
pub const MAX_SCHEDULES: u32 = 64;

/// One locking action: `total_locked` reward tokens released linearly over
/// `duration_seconds` starting at `start_time`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnlockSchedule {
    pub total_locked: i128,
    pub duration_seconds: u64,
    pub start_time: u64,
    /// Amount already folded into the global unlocked pool. Never decreases.
    pub unlocked_so_far: i128,
}

impl UnlockSchedule {
    /// Amount unlocked as of `now`, never less than what was already counted.
    pub fn unlocked_at(&self, env: &Env, now: u64) -> Result<i128, ContractError> {
        let elapsed = now.saturating_sub(self.start_time);
        let linear = if elapsed >= self.duration_seconds {
            self.total_locked
        } else {
            rewards::mul_div(
                env,
                self.total_locked,
                i128::from(elapsed),
                i128::from(self.duration_seconds),
            )?
        };

        Ok(linear.max(self.unlocked_so_far).min(self.total_locked))
    }
}

// ── Storage helpers ─────────────────────────────────────────────────────────

pub fn load_all(env: &Env) -> Vec<UnlockSchedule> {
    env.storage()
        .instance()
        .get(&SCHEDULES)
        .unwrap_or(Vec::new(env))
}

fn store_all(env: &Env, schedules: &Vec<UnlockSchedule>) {
    env.storage().instance().set(&SCHEDULES, schedules);
}

// ── Tracker operations ──────────────────────────────────────────────────────

/// Append a new schedule starting at `now`.
pub fn add_schedule(
    env: &Env,
    amount: i128,
    duration_seconds: u64,
    now: u64,
) -> Result<UnlockSchedule, ContractError> {
    if amount <= 0 {
        return Err(ContractError::InvalidAmount);
    }
    if duration_seconds == 0 {
        return Err(ContractError::InvalidDuration);
    }

    let mut schedules = load_all(env);
    if schedules.len() >= MAX_SCHEDULES {
        return Err(ContractError::ScheduleLimitReached);
    }

    let schedule = UnlockSchedule {
        total_locked: amount,
        duration_seconds,
        start_time: now,
        unlocked_so_far: 0,
    };
    schedules.push_back(schedule.clone());
    store_all(env, &schedules);

    Ok(schedule)
}

/// Sum of every schedule's unlocked amount at `now`. Read-only.
pub fn total_unlocked(env: &Env, now: u64) -> Result<i128, ContractError> {
    let mut total: i128 = 0;
    for schedule in load_all(env).iter() {
        total = total
            .checked_add(schedule.unlocked_at(env, now)?)
            .ok_or(ContractError::ArithmeticOverflow)?;
    }
    Ok(total)
}

/// Reward still locked at `now`.
pub fn still_locked(env: &Env, now: u64) -> Result<i128, ContractError> {
    let mut locked: i128 = 0;
    for schedule in load_all(env).iter() {
        let remaining = schedule.total_locked - schedule.unlocked_at(env, now)?;
        locked = locked
            .checked_add(remaining)
            .ok_or(ContractError::ArithmeticOverflow)?;
    }
    Ok(locked)
}

/// Amount `advance(now)` would release, without writing anything.
pub fn pending_unlock(env: &Env, now: u64) -> Result<i128, ContractError> {
    let mut pending: i128 = 0;
    for schedule in load_all(env).iter() {
        pending = pending
            .checked_add(schedule.unlocked_at(env, now)? - schedule.unlocked_so_far)
            .ok_or(ContractError::ArithmeticOverflow)?;
    }
    Ok(pending)
}

/// Move every schedule's `unlocked_so_far` up to `now` and return the total
/// newly unlocked amount.
pub fn advance(env: &Env, now: u64) -> Result<i128, ContractError> {
    let mut schedules = load_all(env);
    let mut released: i128 = 0;
    let mut changed = false;

    for i in 0..schedules.len() {
        let Some(mut schedule) = schedules.get(i) else {
            continue;
        };
        let unlocked = schedule.unlocked_at(env, now)?;
        let delta = unlocked - schedule.unlocked_so_far;
        if delta > 0 {
            released = released
                .checked_add(delta)
                .ok_or(ContractError::ArithmeticOverflow)?;
            schedule.unlocked_so_far = unlocked;
            schedules.set(i, schedule);
            changed = true;
        }
    }

    if changed {
        store_all(env, &schedules);
    }
    Ok(released)
}
