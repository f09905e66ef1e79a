use soroban_sdk::{contracttype, symbol_short, Env, Symbol};

use crate::ContractError;

const LEDGER: Symbol = symbol_short!("LEDGER");

/// Global accounting state, refreshed at the top of every operation.
///
/// `cumulative_unlocked_amount − total_rewards_disbursed` is the unlocked
/// reward pool still available to stakers.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct GlobalLedger {
    /// Sum of `shares` over every batch of every user.
    pub total_staking_shares: i128,
    /// Staking-asset amount backing `total_staking_shares`.
    pub total_staked_amount: i128,
    /// Accumulated `shares × seconds` of every live batch.
    pub total_staking_share_seconds: i128,
    pub last_accounting_timestamp: u64,
    /// Sum of `unlocked_so_far` across all unlock schedules.
    pub cumulative_unlocked_amount: i128,
    pub total_rewards_disbursed: i128,
}

impl GlobalLedger {
    /// A fresh ledger whose clock starts at `now`.
    pub fn starting_at(now: u64) -> Self {
        Self {
            last_accounting_timestamp: now,
            ..Self::default()
        }
    }

    /// Unlocked reward not yet paid out.
    pub fn available_rewards(&self) -> i128 {
        self.cumulative_unlocked_amount
            .saturating_sub(self.total_rewards_disbursed)
    }

    /// Advance share-seconds to `now` and fold in `newly_unlocked` reward.
    ///
    /// A timestamp behind the last accounting point counts as zero elapsed
    /// time. Returns the effective timestamp the rest of the operation must
    /// use, which never moves backwards.
    pub fn accrue(&mut self, now: u64, newly_unlocked: i128) -> Result<u64, ContractError> {
        let elapsed = now.saturating_sub(self.last_accounting_timestamp);
        if elapsed > 0 {
            let growth = self
                .total_staking_shares
                .checked_mul(i128::from(elapsed))
                .ok_or(ContractError::ArithmeticOverflow)?;
            self.total_staking_share_seconds = self
                .total_staking_share_seconds
                .checked_add(growth)
                .ok_or(ContractError::ArithmeticOverflow)?;
            self.last_accounting_timestamp = now;
        }

        self.cumulative_unlocked_amount = self
            .cumulative_unlocked_amount
            .checked_add(newly_unlocked)
            .ok_or(ContractError::ArithmeticOverflow)?;

        Ok(self.last_accounting_timestamp)
    }
}

// ── Storage helpers ─────────────────────────────────────────────────────────

pub fn load(env: &Env) -> GlobalLedger {
    env.storage().instance().get(&LEDGER).unwrap_or_default()
}

pub fn store(env: &Env, ledger: &GlobalLedger) {
    env.storage().instance().set(&LEDGER, ledger);
}
