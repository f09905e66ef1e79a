#![allow(deprecated)] // events().publish migration tracked separately

use soroban_sdk::{symbol_short, Address, Env};

use crate::queue::ReleasePolicy;

// ── Event payloads ──────────────────────────────────────────────────────────

/// Fired once when the contract is bootstrapped.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub admin: Address,
    pub staking_token: Address,
    pub reward_token: Address,
    pub initial_shares_per_token: i128,
    pub start_bonus_bps: u32,
    pub bonus_period_seconds: u64,
    pub release_policy: ReleasePolicy,
    pub timestamp: u64,
}

/// Fired when a user deposits stake.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakedEvent {
    pub user: Address,
    pub amount: i128,
    pub total_user_staked: i128,
    pub timestamp: u64,
}

/// Fired when a withdrawal releases principal.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnstakedEvent {
    pub user: Address,
    pub amount: i128,
    pub total_user_staked: i128,
    pub penalty_amount: i128,
    pub timestamp: u64,
}

/// Fired when a withdrawal pays out reward tokens.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokensClaimedEvent {
    pub user: Address,
    pub amount: i128,
    pub timestamp: u64,
}

/// Fired when reward tokens are locked under a new unlock schedule.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokensLockedEvent {
    pub amount: i128,
    pub duration_seconds: u64,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PenaltyRecipientSetEvent {
    pub recipient: Address,
    pub timestamp: u64,
}

/// Fired when the tracked staked amount is reconciled with the live balance.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SyncedEvent {
    pub previous: i128,
    pub current: i128,
    pub timestamp: u64,
}

/// Fired when an admin transfer is proposed.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AdminTransferProposedEvent {
    pub current_admin: Address,
    pub proposed_admin: Address,
    pub timestamp: u64,
}

/// Fired when an admin transfer is accepted.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AdminTransferAcceptedEvent {
    pub old_admin: Address,
    pub new_admin: Address,
    pub timestamp: u64,
}

/// Fired when a pending admin transfer is cancelled.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AdminTransferCancelledEvent {
    pub admin: Address,
    pub cancelled_proposed: Address,
    pub timestamp: u64,
}

// ── Publishers ──────────────────────────────────────────────────────────────

pub fn publish_initialized(env: &Env, admin: Address, config: &crate::Config) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            admin,
            staking_token: config.staking_token.clone(),
            reward_token: config.reward_token.clone(),
            initial_shares_per_token: config.initial_shares_per_token,
            start_bonus_bps: config.start_bonus_bps,
            bonus_period_seconds: config.bonus_period_seconds,
            release_policy: config.release_policy,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_staked(env: &Env, user: Address, amount: i128, total_user_staked: i128) {
    env.events().publish(
        (symbol_short!("STAKED"), user.clone()),
        StakedEvent {
            user,
            amount,
            total_user_staked,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_unstaked(
    env: &Env,
    user: Address,
    amount: i128,
    total_user_staked: i128,
    penalty_amount: i128,
) {
    env.events().publish(
        (symbol_short!("UNSTAKED"), user.clone()),
        UnstakedEvent {
            user,
            amount,
            total_user_staked,
            penalty_amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_tokens_claimed(env: &Env, user: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("CLAIMED"), user.clone()),
        TokensClaimedEvent {
            user,
            amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_tokens_locked(env: &Env, amount: i128, duration_seconds: u64) {
    env.events().publish(
        (symbol_short!("LOCKED"),),
        TokensLockedEvent {
            amount,
            duration_seconds,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_penalty_recipient_set(env: &Env, recipient: Address) {
    env.events().publish(
        (symbol_short!("PEN_RCPT"),),
        PenaltyRecipientSetEvent {
            recipient,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_synced(env: &Env, previous: i128, current: i128) {
    env.events().publish(
        (symbol_short!("SYNCED"),),
        SyncedEvent {
            previous,
            current,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_admin_transfer_proposed(env: &Env, current_admin: Address, proposed_admin: Address) {
    env.events().publish(
        (symbol_short!("ADM_PROP"), current_admin.clone()),
        AdminTransferProposedEvent {
            current_admin,
            proposed_admin,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_admin_transfer_accepted(env: &Env, old_admin: Address, new_admin: Address) {
    env.events().publish(
        (symbol_short!("ADM_ACPT"), new_admin.clone()),
        AdminTransferAcceptedEvent {
            old_admin,
            new_admin,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_admin_transfer_cancelled(env: &Env, admin: Address, cancelled_proposed: Address) {
    env.events().publish(
        (symbol_short!("ADM_CNCL"), admin.clone()),
        AdminTransferCancelledEvent {
            admin,
            cancelled_proposed,
            timestamp: env.ledger().timestamp(),
        },
    );
}
