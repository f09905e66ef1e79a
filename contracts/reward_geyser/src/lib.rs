#![no_std]

pub mod accounting;
mod admin;
pub mod events;
pub mod ledger;
pub mod queue;
pub mod rewards;
pub mod schedule;
pub mod shares;

pub use accounting::UnstakeOutcome;
pub use ledger::GlobalLedger;
pub use queue::{ReleasePolicy, StakeBatch};
pub use schedule::UnlockSchedule;

use soroban_sdk::{
    contract, contractimpl, contracttype, symbol_short, token, Address, Env, Symbol, Vec,
};

// ── Storage key constants ────────────────────────────────────────────────────

const INITIALIZED: Symbol = symbol_short!("INIT");
const CONFIG: Symbol = symbol_short!("CONFIG");
const PENALTY_RECIPIENT: Symbol = symbol_short!("PEN_RCPT");

// Admin keys live in `admin`; per-user batch queues in persistent storage,
// see `queue`.

const INSTANCE_TTL_THRESHOLD: u32 = 100_800;
const INSTANCE_TTL_EXTEND_TO: u32 = 518_400;

// ── Contract errors ──────────────────────────────────────────────────────────

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    NotAuthorized = 3,
    /// Zero or negative amount on deposit or lock.
    InvalidAmount = 4,
    /// Zero or negative amount on withdrawal.
    ZeroAmount = 5,
    InsufficientBalance = 6,
    /// The withdrawal converts to zero shares at the current rate.
    AmountTooSmall = 7,
    AlreadyConfigured = 8,
    TokensIdentical = 9,
    InvalidConfig = 10,
    InvalidDuration = 11,
    ScheduleLimitReached = 12,
    ArithmeticOverflow = 13,
    NoPendingAdmin = 14,
    /// Shares are outstanding but back no staked balance.
    PoolDepleted = 15,
}

// ── Configuration ────────────────────────────────────────────────────────────

/// Immutable parameters fixed at `initialize`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// Token users stake. May have an elastic supply.
    pub staking_token: Address,
    /// Token locked into unlock schedules and paid out as reward.
    pub reward_token: Address,
    /// Exchange rate used while the pool is empty.
    pub initial_shares_per_token: i128,
    /// Reward multiplier at zero hold time, in basis points.
    pub start_bonus_bps: u32,
    /// Hold time after which the full reward is paid.
    pub bonus_period_seconds: u64,
    pub release_policy: ReleasePolicy,
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct RewardGeyser;

#[contractimpl]
impl RewardGeyser {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bootstrap the contract.
    ///
    /// * `staking_token`            – token users deposit.
    /// * `reward_token`             – token distributed from unlock schedules.
    /// * `initial_shares_per_token` – shares minted per token into an empty pool.
    /// * `start_bonus_bps`          – reward fraction paid at zero hold time.
    /// * `bonus_period_seconds`     – hold time for the full reward.
    /// * `release_policy`           – how a withdrawal treats a partly needed batch.
    #[allow(clippy::too_many_arguments)]
    pub fn initialize(
        env: Env,
        admin: Address,
        staking_token: Address,
        reward_token: Address,
        initial_shares_per_token: i128,
        start_bonus_bps: u32,
        bonus_period_seconds: u64,
        release_policy: ReleasePolicy,
    ) -> Result<(), ContractError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::AlreadyInitialized);
        }
        if staking_token == reward_token {
            return Err(ContractError::TokensIdentical);
        }
        if initial_shares_per_token <= 0 || i128::from(start_bonus_bps) > rewards::BPS_DENOMINATOR
        {
            return Err(ContractError::InvalidConfig);
        }

        let config = Config {
            staking_token,
            reward_token,
            initial_shares_per_token,
            start_bonus_bps,
            bonus_period_seconds,
            release_policy,
        };

        admin::install(&env, &admin);
        env.storage().instance().set(&INITIALIZED, &true);
        env.storage().instance().set(&CONFIG, &config);
        ledger::store(
            &env,
            &GlobalLedger::starting_at(env.ledger().timestamp()),
        );
        Self::extend_instance(&env);

        events::publish_initialized(&env, admin, &config);

        Ok(())
    }

    // ── Privileged entry points ──────────────────────────────────────────────

    /// Lock `amount` reward tokens from `caller` under a new linear unlock
    /// schedule of `duration_seconds`.
    ///
    /// May be called repeatedly; each call layers an independent schedule.
    pub fn lock_tokens(
        env: Env,
        caller: Address,
        amount: i128,
        duration_seconds: u64,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        admin::authorize(&env, &caller)?;

        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }
        if duration_seconds == 0 {
            return Err(ContractError::InvalidDuration);
        }

        let config = Self::load_config(&env)?;

        // Unlocking so far must be attributed before the new schedule starts.
        let (_, now) = accounting::refresh(&env, env.ledger().timestamp())?;

        let received = Self::pull_tokens(&env, &config.reward_token, &caller, amount);
        let schedule = schedule::add_schedule(&env, received, duration_seconds, now)?;
        Self::extend_instance(&env);

        events::publish_tokens_locked(&env, schedule.total_locked, duration_seconds);

        Ok(())
    }

    /// Set where early-withdrawal penalties are sent. Once only.
    pub fn set_penalty_recipient(
        env: Env,
        caller: Address,
        recipient: Address,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        admin::authorize(&env, &caller)?;

        if env.storage().instance().has(&PENALTY_RECIPIENT) {
            return Err(ContractError::AlreadyConfigured);
        }

        env.storage().instance().set(&PENALTY_RECIPIENT, &recipient);
        Self::extend_instance(&env);

        events::publish_penalty_recipient_set(&env, recipient);

        Ok(())
    }

    // ── Staking ─────────────────────────────────────────────────────────────

    /// Deposit `amount` staking tokens committed for `commitment_seconds`.
    ///
    /// Shares are minted on the amount that actually arrived, measured from
    /// the contract's balance. Returns the shares minted.
    ///
    /// Fails with `PoolDepleted` while outstanding shares back a zero balance.
    pub fn stake(
        env: Env,
        user: Address,
        amount: i128,
        commitment_seconds: u64,
    ) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;
        user.require_auth();

        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }

        let config = Self::load_config(&env)?;
        let (mut state, now) = accounting::refresh(&env, env.ledger().timestamp())?;

        let received = Self::pull_tokens(&env, &config.staking_token, &user, amount);
        if received <= 0 {
            return Err(ContractError::InvalidAmount);
        }

        // With no shares outstanding, whatever the contract already holds
        // joins the first deposit.
        if state.total_staking_shares == 0 {
            let held = token::Client::new(&env, &config.staking_token)
                .balance(&env.current_contract_address());
            state.total_staked_amount = held.saturating_sub(received).max(0);
        }

        let mut batches = queue::load(&env, &user);
        let batch = accounting::stake(
            &env,
            &config,
            &mut state,
            &mut batches,
            received,
            commitment_seconds,
            now,
        )?;

        queue::store(&env, &user, &batches);
        ledger::store(&env, &state);
        Self::extend_instance(&env);

        let total_user_staked = shares::to_amount(&env, &state, queue::total_shares(&batches))?;
        events::publish_staked(&env, user, received, total_user_staked);

        Ok(batch.shares)
    }

    /// Withdraw `amount` of stake, newest batches first.
    ///
    /// Burns enough shares, rounded up, to release exactly `amount`;
    /// requesting the full `total_staked_for` empties the queue.
    ///
    /// Matured batches pay principal plus bonus-scaled reward; batches still
    /// inside their commitment forfeit reward and pay a penalty out of
    /// principal.
    pub fn unstake(env: Env, user: Address, amount: i128) -> Result<UnstakeOutcome, ContractError> {
        Self::require_initialized(&env)?;
        user.require_auth();

        if amount <= 0 {
            return Err(ContractError::ZeroAmount);
        }

        let config = Self::load_config(&env)?;
        let (mut state, now) = accounting::refresh(&env, env.ledger().timestamp())?;

        let mut batches = queue::load(&env, &user);
        let outcome =
            accounting::unstake(&env, &config, &mut state, &mut batches, amount, now)?;

        // Effects before interactions.
        queue::store(&env, &user, &batches);
        ledger::store(&env, &state);
        Self::extend_instance(&env);

        let this = env.current_contract_address();
        let staking = token::Client::new(&env, &config.staking_token);

        let to_user = outcome.principal - outcome.penalty;
        if to_user > 0 {
            staking.transfer(&this, &user, &to_user);
        }
        if outcome.penalty > 0 {
            let recipient = Self::penalty_recipient(&env)?;
            staking.transfer(&this, &recipient, &outcome.penalty);
        }

        let total_user_staked = shares::to_amount(&env, &state, queue::total_shares(&batches))?;
        events::publish_unstaked(
            &env,
            user.clone(),
            outcome.principal,
            total_user_staked,
            outcome.penalty,
        );

        if outcome.reward > 0 {
            token::Client::new(&env, &config.reward_token).transfer(&this, &user, &outcome.reward);
            events::publish_tokens_claimed(&env, user, outcome.reward);
        }

        Ok(outcome)
    }

    /// Reconcile the tracked staked amount with the contract's live
    /// staking-token balance after an external rebase.
    ///
    /// Permissionless. Returns the tracked amount after reconciliation.
    pub fn sync(env: Env) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;

        let config = Self::load_config(&env)?;
        let (mut state, _) = accounting::refresh(&env, env.ledger().timestamp())?;

        let live = token::Client::new(&env, &config.staking_token)
            .balance(&env.current_contract_address());
        let previous = state.total_staked_amount;

        // With no shares outstanding the next deposit mints at the initial
        // rate and takes over whatever is tracked here.
        if live != previous {
            state.total_staked_amount = live;
            ledger::store(&env, &state);
            events::publish_synced(&env, previous, live);
        }
        Self::extend_instance(&env);

        Ok(state.total_staked_amount)
    }

    // ── View functions ───────────────────────────────────────────────────────

    /// Return the staking-asset amount tracked across all users.
    pub fn total_staked(env: Env) -> i128 {
        ledger::load(&env).total_staked_amount
    }

    /// Return `user`'s stake valued at the current exchange rate.
    pub fn total_staked_for(env: Env, user: Address) -> Result<i128, ContractError> {
        let state = ledger::load(&env);
        let batches = queue::load(&env, &user);
        shares::to_amount(&env, &state, queue::total_shares(&batches))
    }

    pub fn total_shares_for(env: Env, user: Address) -> i128 {
        queue::total_shares(&queue::load(&env, &user))
    }

    /// Reward `user` would receive now across all matured batches.
    pub fn total_rewards_for(env: Env, user: Address) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;
        let config = Self::load_config(&env)?;
        let (state, now) = accounting::project(&env, env.ledger().timestamp())?;
        let batches = queue::load(&env, &user);
        accounting::eligible_rewards(&env, &config, &state, &batches, now)
    }

    /// Reward `unstake(user, amount)` would pay right now, without mutating
    /// state.
    pub fn preview_unstake(env: Env, user: Address, amount: i128) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;
        let config = Self::load_config(&env)?;
        let (mut state, now) = accounting::project(&env, env.ledger().timestamp())?;
        let mut batches = queue::load(&env, &user);
        let outcome = accounting::unstake(&env, &config, &mut state, &mut batches, amount, now)?;
        Ok(outcome.reward)
    }

    /// Return `user`'s deposit batches, oldest first.
    pub fn get_batches(env: Env, user: Address) -> Vec<StakeBatch> {
        queue::load(&env, &user)
    }

    pub fn get_schedules(env: Env) -> Vec<UnlockSchedule> {
        schedule::load_all(&env)
    }

    /// Return reward tokens not yet unlocked.
    pub fn total_locked(env: Env) -> Result<i128, ContractError> {
        schedule::still_locked(&env, env.ledger().timestamp())
    }

    /// Return unlocked reward tokens not yet paid out.
    pub fn total_unlocked(env: Env) -> Result<i128, ContractError> {
        let (state, _) = accounting::project(&env, env.ledger().timestamp())?;
        Ok(state.available_rewards())
    }

    /// Return the global ledger projected to the current timestamp.
    pub fn get_ledger(env: Env) -> Result<GlobalLedger, ContractError> {
        let (state, _) = accounting::project(&env, env.ledger().timestamp())?;
        Ok(state)
    }

    pub fn get_config(env: Env) -> Result<Config, ContractError> {
        Self::load_config(&env)
    }

    pub fn get_penalty_recipient(env: Env) -> Option<Address> {
        env.storage().instance().get(&PENALTY_RECIPIENT)
    }

    pub fn is_initialized(env: Env) -> bool {
        env.storage().instance().has(&INITIALIZED)
    }

    pub fn get_admin(env: Env) -> Result<Address, ContractError> {
        admin::current(&env)
    }

    // ── Admin transfer (two-step) ──────────────────────────────────────────

    /// Nominate `new_admin`. Takes effect only once `new_admin` accepts.
    pub fn propose_admin(
        env: Env,
        current_admin: Address,
        new_admin: Address,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        admin::propose(&env, &current_admin, &new_admin)?;
        Self::extend_instance(&env);

        events::publish_admin_transfer_proposed(&env, current_admin, new_admin);
        Ok(())
    }

    pub fn accept_admin(env: Env, new_admin: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        let outgoing = admin::accept(&env, &new_admin)?;
        Self::extend_instance(&env);

        events::publish_admin_transfer_accepted(&env, outgoing, new_admin);
        Ok(())
    }

    pub fn cancel_admin_transfer(env: Env, current_admin: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        let withdrawn = admin::withdraw_proposal(&env, &current_admin)?;

        events::publish_admin_transfer_cancelled(&env, current_admin, withdrawn);
        Ok(())
    }

    pub fn get_pending_admin(env: Env) -> Option<Address> {
        admin::pending(&env)
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    fn require_initialized(env: &Env) -> Result<(), ContractError> {
        if !env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::NotInitialized);
        }
        Ok(())
    }

    fn load_config(env: &Env) -> Result<Config, ContractError> {
        env.storage()
            .instance()
            .get(&CONFIG)
            .ok_or(ContractError::NotInitialized)
    }

    /// Penalties go to the admin until a recipient is configured.
    fn penalty_recipient(env: &Env) -> Result<Address, ContractError> {
        match env.storage().instance().get(&PENALTY_RECIPIENT) {
            Some(recipient) => Ok(recipient),
            None => admin::current(env),
        }
    }

    /// Transfer `amount` from `from` into the contract and return what
    /// actually arrived.
    fn pull_tokens(env: &Env, token_id: &Address, from: &Address, amount: i128) -> i128 {
        let client = token::Client::new(env, token_id);
        let this = env.current_contract_address();

        let before = client.balance(&this);
        client.transfer(from, &this, &amount);
        let after = client.balance(&this);

        after.saturating_sub(before)
    }

    fn extend_instance(env: &Env) {
        env.storage()
            .instance()
            .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND_TO);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(any(test, feature = "testutils"))]
pub mod mock_token;



#[cfg(test)]
mod test_elastic;
