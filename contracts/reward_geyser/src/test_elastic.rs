extern crate std;

use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    token::StellarAssetClient,
    Address, Env,
};

use crate::{
    mock_token::{ElasticToken, ElasticTokenClient},
    ContractError, ReleasePolicy, RewardGeyser, RewardGeyserClient,
};

const T0: u64 = 1_700_000_000;

struct ElasticContext {
    env: Env,
    client: RewardGeyserClient<'static>,
    admin: Address,
    token: ElasticTokenClient<'static>,
    reward_token: Address,
}

fn setup(initial_shares_per_token: i128) -> ElasticContext {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(T0);

    let token_id = env.register(ElasticToken, ());
    let token = ElasticTokenClient::new(&env, &token_id);
    let reward_token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();

    let contract_id = env.register(RewardGeyser, ());
    let client = RewardGeyserClient::new(&env, &contract_id);

    let admin = Address::generate(&env);
    client.initialize(
        &admin,
        &token_id,
        &reward_token,
        &initial_shares_per_token,
        &0,
        &0,
        &ReleasePolicy::Partial,
    );

    ElasticContext {
        env,
        client,
        admin,
        token,
        reward_token,
    }
}

fn staker(ctx: &ElasticContext, amount: i128) -> Address {
    let user = Address::generate(&ctx.env);
    ctx.token.mint(&user, &amount);
    user
}

// ── Rebases ───────────────────────────────────────────────────────────────────

#[test]
fn test_positive_rebase_is_shared_pro_rata() {
    let ctx = setup(1_000_000);
    let alice = staker(&ctx, 1_000);
    let bob = staker(&ctx, 1_000);
    ctx.client.stake(&alice, &1_000, &0);
    ctx.client.stake(&bob, &1_000, &0);

    // +25% supply expansion.
    ctx.token.rebase(&5, &4);
    assert_eq!(ctx.token.balance(&ctx.client.address), 2_500);

    // Tracked totals only move on sync.
    assert_eq!(ctx.client.total_staked_for(&alice), 1_000);
    assert_eq!(ctx.client.sync(), 2_500);
    assert_eq!(ctx.client.total_staked(), 2_500);
    assert_eq!(ctx.client.total_staked_for(&alice), 1_250);
    assert_eq!(ctx.client.total_staked_for(&bob), 1_250);

    // Share balances are untouched by the rebase.
    assert_eq!(ctx.client.total_shares_for(&alice), 1_000 * 1_000_000);

    let outcome = ctx.client.unstake(&alice, &1_250);
    assert_eq!(outcome.principal, 1_250);
    assert_eq!(ctx.token.balance(&alice), 1_250);
    assert_eq!(ctx.client.total_staked(), 1_250);
    assert_eq!(ctx.client.total_staked_for(&bob), 1_250);
}

#[test]
fn test_negative_rebase_is_shared_pro_rata() {
    let ctx = setup(1_000_000);
    let alice = staker(&ctx, 1_000);
    let bob = staker(&ctx, 1_000);
    ctx.client.stake(&alice, &1_000, &0);
    ctx.client.stake(&bob, &1_000, &0);

    // −20% supply contraction.
    ctx.token.rebase(&4, &5);
    assert_eq!(ctx.client.sync(), 1_600);
    assert_eq!(ctx.client.total_staked_for(&alice), 800);

    // Withdrawing the pre-rebase amount is no longer possible.
    match ctx.client.try_unstake(&alice, &1_000) {
        Err(Ok(e)) => assert_eq!(e, ContractError::InsufficientBalance),
        _ => unreachable!("Expected InsufficientBalance error"),
    }

    let outcome = ctx.client.unstake(&bob, &800);
    assert_eq!(outcome.principal, 800);
    assert_eq!(ctx.token.balance(&bob), 800);
}

#[test]
fn test_deposit_after_rebase_uses_live_rate() {
    let ctx = setup(1_000_000);
    let alice = staker(&ctx, 1_000);
    ctx.client.stake(&alice, &1_000, &0);

    ctx.token.rebase(&2, &1);
    ctx.client.sync();

    // 2_000 tracked against 1e9 shares: each token now buys half as many.
    let bob = staker(&ctx, 500);
    let minted = ctx.client.stake(&bob, &500, &0);
    assert_eq!(minted, 250_000_000);
    assert_eq!(ctx.client.total_staked_for(&bob), 500);
    assert_eq!(ctx.client.total_staked_for(&alice), 2_000);
}

#[test]
fn test_sync_without_change_is_noop() {
    let ctx = setup(1_000_000);
    let alice = staker(&ctx, 700);
    ctx.client.stake(&alice, &700, &0);

    let before = ctx.client.get_ledger();
    assert_eq!(ctx.client.sync(), 700);
    assert_eq!(ctx.client.get_ledger(), before);
}

#[test]
fn test_first_staker_adopts_balance_held_without_shares() {
    let ctx = setup(1_000_000);

    // Tokens sent straight to the contract with nobody staked.
    ctx.token.mint(&ctx.client.address, &50);
    assert_eq!(ctx.client.total_staked(), 0);
    assert_eq!(ctx.client.sync(), 50);
    assert_eq!(ctx.client.total_staked(), 50);
    assert_eq!(ctx.client.total_shares_for(&ctx.admin), 0);

    // The first staker gets the initial rate and adopts the stray balance.
    let alice = staker(&ctx, 100);
    assert_eq!(ctx.client.stake(&alice, &100, &0), 100 * 1_000_000);
    assert_eq!(ctx.client.total_staked(), 150);
    assert_eq!(ctx.client.total_staked_for(&alice), 150);
    assert_eq!(ctx.client.sync(), 150);
}

#[test]
fn test_unsynced_stray_balance_joins_first_deposit() {
    let ctx = setup(1_000_000);
    ctx.token.mint(&ctx.client.address, &30);

    let alice = staker(&ctx, 70);
    ctx.client.stake(&alice, &70, &0);

    assert_eq!(ctx.client.total_staked(), 100);
    assert_eq!(ctx.client.total_staked_for(&alice), 100);
    assert_eq!(ctx.client.get_batches(&alice).get(0).unwrap().deposited_amount, 70);
}

#[test]
fn test_deposit_too_small_after_rebase() {
    let ctx = setup(1);
    let alice = staker(&ctx, 10);
    ctx.client.stake(&alice, &10, &0);

    // Ten tokens per share after a 10× expansion.
    ctx.token.rebase(&10, &1);
    assert_eq!(ctx.client.sync(), 100);

    let bob = staker(&ctx, 5);
    match ctx.client.try_stake(&bob, &5, &0) {
        Err(Ok(e)) => assert_eq!(e, ContractError::AmountTooSmall),
        _ => unreachable!("Expected AmountTooSmall error"),
    }
    assert_eq!(ctx.token.balance(&bob), 5);
}

#[test]
fn test_small_withdrawal_burns_a_whole_share() {
    let ctx = setup(1);
    let alice = staker(&ctx, 10);
    ctx.client.stake(&alice, &10, &0);
    ctx.token.rebase(&10, &1);
    ctx.client.sync();

    // Half a share's worth still costs a whole share; the pool keeps the rest.
    let outcome = ctx.client.unstake(&alice, &5);
    assert_eq!(outcome.principal, 5);
    assert_eq!(ctx.token.balance(&alice), 5);
    assert_eq!(ctx.client.total_shares_for(&alice), 9);
    assert_eq!(ctx.client.total_staked(), 95);
    assert_eq!(ctx.client.total_staked_for(&alice), 95);
}

#[test]
fn test_full_exit_after_uneven_rebase_pays_reported_value() {
    let ctx = setup(1);
    let alice = staker(&ctx, 3);
    let bob = staker(&ctx, 4);
    ctx.client.stake(&alice, &3, &0);
    ctx.client.stake(&bob, &4, &0);

    // 7 shares now backed by 10 tokens.
    ctx.token.rebase(&10, &7);
    assert_eq!(ctx.client.sync(), 10);

    let value = ctx.client.total_staked_for(&alice);
    assert_eq!(value, 4);

    let outcome = ctx.client.unstake(&alice, &value);
    assert_eq!(outcome.principal, 4);
    assert_eq!(ctx.token.balance(&alice), 4);
    assert_eq!(ctx.client.total_shares_for(&alice), 0);
    assert_eq!(ctx.client.get_batches(&alice).len(), 0);

    // Nothing is stranded: bob exits with everything that is left.
    let value = ctx.client.total_staked_for(&bob);
    assert_eq!(value, 6);
    assert_eq!(ctx.client.unstake(&bob, &value).principal, 6);
    assert_eq!(ctx.client.total_staked(), 0);
    assert_eq!(ctx.token.balance(&ctx.client.address), 0);
}

#[test]
fn test_partial_withdrawal_after_rebase_pays_exact_amount() {
    let ctx = setup(1);
    let alice = staker(&ctx, 3);
    let bob = staker(&ctx, 4);
    ctx.client.stake(&alice, &3, &0);
    ctx.client.stake(&bob, &4, &0);
    ctx.token.rebase(&10, &7);
    ctx.client.sync();

    assert_eq!(ctx.client.total_staked_for(&bob), 5);
    let outcome = ctx.client.unstake(&bob, &3);

    // ceil(3 × 7 / 10) = 3 shares burned for exactly 3 tokens.
    assert_eq!(outcome.principal, 3);
    assert_eq!(ctx.token.balance(&bob), 3);
    assert_eq!(ctx.client.total_shares_for(&bob), 1);
    assert_eq!(ctx.client.total_staked(), 7);
    assert_eq!(ctx.client.total_staked_for(&bob), 1);
    assert_eq!(ctx.client.total_staked_for(&alice), 5);
}

#[test]
fn test_deposit_refused_while_shares_are_unbacked() {
    let ctx = setup(1_000_000);
    let alice = staker(&ctx, 1_000);
    ctx.client.stake(&alice, &1_000, &0);

    // Collapse the supply until the contract's balance floors to zero.
    ctx.token.rebase(&1, &1_000_000_000_000);
    assert_eq!(ctx.token.balance(&ctx.client.address), 0);
    assert_eq!(ctx.client.sync(), 0);
    assert_eq!(ctx.client.total_staked_for(&alice), 0);

    let bob = staker(&ctx, 5);
    match ctx.client.try_stake(&bob, &5, &0) {
        Err(Ok(e)) => assert_eq!(e, ContractError::PoolDepleted),
        _ => unreachable!("Expected PoolDepleted error"),
    }
    assert_eq!(ctx.token.balance(&bob), 5);
    assert_eq!(ctx.client.total_shares_for(&bob), 0);

    match ctx.client.try_unstake(&alice, &1) {
        Err(Ok(e)) => assert_eq!(e, ContractError::InsufficientBalance),
        _ => unreachable!("Expected InsufficientBalance error"),
    }
}

// ── Transfer fees ─────────────────────────────────────────────────────────────

#[test]
fn test_taxed_transfer_credits_received_amount() {
    let ctx = setup(1_000_000);
    let alice = staker(&ctx, 1_000);

    // 1% burned on every transfer.
    ctx.token.set_fee_bps(&100);
    let minted = ctx.client.stake(&alice, &1_000, &0);

    assert_eq!(minted, 990 * 1_000_000);
    assert_eq!(ctx.client.total_staked(), 990);
    assert_eq!(ctx.client.total_staked_for(&alice), 990);
    assert_eq!(ctx.client.get_batches(&alice).get(0).unwrap().deposited_amount, 990);
    assert_eq!(ctx.token.balance(&ctx.client.address), 990);

    let outcome = ctx.client.unstake(&alice, &990);
    assert_eq!(outcome.principal, 990);
    assert_eq!(ctx.token.balance(&alice), 981);
    assert_eq!(ctx.client.total_staked(), 0);
}

#[test]
fn test_rewards_still_paid_in_reward_token() {
    let ctx = setup(1_000_000);
    StellarAssetClient::new(&ctx.env, &ctx.reward_token).mint(&ctx.admin, &1_000);
    ctx.client.lock_tokens(&ctx.admin, &1_000, &100);

    let alice = staker(&ctx, 100);
    ctx.client.stake(&alice, &100, &0);
    ctx.token.rebase(&3, &2);
    ctx.client.sync();

    ctx.env.ledger().set_timestamp(T0 + 100);
    let outcome = ctx.client.unstake(&alice, &150);

    assert_eq!(outcome.principal, 150);
    assert_eq!(outcome.reward, 1_000);
    assert_eq!(ctx.token.balance(&alice), 150);
}
