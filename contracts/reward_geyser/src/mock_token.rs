//! Elastic-supply token used to exercise rebase and taxed-transfer handling.
//! Compiled for tests and behind the `testutils` feature only.
//!
//! Balances are stored as internal units ("gons"); a rebase changes how many
//! gons make one token, so every holder's balance moves without a transfer.

use soroban_sdk::{contract, contractimpl, contracttype, Address, Env, MuxedAddress};

const INITIAL_GONS_PER_TOKEN: i128 = 1_000_000_000;
const MAX_GONS_PER_TOKEN: i128 = 1_000_000_000_000_000_000_000;
const FEE_DENOMINATOR: i128 = 10_000;

#[contracttype]
enum TokenKey {
    Gons(Address),
    GonsPerToken,
    FeeBps,
}

#[contract]
pub struct ElasticToken;

#[contractimpl]
impl ElasticToken {
    pub fn mint(env: Env, to: Address, amount: i128) {
        let gons = amount * Self::gons_per_token(&env);
        let held = Self::gons_of(&env, &to);
        env.storage()
            .instance()
            .set(&TokenKey::Gons(to), &(held + gons));
    }

    pub fn balance(env: Env, id: Address) -> i128 {
        Self::gons_of(&env, &id) / Self::gons_per_token(&env)
    }

    /// Moves `amount`, burning the configured fee from what `to` receives.
    pub fn transfer(env: Env, from: Address, to: MuxedAddress, amount: i128) {
        from.require_auth();
        let to = to.address();
        let rate = Self::gons_per_token(&env);
        let fee_bps: i128 = env.storage().instance().get(&TokenKey::FeeBps).unwrap_or(0);

        let debit = amount * rate;
        let held = Self::gons_of(&env, &from);
        if held < debit {
            panic!("insufficient balance");
        }
        let credit = (amount - amount * fee_bps / FEE_DENOMINATOR) * rate;

        env.storage()
            .instance()
            .set(&TokenKey::Gons(from), &(held - debit));
        let received = Self::gons_of(&env, &to);
        env.storage()
            .instance()
            .set(&TokenKey::Gons(to), &(received + credit));
    }

    /// Scale every balance by `numerator / denominator`.
    ///
    /// A rebase that would push the internal rate out of range is ignored.
    pub fn rebase(env: Env, numerator: i128, denominator: i128) {
        if numerator <= 0 || denominator <= 0 {
            return;
        }
        let rate = Self::gons_per_token(&env)
            .checked_mul(denominator)
            .map(|scaled| scaled / numerator);
        if let Some(rate) = rate.filter(|r| (1..=MAX_GONS_PER_TOKEN).contains(r)) {
            env.storage().instance().set(&TokenKey::GonsPerToken, &rate);
        }
    }

    pub fn set_fee_bps(env: Env, fee_bps: i128) {
        env.storage().instance().set(&TokenKey::FeeBps, &fee_bps);
    }

    fn gons_per_token(env: &Env) -> i128 {
        env.storage()
            .instance()
            .get(&TokenKey::GonsPerToken)
            .unwrap_or(INITIAL_GONS_PER_TOKEN)
    }

    fn gons_of(env: &Env, id: &Address) -> i128 {
        env.storage()
            .instance()
            .get(&TokenKey::Gons(id.clone()))
            .unwrap_or(0)
    }
}
