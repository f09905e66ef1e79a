use soroban_sdk::{Env, I256};

use crate::ContractError;

/// Fixed-point scaling factor for the bonus multiplier.
///
/// A multiplier of `PRECISION` means "pay the full gross reward"; values are
/// truncated at every multiplication so the pool is never over-paid.
pub const PRECISION: i128 = 1_000_000_000_000;

/// Basis-point denominator used for `start_bonus_bps`.
pub const BPS_DENOMINATOR: i128 = 10_000;

// ── Arithmetic ──────────────────────────────────────────────────────────────

/// `a × b / denominator`, floored, for non-negative operands.
///
/// Falls back to a 256-bit intermediate when `a × b` does not fit in `i128`
/// (reward pool × share-seconds routinely does). Only the final quotient has
/// to fit.
pub fn mul_div(env: &Env, a: i128, b: i128, denominator: i128) -> Result<i128, ContractError> {
    if denominator <= 0 {
        return Err(ContractError::ArithmeticOverflow);
    }
    if let Some(product) = a.checked_mul(b) {
        return Ok(product / denominator);
    }

    let wide = I256::from_i128(env, a)
        .mul(&I256::from_i128(env, b))
        .div(&I256::from_i128(env, denominator));
    wide.to_i128().ok_or(ContractError::ArithmeticOverflow)
}

/// `a × b / denominator`, rounded up, for non-negative operands.
pub fn mul_div_ceil(
    env: &Env,
    a: i128,
    b: i128,
    denominator: i128,
) -> Result<i128, ContractError> {
    if denominator <= 0 {
        return Err(ContractError::ArithmeticOverflow);
    }
    if let Some(product) = a.checked_mul(b) {
        let quotient = product / denominator;
        if product % denominator == 0 {
            return Ok(quotient);
        }
        return quotient
            .checked_add(1)
            .ok_or(ContractError::ArithmeticOverflow);
    }

    let product = I256::from_i128(env, a).mul(&I256::from_i128(env, b));
    let divisor = I256::from_i128(env, denominator);
    let floor = product.div(&divisor);
    let exact = floor.mul(&divisor) == product;
    let floor = floor.to_i128().ok_or(ContractError::ArithmeticOverflow)?;
    if exact {
        Ok(floor)
    } else {
        floor.checked_add(1).ok_or(ContractError::ArithmeticOverflow)
    }
}

// ── Reward curve ────────────────────────────────────────────────────────────

/// Bonus multiplier for a batch held `held` seconds, scaled by `PRECISION`.
///
/// ```text
/// start = start_bonus_bps / 10_000
/// bonus = start + (1 − start) × min(1, held / bonus_period)
/// ```
///
/// A zero `bonus_period` disables the ramp and always yields the full
/// multiplier.
pub fn bonus_multiplier(
    env: &Env,
    start_bonus_bps: u32,
    bonus_period: u64,
    held: u64,
) -> Result<i128, ContractError> {
    if bonus_period == 0 || held >= bonus_period {
        return Ok(PRECISION);
    }

    let start = i128::from(start_bonus_bps) * PRECISION / BPS_DENOMINATOR;
    let ramp = mul_div(
        env,
        PRECISION - start,
        i128::from(held),
        i128::from(bonus_period),
    )?;

    Ok(start + ramp)
}

/// A batch's pro-rata cut of the available unlocked pool.
///
/// ```text
/// gross = available_pool × batch_share_seconds / total_share_seconds
/// ```
///
/// Returns zero while nothing has been unlocked or no share-seconds exist yet.
pub fn gross_reward(
    env: &Env,
    available_pool: i128,
    batch_share_seconds: i128,
    total_share_seconds: i128,
) -> Result<i128, ContractError> {
    if available_pool <= 0 || batch_share_seconds <= 0 || total_share_seconds <= 0 {
        return Ok(0);
    }

    let gross = mul_div(env, available_pool, batch_share_seconds, total_share_seconds)?;
    Ok(gross.min(available_pool))
}

/// Scale a gross reward by a `PRECISION`-based multiplier.
pub fn apply_bonus(env: &Env, gross: i128, bonus: i128) -> Result<i128, ContractError> {
    mul_div(env, gross, bonus, PRECISION)
}

/// Principal deduction for a withdrawal before the commitment matured.
///
/// ```text
/// penalty = principal × (commitment − held) / commitment / 2
/// ```
///
/// Zero once `held >= commitment`, so a zero commitment never penalises.
pub fn early_withdrawal_penalty(
    env: &Env,
    principal: i128,
    held: u64,
    commitment: u64,
) -> Result<i128, ContractError> {
    if held >= commitment || principal <= 0 {
        return Ok(0);
    }

    let time_left = i128::from(commitment - held);
    mul_div(env, principal, time_left, 2 * i128::from(commitment))
}

// ── Unit tests ──────────────────────────────────────────────────────────────
