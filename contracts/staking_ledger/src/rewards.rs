//! Fixed-point reward arithmetic.
//!
//! Rewards are `principal × elapsed × rate / SCALE`. The product is formed in
//! the host's 256-bit signed domain so `principal × elapsed` can never wrap,
//! then floored back into `i128`. Rounding is always toward zero, so the
//! ledger can only ever owe less than the exact rational reward.

use soroban_sdk::{Env, I256};

use crate::errors::ContractError;
use crate::storage::StakeRecord;

/// Fixed-point denominator, matching an 18-decimal asset.
pub const SCALE: i128 = 1_000_000_000_000_000_000;

/// Reward earned by `principal` over `elapsed` seconds at `rate`.
pub fn accrue(env: &Env, principal: i128, elapsed: u64, rate: i128) -> Result<i128, ContractError> {
    if principal <= 0 || elapsed == 0 || rate <= 0 {
        return Ok(0);
    }

    let product = I256::from_i128(env, principal)
        .mul(&I256::from_i128(env, i128::from(elapsed)))
        .mul(&I256::from_i128(env, rate));

    product
        .div(&I256::from_i128(env, SCALE))
        .to_i128()
        .ok_or(ContractError::ArithmeticOverflow)
}

/// Total reward owed on `record` as of `now`: the checkpointed carry plus
/// whatever the current principal accrued since the last checkpoint.
pub fn pending(
    env: &Env,
    record: &StakeRecord,
    now: u64,
    rate: i128,
) -> Result<i128, ContractError> {
    if !record.is_active() {
        return Ok(0);
    }

    let elapsed = now.saturating_sub(record.last_accrual);
    let fresh = accrue(env, record.principal, elapsed, rate)?;

    record
        .accrued_unclaimed
        .checked_add(fresh)
        .ok_or(ContractError::ArithmeticOverflow)
}
