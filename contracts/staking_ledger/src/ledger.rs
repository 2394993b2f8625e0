//! Core staking operations.
//!
//! Everything here is generic over [`AssetTransferProvider`] and reads its
//! state through `Env`, so the same code path serves the deployed contract
//! (backed by [`crate::TokenAsset`]) and the test doubles that exercise
//! failing or hostile asset contracts.
//!
//! Every operation that moves assets holds a [`ReentrancyGuard`] for its
//! whole body. Withdrawals follow checks → effects → interaction: the record
//! is cleared before the payout is issued and restored if the payout fails.

use soroban_sdk::{contracttype, log, Address, Env};

use crate::asset::AssetTransferProvider;
use crate::errors::ContractError;
use crate::events;
use crate::guard::ReentrancyGuard;
use crate::rewards;
use crate::storage::{self, StakeRecord};

/// Amounts paid out by a successful [`withdraw`].
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Withdrawal {
    pub principal: i128,
    pub reward: i128,
}

/// Deposit `amount` of the asset for `staker`.
///
/// A first deposit opens the position and starts the lock window. Further
/// deposits add to the principal without moving the lock window; the reward
/// earned so far is checkpointed so the new principal only accrues from now.
pub fn stake<P: AssetTransferProvider>(
    env: &Env,
    asset: &P,
    staker: &Address,
    amount: i128,
) -> Result<StakeRecord, ContractError> {
    let _guard = ReentrancyGuard::acquire(env)?;

    if amount <= 0 {
        log!(env, "stake rejected: non-positive amount", staker.clone(), amount);
        return Err(ContractError::ZeroStakeAmount);
    }

    let now = env.ledger().timestamp();
    let current = storage::load_stake(env, staker);

    let record = if current.is_active() {
        let carried = rewards::pending(env, &current, now, storage::reward_rate(env))?;
        StakeRecord {
            principal: current
                .principal
                .checked_add(amount)
                .ok_or(ContractError::ArithmeticOverflow)?,
            stake_timestamp: current.stake_timestamp,
            accrued_unclaimed: carried,
            last_accrual: now,
        }
    } else {
        StakeRecord {
            principal: amount,
            stake_timestamp: now,
            accrued_unclaimed: 0,
            last_accrual: now,
        }
    };

    let new_total = storage::total_staked(env)
        .checked_add(amount)
        .ok_or(ContractError::ArithmeticOverflow)?;

    // Nothing has been written yet, so a rejected pull leaves no trace.
    asset.transfer_from(env, staker, &env.current_contract_address(), amount)?;

    storage::store_stake(env, staker, &record);
    storage::set_total_staked(env, new_total);

    events::publish_staked(env, staker.clone(), amount, new_total);

    Ok(record)
}

/// Close `staker`'s position, paying out principal plus reward.
pub fn withdraw<P: AssetTransferProvider>(
    env: &Env,
    asset: &P,
    staker: &Address,
) -> Result<Withdrawal, ContractError> {
    let _guard = ReentrancyGuard::acquire(env)?;

    // 1. Checks.
    let record = storage::load_stake(env, staker);
    if !record.is_active() {
        return Err(ContractError::NoActiveStake);
    }

    let now = env.ledger().timestamp();
    if now.saturating_sub(record.stake_timestamp) < storage::min_stake_period(env) {
        log!(
            env,
            "withdraw rejected: still locked",
            staker.clone(),
            record.stake_timestamp
        );
        return Err(ContractError::MinimumStakePeriodNotMet);
    }

    let reward = rewards::pending(env, &record, now, storage::reward_rate(env))?;
    let payout = record
        .principal
        .checked_add(reward)
        .ok_or(ContractError::ArithmeticOverflow)?;

    let total = storage::total_staked(env);
    let remaining = total
        .checked_sub(record.principal)
        .ok_or(ContractError::ArithmeticOverflow)?;

    // Rewards come out of custody in excess of staked principal only.
    if reward > reward_pool(env, asset, total) {
        log!(env, "withdraw rejected: reward pool short", staker.clone(), reward);
        return Err(ContractError::InsufficientRewardPool);
    }

    // 2. Effects.
    storage::remove_stake(env, staker);
    storage::set_total_staked(env, remaining);

    // 3. Interaction.
    if let Err(err) = asset.transfer(env, staker, payout) {
        storage::store_stake(env, staker, &record);
        storage::set_total_staked(env, total);
        return Err(err);
    }

    events::publish_withdrawn(env, staker.clone(), record.principal, reward);

    Ok(Withdrawal {
        principal: record.principal,
        reward,
    })
}

/// Top up the reward pool with `amount` from `funder`. Returns the new pool size.
pub fn fund_rewards<P: AssetTransferProvider>(
    env: &Env,
    asset: &P,
    funder: &Address,
    amount: i128,
) -> Result<i128, ContractError> {
    let _guard = ReentrancyGuard::acquire(env)?;

    if amount <= 0 {
        return Err(ContractError::ZeroFundAmount);
    }

    asset.transfer_from(env, funder, &env.current_contract_address(), amount)?;

    events::publish_rewards_funded(env, funder.clone(), amount);

    Ok(reward_pool(env, asset, storage::total_staked(env)))
}

/// Reward owed to `account` right now. Never mutates state.
pub fn reward_of(env: &Env, account: &Address) -> Result<i128, ContractError> {
    let record = storage::load_stake(env, account);
    rewards::pending(
        env,
        &record,
        env.ledger().timestamp(),
        storage::reward_rate(env),
    )
}

/// Custody held beyond `total_staked`, floored at zero.
pub fn reward_pool<P: AssetTransferProvider>(env: &Env, asset: &P, total_staked: i128) -> i128 {
    asset
        .balance_of(env, &env.current_contract_address())
        .saturating_sub(total_staked)
        .max(0)
}

/// Earliest timestamp at which `account` may withdraw, if it has a position.
pub fn unlock_time(env: &Env, account: &Address) -> Option<u64> {
    let record = storage::load_stake(env, account);
    record
        .is_active()
        .then(|| record.stake_timestamp.saturating_add(storage::min_stake_period(env)))
}
