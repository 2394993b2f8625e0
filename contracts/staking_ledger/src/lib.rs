#![no_std]

pub mod asset;
pub mod errors;
pub mod events;
pub mod guard;
pub mod ledger;
pub mod rewards;
pub mod storage;

use soroban_sdk::{contract, contractimpl, Address, Env};

pub use asset::{AssetTransferProvider, TokenAsset};
pub use errors::ContractError;
pub use ledger::Withdrawal;
pub use storage::StakeRecord;

// ── Economic parameters ──────────────────────────────────────────────────────

/// Reward per second per staked unit, in units of [`rewards::SCALE`].
pub const REWARD_RATE: i128 = 100;

/// Seconds a position must be held before it can be withdrawn.
pub const MIN_STAKE_PERIOD: u64 = 7 * 24 * 60 * 60;

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct StakingLedger;

#[contractimpl]
impl StakingLedger {
    /// Deploy the ledger over `token`, the asset users stake and are paid in.
    ///
    /// The reward rate and lock period are fixed here for the lifetime of the
    /// deployment.
    pub fn __constructor(env: Env, token: Address) {
        storage::write_config(&env, &token, REWARD_RATE, MIN_STAKE_PERIOD);
        events::publish_initialized(&env, token, REWARD_RATE, MIN_STAKE_PERIOD);
    }

    // ── Staking ─────────────────────────────────────────────────────────────

    /// Deposit `amount` tokens from `staker` into custody.
    pub fn stake(env: Env, staker: Address, amount: i128) -> Result<(), ContractError> {
        staker.require_auth();

        let asset = TokenAsset::load(&env)?;
        ledger::stake(&env, &asset, &staker, amount)?;

        storage::extend_instance(&env);
        Ok(())
    }

    /// Withdraw the full position plus accrued reward.
    ///
    /// Fails with `MinimumStakePeriodNotMet` inside the lock window and with
    /// `NoActiveStake` when there is nothing to withdraw.
    pub fn withdraw(env: Env, staker: Address) -> Result<Withdrawal, ContractError> {
        staker.require_auth();

        let asset = TokenAsset::load(&env)?;
        let withdrawal = ledger::withdraw(&env, &asset, &staker)?;

        storage::extend_instance(&env);
        Ok(withdrawal)
    }

    /// Add `amount` tokens from `funder` to the reward pool.
    ///
    /// Returns the pool size after the deposit.
    pub fn fund_rewards(env: Env, funder: Address, amount: i128) -> Result<i128, ContractError> {
        funder.require_auth();

        let asset = TokenAsset::load(&env)?;
        let pool = ledger::fund_rewards(&env, &asset, &funder, amount)?;

        storage::extend_instance(&env);
        Ok(pool)
    }

    // ── View functions ───────────────────────────────────────────────────────

    /// Reward `account` would receive if it withdrew now.
    pub fn get_reward(env: Env, account: Address) -> Result<i128, ContractError> {
        ledger::reward_of(&env, &account)
    }

    pub fn get_stake(env: Env, account: Address) -> StakeRecord {
        storage::load_stake(&env, &account)
    }

    /// Earliest timestamp at which `account` may withdraw.
    pub fn get_unlock_time(env: Env, account: Address) -> Option<u64> {
        ledger::unlock_time(&env, &account)
    }

    pub fn get_total_staked(env: Env) -> i128 {
        storage::total_staked(&env)
    }

    /// Tokens held in custody beyond staked principal.
    pub fn get_reward_pool(env: Env) -> Result<i128, ContractError> {
        let asset = TokenAsset::load(&env)?;
        Ok(ledger::reward_pool(&env, &asset, storage::total_staked(&env)))
    }

    pub fn get_reward_rate(env: Env) -> i128 {
        storage::reward_rate(&env)
    }

    pub fn get_min_stake_period(env: Env) -> u64 {
        storage::min_stake_period(&env)
    }

    pub fn get_token(env: Env) -> Result<Address, ContractError> {
        storage::token(&env)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────


#[cfg(test)]
mod test_reentrancy;
