use soroban_sdk::{contracttype, Address, Env};

use crate::errors::ContractError;

// ── TTL policy (ledgers) ─────────────────────────────────────────────────────

const TTL_THRESHOLD: u32 = 5_184_000;
const TTL_EXTEND_TO: u32 = 10_368_000;

// ── Keys ─────────────────────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    /// Address of the staked asset's token contract.
    Token,
    RewardRate,
    MinStakePeriod,
    TotalStaked,
    /// Set only while a guarded call is executing.
    Locked,
    Stake(Address),
}

// ── Records ──────────────────────────────────────────────────────────────────

/// Per-account staking position.
///
/// A zero `principal` means the account has no active stake and the
/// timestamps carry no meaning.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StakeRecord {
    pub principal: i128,
    /// Start of the lock window. Preserved across restakes.
    pub stake_timestamp: u64,
    /// Reward checkpointed at the last restake.
    pub accrued_unclaimed: i128,
    /// `principal` accrues from here on top of `accrued_unclaimed`.
    pub last_accrual: u64,
}

impl StakeRecord {
    pub fn is_active(&self) -> bool {
        self.principal > 0
    }
}

// ── Instance config ──────────────────────────────────────────────────────────

pub fn extend_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub fn write_config(env: &Env, token: &Address, reward_rate: i128, min_stake_period: u64) {
    let instance = env.storage().instance();
    instance.set(&DataKey::Token, token);
    instance.set(&DataKey::RewardRate, &reward_rate);
    instance.set(&DataKey::MinStakePeriod, &min_stake_period);
    instance.set(&DataKey::TotalStaked, &0i128);
    extend_instance(env);
}

pub fn token(env: &Env) -> Result<Address, ContractError> {
    env.storage()
        .instance()
        .get(&DataKey::Token)
        .ok_or(ContractError::NotInitialized)
}

pub fn reward_rate(env: &Env) -> i128 {
    env.storage()
        .instance()
        .get(&DataKey::RewardRate)
        .unwrap_or(0)
}

pub fn min_stake_period(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get(&DataKey::MinStakePeriod)
        .unwrap_or(0)
}

pub fn total_staked(env: &Env) -> i128 {
    env.storage()
        .instance()
        .get(&DataKey::TotalStaked)
        .unwrap_or(0)
}

pub fn set_total_staked(env: &Env, total: i128) {
    env.storage().instance().set(&DataKey::TotalStaked, &total);
}

// ── Per-account records ──────────────────────────────────────────────────────

pub fn load_stake(env: &Env, account: &Address) -> StakeRecord {
    env.storage()
        .persistent()
        .get(&DataKey::Stake(account.clone()))
        .unwrap_or_default()
}

pub fn store_stake(env: &Env, account: &Address, record: &StakeRecord) {
    let key = DataKey::Stake(account.clone());
    env.storage().persistent().set(&key, record);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub fn remove_stake(env: &Env, account: &Address) {
    env.storage()
        .persistent()
        .remove(&DataKey::Stake(account.clone()));
}
