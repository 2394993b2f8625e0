//! Scoped reentrancy guard.
//!
//! Any ledger call that reaches out to the asset contract holds a
//! [`ReentrancyGuard`] for its whole duration. The flag lives in instance
//! storage, so a callback that re-enters the ledger from inside the asset
//! transfer observes it and is turned away with
//! [`ContractError::ReentrancyDetected`]. Dropping the guard clears the flag
//! on every exit path, including early `?` returns.

use soroban_sdk::{log, Env};

use crate::errors::ContractError;
use crate::storage::DataKey;

#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct ReentrancyGuard {
    env: Env,
}

impl ReentrancyGuard {
    pub fn acquire(env: &Env) -> Result<Self, ContractError> {
        if is_locked(env) {
            log!(env, "reentrant call rejected");
            return Err(ContractError::ReentrancyDetected);
        }
        env.storage().instance().set(&DataKey::Locked, &true);
        Ok(Self { env: env.clone() })
    }
}

impl Drop for ReentrancyGuard {
    fn drop(&mut self) {
        self.env.storage().instance().remove(&DataKey::Locked);
    }
}

pub fn is_locked(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Locked)
}
