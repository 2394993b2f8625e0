use soroban_sdk::{log, token, Address, Env};

use crate::errors::ContractError;
use crate::storage;

/// Moves the staked asset in and out of ledger custody.
///
/// The ledger core only talks to the asset through this trait, so the
/// collaborator can be any balance-ledger token (or a test double).
pub trait AssetTransferProvider {
    /// Pull `amount` from `from` into `to`. `from` must already have
    /// authorized the enclosing invocation.
    fn transfer_from(
        &self,
        env: &Env,
        from: &Address,
        to: &Address,
        amount: i128,
    ) -> Result<(), ContractError>;

    /// Pay `amount` out of ledger custody to `to`.
    fn transfer(&self, env: &Env, to: &Address, amount: i128) -> Result<(), ContractError>;

    fn balance_of(&self, env: &Env, account: &Address) -> i128;
}

/// [`AssetTransferProvider`] backed by a deployed token contract.
#[derive(Clone, Debug)]
pub struct TokenAsset {
    address: Address,
}

impl TokenAsset {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    /// The token configured at construction.
    pub fn load(env: &Env) -> Result<Self, ContractError> {
        storage::token(env).map(Self::new)
    }
}

impl AssetTransferProvider for TokenAsset {
    fn transfer_from(
        &self,
        env: &Env,
        from: &Address,
        to: &Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        // A rejected sub-call is rolled back by the host; only the outcome
        // comes back here.
        match token::Client::new(env, &self.address).try_transfer(from, to, &amount) {
            Ok(Ok(())) => Ok(()),
            _ => {
                log!(env, "token transfer rejected", from.clone(), to.clone(), amount);
                Err(ContractError::TransferFailed)
            }
        }
    }

    fn transfer(&self, env: &Env, to: &Address, amount: i128) -> Result<(), ContractError> {
        self.transfer_from(env, &env.current_contract_address(), to, amount)
    }

    fn balance_of(&self, env: &Env, account: &Address) -> i128 {
        token::Client::new(env, &self.address).balance(account)
    }
}
