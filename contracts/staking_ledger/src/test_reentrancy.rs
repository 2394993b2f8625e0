//! Ledger core driven through hostile and failing asset contracts.

extern crate std;

use core::cell::{Cell, RefCell};

use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    token::{Client as TokenClient, StellarAssetClient},
    Address, Env,
};

use crate::{
    guard, ledger, rewards::SCALE, storage, AssetTransferProvider, ContractError, StakeRecord,
    StakingLedger, StakingLedgerClient, TokenAsset, Withdrawal, MIN_STAKE_PERIOD,
};

const STAKE_AMOUNT: i128 = 100 * SCALE;
const REWARD_POOL: i128 = 1_000 * SCALE;

// ── Asset doubles ────────────────────────────────────────────────────────────

/// Calls back into `withdraw` for `victim` from inside every payout before
/// letting the real transfer through.
struct ReentrantAsset {
    inner: TokenAsset,
    victim: Address,
    reentry: RefCell<Option<Result<Withdrawal, ContractError>>>,
}

impl AssetTransferProvider for ReentrantAsset {
    fn transfer_from(
        &self,
        env: &Env,
        from: &Address,
        to: &Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        self.inner.transfer_from(env, from, to, amount)
    }

    fn transfer(&self, env: &Env, to: &Address, amount: i128) -> Result<(), ContractError> {
        let attempt = ledger::withdraw(env, &self.inner, &self.victim);
        self.reentry.replace(Some(attempt));
        self.inner.transfer(env, to, amount)
    }

    fn balance_of(&self, env: &Env, account: &Address) -> i128 {
        self.inner.balance_of(env, account)
    }
}

/// Calls back into `stake` from inside the deposit pull.
struct ReentrantDepositAsset {
    inner: TokenAsset,
    reentry: RefCell<Option<Result<StakeRecord, ContractError>>>,
}

impl AssetTransferProvider for ReentrantDepositAsset {
    fn transfer_from(
        &self,
        env: &Env,
        from: &Address,
        to: &Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        let attempt = ledger::stake(env, &self.inner, from, amount);
        self.reentry.replace(Some(attempt));
        self.inner.transfer_from(env, from, to, amount)
    }

    fn transfer(&self, env: &Env, to: &Address, amount: i128) -> Result<(), ContractError> {
        self.inner.transfer(env, to, amount)
    }

    fn balance_of(&self, env: &Env, account: &Address) -> i128 {
        self.inner.balance_of(env, account)
    }
}

/// Reports real balances but refuses to move anything.
struct FrozenAsset {
    inner: TokenAsset,
    attempts: Cell<u32>,
}

impl AssetTransferProvider for FrozenAsset {
    fn transfer_from(
        &self,
        _env: &Env,
        _from: &Address,
        _to: &Address,
        _amount: i128,
    ) -> Result<(), ContractError> {
        self.attempts.set(self.attempts.get() + 1);
        Err(ContractError::TransferFailed)
    }

    fn transfer(&self, _env: &Env, _to: &Address, _amount: i128) -> Result<(), ContractError> {
        self.attempts.set(self.attempts.get() + 1);
        Err(ContractError::TransferFailed)
    }

    fn balance_of(&self, env: &Env, account: &Address) -> i128 {
        self.inner.balance_of(env, account)
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

struct Fixture {
    env: Env,
    ledger_id: Address,
    token: Address,
    staker: Address,
}

/// Deployed ledger with a funded pool and one staker whose position has
/// just passed the lock window.
fn unlocked_position() -> Fixture {
    let env = Env::default();
    // Core calls below run under `as_contract`, so the staker's auth is not
    // rooted at a top-level invocation.
    env.mock_all_auths_allowing_non_root_auth();

    let token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let ledger_id = env.register(StakingLedger, (token.clone(),));
    let client = StakingLedgerClient::new(&env, &ledger_id);

    let sac = StellarAssetClient::new(&env, &token);
    let sponsor = Address::generate(&env);
    let staker = Address::generate(&env);
    sac.mint(&sponsor, &REWARD_POOL);
    sac.mint(&staker, &STAKE_AMOUNT);

    env.ledger().set_timestamp(0);
    client.fund_rewards(&sponsor, &REWARD_POOL);
    client.stake(&staker, &STAKE_AMOUNT);
    env.ledger().set_timestamp(MIN_STAKE_PERIOD);

    Fixture {
        env,
        ledger_id,
        token,
        staker,
    }
}

/// Observable outcome of a withdrawal: staker balance, custody, record, total.
fn snapshot(f: &Fixture) -> (i128, i128, StakeRecord, i128) {
    let token = TokenClient::new(&f.env, &f.token);
    let (record, total) = f.env.as_contract(&f.ledger_id, || {
        (
            storage::load_stake(&f.env, &f.staker),
            storage::total_staked(&f.env),
        )
    });
    (
        token.balance(&f.staker),
        token.balance(&f.ledger_id),
        record,
        total,
    )
}

// ── Reentrancy ───────────────────────────────────────────────────────────────

#[test]
fn test_reentrant_withdraw_is_rejected() {
    let f = unlocked_position();
    let hostile = ReentrantAsset {
        inner: TokenAsset::new(f.token.clone()),
        victim: f.staker.clone(),
        reentry: RefCell::new(None),
    };

    let outer = f
        .env
        .as_contract(&f.ledger_id, || ledger::withdraw(&f.env, &hostile, &f.staker));

    assert!(outer.is_ok());
    assert_eq!(
        hostile.reentry.borrow().clone(),
        Some(Err(ContractError::ReentrancyDetected))
    );
    f.env
        .as_contract(&f.ledger_id, || assert!(!guard::is_locked(&f.env)));
}

#[test]
fn test_reentrant_run_matches_plain_run() {
    let plain = unlocked_position();
    let plain_paid = plain.env.as_contract(&plain.ledger_id, || {
        ledger::withdraw(&plain.env, &TokenAsset::new(plain.token.clone()), &plain.staker)
    });

    let hostile_fixture = unlocked_position();
    let hostile = ReentrantAsset {
        inner: TokenAsset::new(hostile_fixture.token.clone()),
        victim: hostile_fixture.staker.clone(),
        reentry: RefCell::new(None),
    };
    let hostile_paid = hostile_fixture
        .env
        .as_contract(&hostile_fixture.ledger_id, || {
            ledger::withdraw(&hostile_fixture.env, &hostile, &hostile_fixture.staker)
        });

    assert_eq!(plain_paid, hostile_paid);
    assert_eq!(snapshot(&plain), snapshot(&hostile_fixture));

    let (staker_balance, _, record, total) = snapshot(&hostile_fixture);
    let paid = hostile_paid.unwrap();
    assert_eq!(staker_balance, paid.principal + paid.reward);
    assert_eq!(record, StakeRecord::default());
    assert_eq!(total, 0);
}

#[test]
fn test_reentrant_stake_is_rejected() {
    let env = Env::default();
    env.mock_all_auths_allowing_non_root_auth();

    let token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let ledger_id = env.register(StakingLedger, (token.clone(),));
    let staker = Address::generate(&env);
    StellarAssetClient::new(&env, &token).mint(&staker, &(2 * STAKE_AMOUNT));

    let hostile = ReentrantDepositAsset {
        inner: TokenAsset::new(token.clone()),
        reentry: RefCell::new(None),
    };

    let record = env
        .as_contract(&ledger_id, || {
            ledger::stake(&env, &hostile, &staker, STAKE_AMOUNT)
        })
        .unwrap();

    assert_eq!(
        hostile.reentry.borrow().clone(),
        Some(Err(ContractError::ReentrancyDetected))
    );
    // Only the outer deposit landed.
    assert_eq!(record.principal, STAKE_AMOUNT);
    assert_eq!(TokenClient::new(&env, &token).balance(&ledger_id), STAKE_AMOUNT);
    env.as_contract(&ledger_id, || {
        assert_eq!(storage::total_staked(&env), STAKE_AMOUNT);
    });
}

// ── Failed transfers roll back ───────────────────────────────────────────────

#[test]
fn test_failed_payout_restores_position() {
    let f = unlocked_position();
    let before = snapshot(&f);
    let frozen = FrozenAsset {
        inner: TokenAsset::new(f.token.clone()),
        attempts: Cell::new(0),
    };

    let result = f
        .env
        .as_contract(&f.ledger_id, || ledger::withdraw(&f.env, &frozen, &f.staker));

    assert_eq!(result, Err(ContractError::TransferFailed));
    assert_eq!(frozen.attempts.get(), 1);
    assert_eq!(snapshot(&f), before);
    f.env
        .as_contract(&f.ledger_id, || assert!(!guard::is_locked(&f.env)));

    // The position is still withdrawable through a working asset.
    let paid = f.env.as_contract(&f.ledger_id, || {
        ledger::withdraw(&f.env, &TokenAsset::new(f.token.clone()), &f.staker)
    });
    assert_eq!(paid.map(|w| w.principal), Ok(STAKE_AMOUNT));
}

#[test]
fn test_failed_deposit_leaves_no_trace() {
    let f = unlocked_position();
    let newcomer = Address::generate(&f.env);
    let frozen = FrozenAsset {
        inner: TokenAsset::new(f.token.clone()),
        attempts: Cell::new(0),
    };

    let result = f.env.as_contract(&f.ledger_id, || {
        ledger::stake(&f.env, &frozen, &newcomer, STAKE_AMOUNT)
    });

    assert_eq!(result, Err(ContractError::TransferFailed));
    f.env.as_contract(&f.ledger_id, || {
        assert_eq!(storage::load_stake(&f.env, &newcomer), StakeRecord::default());
        assert_eq!(storage::total_staked(&f.env), STAKE_AMOUNT);
        assert!(!guard::is_locked(&f.env));
    });
}

#[test]
fn test_rejected_precondition_skips_transfer() {
    let f = unlocked_position();
    let frozen = FrozenAsset {
        inner: TokenAsset::new(f.token.clone()),
        attempts: Cell::new(0),
    };

    let result = f
        .env
        .as_contract(&f.ledger_id, || ledger::stake(&f.env, &frozen, &f.staker, 0));

    assert_eq!(result, Err(ContractError::ZeroStakeAmount));
    assert_eq!(frozen.attempts.get(), 0);
}
