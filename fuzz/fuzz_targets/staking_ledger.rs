#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    token::{Client as TokenClient, StellarAssetClient},
    Address, Env,
};
use staking_ledger::{StakingLedger, StakingLedgerClient};

#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    Stake { who: u8, amount: u64 },
    Withdraw { who: u8 },
    FundRewards { amount: u32 },
    Advance { seconds: u32 },
}

const STAKERS: usize = 4;

fuzz_target!(|actions: Vec<FuzzAction>| {
    let env = Env::default();
    env.mock_all_auths();

    let token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let contract_id = env.register(StakingLedger, (token.clone(),));
    let client = StakingLedgerClient::new(&env, &contract_id);
    let sac = StellarAssetClient::new(&env, &token);
    let balances = TokenClient::new(&env, &token);

    let sponsor = Address::generate(&env);
    sac.mint(&sponsor, &i128::from(u64::MAX));

    let users: Vec<Address> = (0..STAKERS).map(|_| Address::generate(&env)).collect();
    for user in &users {
        sac.mint(user, &i128::from(u64::MAX));
    }

    let mut now: u64 = 0;
    let mut deposited: i128 = 0;
    let mut paid_out: i128 = 0;

    // Arbitrary call sequences must never panic the ledger and must never
    // release more than was deposited.
    for action in actions {
        match action {
            FuzzAction::Stake { who, amount } => {
                let amount = i128::from(amount);
                if let Ok(Ok(())) = client.try_stake(&users[who as usize % STAKERS], &amount) {
                    deposited += amount;
                }
            }
            FuzzAction::Withdraw { who } => {
                if let Ok(Ok(paid)) = client.try_withdraw(&users[who as usize % STAKERS]) {
                    paid_out += paid.principal + paid.reward;
                }
            }
            FuzzAction::FundRewards { amount } => {
                let amount = i128::from(amount);
                if let Ok(Ok(_)) = client.try_fund_rewards(&sponsor, &amount) {
                    deposited += amount;
                }
            }
            FuzzAction::Advance { seconds } => {
                now = now.saturating_add(u64::from(seconds));
                env.ledger().set_timestamp(now);
            }
        }

        assert!(paid_out <= deposited);
        assert_eq!(balances.balance(&contract_id), deposited - paid_out);
        assert!(client.get_total_staked() <= balances.balance(&contract_id));
    }
});
