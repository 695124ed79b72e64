//! Driven through the contract client: after any mix of deposits, withdrawals
//! and claims the contract holds exactly the reserve plus every staked token.

use launchpad::{LaunchpadContract, LaunchpadContractClient, PoolKind};
use proptest::prelude::*;
use soroban_sdk::testutils::{Address as _, Ledger};
use soroban_sdk::{token, Address, Env};

const UNIT: i128 = 10_000_000;
const START: u64 = 1_000;
const DAY: u64 = 86_400;

/// One step of a staking session: which user, which pool, what action, how long after.
#[derive(Clone, Debug)]
struct Step {
    user: usize,
    pool: u32,
    action: u8,
    amount: i128,
    wait: u64,
}

fn step() -> impl Strategy<Value = Step> {
    (0usize..3, 0u32..2, 0u8..4, 1i128..5_000, 0u64..(2 * DAY)).prop_map(
        |(user, pool, action, amount, wait)| Step {
            user,
            pool,
            action,
            amount: amount * UNIT,
            wait,
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_contract_stays_solvent(
        funding in 1_000i128..200_000,
        steps in proptest::collection::vec(step(), 1..20),
    ) {
        let env = Env::default();
        env.mock_all_auths();
        #[allow(deprecated)]
        env.budget().reset_unlimited();
        env.ledger().set_timestamp(START);

        let admin = Address::generate(&env);
        let gov_token = env
            .register_stellar_asset_contract_v2(Address::generate(&env))
            .address();
        let minter = token::StellarAssetClient::new(&env, &gov_token);
        let gov = token::Client::new(&env, &gov_token);

        let contract_id = env.register(LaunchpadContract, ());
        let client = LaunchpadContractClient::new(&env, &contract_id);
        client.initialize(&admin, &gov_token, &(3 * UNIT), &START, &2_500, &(10 * UNIT));
        client.add_pool(&admin, &gov_token, &400, &PoolKind::TierEligible(DAY));
        client.add_pool(&admin, &gov_token, &600, &PoolKind::Standard);

        minter.mint(&admin, &(funding * UNIT));
        client.fund(&admin, &(funding * UNIT));

        let users: std::vec::Vec<Address> = (0..3)
            .map(|_| {
                let user = Address::generate(&env);
                minter.mint(&user, &(1_000_000 * UNIT));
                user
            })
            .collect();

        let mut now = START;
        for s in steps.iter() {
            let user = &users[s.user];
            let held = client.get_position(user, &s.pool).amount;
            match s.action {
                0 | 1 => {
                    let _ = client.try_deposit(user, &s.pool, &s.amount);
                }
                2 if held > 0 => {
                    let _ = client.try_withdraw(user, &s.pool, &s.amount.min(held));
                }
                _ => {
                    let _ = client.try_claim(user, &s.pool);
                }
            }

            now += s.wait;
            env.ledger().set_timestamp(now);

            let state = client.get_ledger_state();
            let staked = client.get_pool(&0).total_staked + client.get_pool(&1).total_staked;
            prop_assert_eq!(gov.balance(&contract_id), state.unallocated_reward + staked);
        }
    }
}
