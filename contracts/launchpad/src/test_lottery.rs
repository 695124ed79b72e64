#![cfg(test)]
extern crate alloc;

use crate::events::LotteryDrawnEvent;
use crate::lottery::{self, RevealedSeed, StakerLotteryInfo, TicketDraw};
use crate::{ContractError, LaunchpadContract, LaunchpadContractClient, PoolKind, Tier};
use soroban_sdk::testutils::{Address as _, Events};
use soroban_sdk::{token, vec, Address, Bytes, BytesN, Env, TryIntoVal, Vec};

const UNIT: i128 = 10_000_000;
const DAY: u64 = 86_400;

/// Replays fixed draws and fails the test if asked for more.
struct ScriptedDraw {
    values: alloc::vec::Vec<u64>,
    next: usize,
}

impl ScriptedDraw {
    fn new(values: &[u64]) -> Self {
        ScriptedDraw {
            values: values.to_vec(),
            next: 0,
        }
    }
}

impl TicketDraw for ScriptedDraw {
    fn draw(&mut self, upper: u64) -> u64 {
        let value = self.values[self.next];
        self.next += 1;
        assert!(value < upper, "scripted draw {} out of range {}", value, upper);
        value
    }
}

/// SplitMix64, seeded, for repeatable statistics.
struct SplitMix(u64);

impl TicketDraw for SplitMix {
    fn draw(&mut self, upper: u64) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        z % upper
    }
}

fn unlimited_env() -> Env {
    let env = Env::default();
    #[allow(deprecated)]
    env.budget().reset_unlimited();
    env
}

fn candidate(env: &Env, tickets: u64, tier: Tier, bonus: u32) -> StakerLotteryInfo {
    StakerLotteryInfo {
        user: Address::generate(env),
        tickets,
        tier,
        staked_at: 0,
        allocation_bonus_bps: bonus,
    }
}

fn pool_of(env: &Env, tickets: &[u64], tier: Tier) -> Vec<StakerLotteryInfo> {
    let mut candidates = Vec::new(env);
    for (i, t) in tickets.iter().enumerate() {
        candidates.push_back(candidate(env, *t, tier, i as u32 * 100));
    }
    candidates
}

fn distance(a: f64, b: f64) -> f64 {
    if a > b {
        a - b
    } else {
        b - a
    }
}

fn index_of(candidates: &Vec<StakerLotteryInfo>, user: &Address) -> usize {
    candidates
        .iter()
        .position(|c| c.user == *user)
        .unwrap()
}

// ========== Selection rules ==========

#[test]
fn test_first_candidate_covering_draw_wins() {
    let env = Env::default();
    let candidates = pool_of(&env, &[3, 5, 2], Tier::Merchant);

    for (value, expected) in [(0_u64, 0_usize), (2, 0), (3, 1), (7, 1), (8, 2), (9, 2)] {
        let mut draw = ScriptedDraw::new(&[value]);
        let result = lottery::select(&env, Tier::Merchant, 1, &candidates, &mut draw);
        assert_eq!(result.whitelist.len(), 1);
        assert_eq!(
            result.whitelist.get(0).unwrap(),
            candidates.get(expected as u32).unwrap().user
        );
    }
}

#[test]
fn test_winner_removed_before_next_draw() {
    let env = Env::default();
    let candidates = pool_of(&env, &[3, 5, 2], Tier::Dealer);

    // Second draw sees [3, 2] with 5 tickets in play.
    let mut draw = ScriptedDraw::new(&[4, 4]);
    let result = lottery::select(&env, Tier::Dealer, 2, &candidates, &mut draw);
    assert_eq!(result.whitelist.len(), 2);
    assert_eq!(result.whitelist.get(0).unwrap(), candidates.get(1).unwrap().user);
    assert_eq!(result.whitelist.get(1).unwrap(), candidates.get(2).unwrap().user);
    assert_eq!(result.allocation_bonuses, vec![&env, 100_u32, 200]);
}

#[test]
fn test_zero_ticket_candidates_never_win() {
    let env = Env::default();
    let candidates = pool_of(&env, &[0, 5, 0], Tier::Fan);

    let mut draw = ScriptedDraw::new(&[0]);
    let result = lottery::select(&env, Tier::Fan, 3, &candidates, &mut draw);
    assert_eq!(result.whitelist.len(), 1);
    assert_eq!(result.whitelist.get(0).unwrap(), candidates.get(1).unwrap().user);
}

#[test]
fn test_mismatched_and_duplicate_candidates_dropped() {
    let env = Env::default();
    let merchant = candidate(&env, 10, Tier::Merchant, 0);
    let dealer = candidate(&env, 1_000, Tier::Dealer, 0);
    let candidates = vec![&env, dealer, merchant.clone(), merchant.clone()];

    let mut draw = ScriptedDraw::new(&[0]);
    let result = lottery::select(&env, Tier::Merchant, 5, &candidates, &mut draw);
    assert_eq!(result.whitelist, vec![&env, merchant.user]);
}

#[test]
fn test_whitelist_tiers_admit_everyone() {
    let env = Env::default();
    let candidates = pool_of(&env, &[0, 0, 0, 0], Tier::Tycoon);

    let mut draw = ScriptedDraw::new(&[]);
    let result = lottery::select(&env, Tier::Tycoon, 1, &candidates, &mut draw);
    assert_eq!(result.whitelist.len(), 4);
    assert_eq!(result.allocation_bonuses, vec![&env, 0_u32, 100, 200, 300]);
}

#[test]
fn test_no_tier_selects_nobody() {
    let env = Env::default();
    let candidates = pool_of(&env, &[10, 20], Tier::None);

    let mut draw = ScriptedDraw::new(&[]);
    let result = lottery::select(&env, Tier::None, 2, &candidates, &mut draw);
    assert!(result.whitelist.is_empty());
    assert!(result.allocation_bonuses.is_empty());
}

#[test]
fn test_single_candidate_always_selected() {
    let env = unlimited_env();
    let candidates = pool_of(&env, &[7], Tier::Fan);
    let mut draw = SplitMix(42);

    for n in 0..1_000_u32 {
        let result = lottery::select(&env, Tier::Fan, 1 + n % 5, &candidates, &mut draw);
        assert_eq!(result.whitelist, vec![&env, candidates.get(0).unwrap().user]);
    }
}

#[test]
fn test_exhaustive_selection() {
    let env = unlimited_env();
    let candidates = pool_of(&env, &[1, 9, 4, 4, 30, 2], Tier::Merchant);
    let mut draw = SplitMix(7);

    for _ in 0..50 {
        let result = lottery::select(&env, Tier::Merchant, 6, &candidates, &mut draw);
        assert_eq!(result.whitelist.len(), 6);
        for c in candidates.iter() {
            assert_eq!(result.whitelist.iter().filter(|u| *u == c.user).count(), 1);
        }
    }
}

#[test]
fn test_output_bounded_and_unique() {
    let env = unlimited_env();
    let mut draw = SplitMix(99);

    for size in 1..=12_u64 {
        let tickets: alloc::vec::Vec<u64> = (0..size).map(|i| (i * 37 + 5) % 23).collect();
        let candidates = pool_of(&env, &tickets, Tier::Dealer);
        for target in 0..=14_u32 {
            let result = lottery::select(&env, Tier::Dealer, target, &candidates, &mut draw);
            let len = result.whitelist.len();
            assert!(len <= target.min(size as u32));
            assert_eq!(len, result.allocation_bonuses.len());
            for i in 0..len {
                let user = result.whitelist.get(i).unwrap();
                assert_eq!(result.whitelist.iter().filter(|u| *u == user).count(), 1);
            }
        }
    }
}

// ========== Fairness ==========

const FAIRNESS_TICKETS: [u64; 15] = [
    10, 20, 30, 40, 50, 60, 70, 80, 90, 100, 110, 120, 130, 140, 150,
];

#[test]
fn test_single_draw_matches_ticket_share() {
    let env = unlimited_env();
    let candidates = pool_of(&env, &FAIRNESS_TICKETS, Tier::Merchant);
    let total: u64 = FAIRNESS_TICKETS.iter().sum();
    let rounds = 10_000;
    let mut wins = [0_u32; 15];
    let mut draw = SplitMix(2024);

    for _ in 0..rounds {
        let result = lottery::select(&env, Tier::Merchant, 1, &candidates, &mut draw);
        wins[index_of(&candidates, &result.whitelist.get(0).unwrap())] += 1;
    }

    for (i, tickets) in FAIRNESS_TICKETS.iter().enumerate() {
        let expected = *tickets as f64 / total as f64;
        let observed = wins[i] as f64 / rounds as f64;
        assert!(
            distance(observed, expected) < 0.015,
            "candidate {} observed {} expected {}",
            i,
            observed,
            expected
        );
    }
}

#[test]
fn test_five_of_fifteen_tracks_ticket_share() {
    let env = unlimited_env();
    let candidates = pool_of(&env, &FAIRNESS_TICKETS, Tier::Dealer);
    let total: u64 = FAIRNESS_TICKETS.iter().sum();
    let rounds = 1_000;
    let picks_per_round = 5;
    let mut wins = [0_u32; 15];
    let mut draw = SplitMix(31337);

    for _ in 0..rounds {
        let result = lottery::select(&env, Tier::Dealer, picks_per_round, &candidates, &mut draw);
        assert_eq!(result.whitelist.len(), picks_per_round);
        for user in result.whitelist.iter() {
            wins[index_of(&candidates, &user)] += 1;
        }
    }

    // Removal flattens later draws, so allow more slack than a single draw.
    let picks = (rounds * picks_per_round) as f64;
    for (i, tickets) in FAIRNESS_TICKETS.iter().enumerate() {
        let expected = *tickets as f64 / total as f64;
        let observed = wins[i] as f64 / picks;
        assert!(
            distance(observed, expected) < 0.02,
            "candidate {} observed {} expected {}",
            i,
            observed,
            expected
        );
    }
    // Heavier tickets still win more often.
    assert!(wins[14] > wins[0] * 4);
}

// ========== Randomness sources ==========

#[test]
fn test_revealed_seed_is_deterministic() {
    let env = Env::default();
    let seed = BytesN::from_array(&env, &[7u8; 32]);
    let mut a = RevealedSeed::new(&env, seed.clone());
    let mut b = RevealedSeed::new(&env, seed);

    let mut distinct = 0;
    let mut previous = u64::MAX;
    for _ in 0..20 {
        let x = a.draw(1_000);
        assert_eq!(x, b.draw(1_000));
        assert!(x < 1_000);
        if x != previous {
            distinct += 1;
        }
        previous = x;
    }
    assert!(distinct > 1);
}

#[test]
fn test_commitment_is_sha256() {
    let env = Env::default();
    let secret = Bytes::from_array(&env, b"round-7");
    let expected: BytesN<32> = env.crypto().sha256(&secret).into();
    assert_eq!(lottery::commitment(&env, &secret), expected);
}

// ========== Contract ==========

struct LotteryEnv {
    env: Env,
    admin: Address,
    contract_id: Address,
    users: alloc::vec::Vec<Address>,
}

/// Three Merchant stakers with 500, 1000 and 2000 tokens locked for 30 days.
fn setup_lottery() -> LotteryEnv {
    let env = Env::default();
    env.mock_all_auths();

    let admin = Address::generate(&env);
    let gov_token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let contract_id = env.register(LaunchpadContract, ());
    let client = LaunchpadContractClient::new(&env, &contract_id);
    client.initialize(&admin, &gov_token, &UNIT, &0, &3_000, &(10 * UNIT));
    client.add_pool(&admin, &gov_token, &100, &PoolKind::TierEligible(30 * DAY));

    let sac = token::StellarAssetClient::new(&env, &gov_token);
    let mut users = alloc::vec::Vec::new();
    for amount in [500_i128, 1_000, 2_000] {
        let user = Address::generate(&env);
        sac.mint(&user, &(amount * UNIT));
        client.deposit(&user, &0, &(amount * UNIT));
        users.push(user);
    }

    LotteryEnv {
        env,
        admin,
        contract_id,
        users,
    }
}

fn user_vec(t: &LotteryEnv) -> Vec<Address> {
    let mut users = Vec::new(&t.env);
    for user in t.users.iter() {
        users.push_back(user.clone());
    }
    users
}

#[test]
fn test_staker_lottery_infos() {
    let t = setup_lottery();
    let client = LaunchpadContractClient::new(&t.env, &t.contract_id);

    let infos = client.staker_lottery_infos(&user_vec(&t));
    assert_eq!(infos.len(), 3);
    let tickets: alloc::vec::Vec<u64> = infos.iter().map(|i| i.tickets).collect();
    assert_eq!(tickets, [50, 100, 200]);
    for info in infos.iter() {
        assert_eq!(info.tier, Tier::Merchant);
        assert_eq!(info.allocation_bonus_bps, 0);
    }
}

#[test]
fn test_play_lottery() {
    let t = setup_lottery();
    let client = LaunchpadContractClient::new(&t.env, &t.contract_id);

    let infos = client.staker_lottery_infos(&user_vec(&t));
    let result = client.play_lottery(&t.admin, &1, &Tier::Merchant, &2, &infos);
    assert_eq!(result.whitelist.len(), 2);
    assert_ne!(result.whitelist.get(0), result.whitelist.get(1));

    let events = t.env.events().all();
    let last = events.last().unwrap();
    let payload: LotteryDrawnEvent = last.2.try_into_val(&t.env).unwrap();
    assert_eq!(payload.round, 1);
    assert_eq!(payload.whitelist, result.whitelist);
}

#[test]
fn test_play_lottery_uses_ledger_view() {
    let t = setup_lottery();
    let client = LaunchpadContractClient::new(&t.env, &t.contract_id);

    // The caller claims a huge ticket count and the wrong tier for the first user.
    let mut forged = client.staker_lottery_infos(&user_vec(&t));
    let mut first = forged.get(0).unwrap();
    first.tickets = 1_000_000;
    first.tier = Tier::Dealer;
    forged.set(0, first);

    let result = client.play_lottery(&t.admin, &1, &Tier::Merchant, &3, &forged);
    assert_eq!(result.whitelist.len(), 3);
}

#[test]
fn test_play_lottery_requires_admin() {
    let t = setup_lottery();
    let client = LaunchpadContractClient::new(&t.env, &t.contract_id);
    let infos = client.staker_lottery_infos(&user_vec(&t));

    let result = client.try_play_lottery(&t.users[0], &1, &Tier::Merchant, &1, &infos);
    assert_eq!(result, Err(Ok(ContractError::Unauthorized)));
}

#[test]
fn test_committed_lottery() {
    let t = setup_lottery();
    let client = LaunchpadContractClient::new(&t.env, &t.contract_id);
    let infos = client.staker_lottery_infos(&user_vec(&t));
    let secret = Bytes::from_array(&t.env, b"launch-round-3-secret");

    let result = client.try_play_committed_lottery(&t.admin, &3, &Tier::Merchant, &1, &infos, &secret);
    assert_eq!(result, Err(Ok(ContractError::SeedNotCommitted)));

    client.commit_lottery_seed(&t.admin, &3, &lottery::commitment(&t.env, &secret));

    let wrong = Bytes::from_array(&t.env, b"guess");
    let result = client.try_play_committed_lottery(&t.admin, &3, &Tier::Merchant, &1, &infos, &wrong);
    assert_eq!(result, Err(Ok(ContractError::SeedMismatch)));

    let result = client.play_committed_lottery(&t.admin, &3, &Tier::Merchant, &2, &infos, &secret);
    assert_eq!(result.whitelist.len(), 2);

    // The commitment is spent.
    let result = client.try_play_committed_lottery(&t.admin, &3, &Tier::Merchant, &1, &infos, &secret);
    assert_eq!(result, Err(Ok(ContractError::SeedNotCommitted)));
}

#[test]
fn test_seed_commitment_cannot_be_replaced() {
    let t = setup_lottery();
    let client = LaunchpadContractClient::new(&t.env, &t.contract_id);
    let infos = client.staker_lottery_infos(&user_vec(&t));
    let secret = Bytes::from_array(&t.env, b"round-7-secret");
    let replacement = Bytes::from_array(&t.env, b"round-7-picked-later");

    client.commit_lottery_seed(&t.admin, &7, &lottery::commitment(&t.env, &secret));
    let result =
        client.try_commit_lottery_seed(&t.admin, &7, &lottery::commitment(&t.env, &replacement));
    assert_eq!(result, Err(Ok(ContractError::SeedAlreadyCommitted)));

    let result =
        client.try_play_committed_lottery(&t.admin, &7, &Tier::Merchant, &1, &infos, &replacement);
    assert_eq!(result, Err(Ok(ContractError::SeedMismatch)));

    let result = client.play_committed_lottery(&t.admin, &7, &Tier::Merchant, &1, &infos, &secret);
    assert_eq!(result.whitelist.len(), 1);

    // Once spent, the round may be committed again.
    client.commit_lottery_seed(&t.admin, &7, &lottery::commitment(&t.env, &replacement));
}

#[test]
fn test_committed_round_rejects_plain_draw() {
    let t = setup_lottery();
    let client = LaunchpadContractClient::new(&t.env, &t.contract_id);
    let infos = client.staker_lottery_infos(&user_vec(&t));
    let secret = Bytes::from_array(&t.env, b"round-8-secret");

    client.commit_lottery_seed(&t.admin, &8, &lottery::commitment(&t.env, &secret));
    let result = client.try_play_lottery(&t.admin, &8, &Tier::Merchant, &1, &infos);
    assert_eq!(result, Err(Ok(ContractError::SeedAlreadyCommitted)));

    // Other rounds still draw from the host PRNG.
    let result = client.play_lottery(&t.admin, &9, &Tier::Merchant, &1, &infos);
    assert_eq!(result.whitelist.len(), 1);
}
