use soroban_sdk::{symbol_short, Address, Env, Vec};

use crate::storage::PoolKind;
use crate::tiers::Tier;

// ── Event payloads ──────────────────────────────────────────────────────────

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub admin: Address,
    pub governance_token: Address,
    pub reward_per_second: i128,
    pub start_time: u64,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolAddedEvent {
    pub pool_id: u32,
    pub stake_asset: Address,
    pub alloc_points: u32,
    pub kind: PoolKind,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AllocPointsSetEvent {
    pub pool_id: u32,
    pub alloc_points: u32,
    pub total_alloc_points: u64,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardRateSetEvent {
    pub new_rate: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PenaltySetEvent {
    pub penalty_bps: u32,
    pub timestamp: u64,
}

/// Fired when the reward reserve grows through funding.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FundedEvent {
    pub funder: Address,
    pub amount: i128,
    pub unallocated_reward: i128,
    pub end_time: u64,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReserveWithdrawnEvent {
    pub recipient: Address,
    pub amount: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PausedEvent {
    pub paused: bool,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakedEvent {
    pub staker: Address,
    pub pool_id: u32,
    pub amount: i128,
    pub reward: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnstakedEvent {
    pub staker: Address,
    pub pool_id: u32,
    pub amount: i128,
    pub reward: i128,
    pub penalty: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EmergencyUnstakedEvent {
    pub staker: Address,
    pub pool_id: u32,
    pub amount: i128,
    pub penalty: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardClaimedEvent {
    pub staker: Address,
    pub pool_id: u32,
    pub amount: i128,
    pub timestamp: u64,
}

/// Fired when a staker's tier moves; sale rounds gate participation on it.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TierChangedEvent {
    pub staker: Address,
    pub old_tier: Tier,
    pub new_tier: Tier,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LotteryDrawnEvent {
    pub round: u32,
    pub tier: Tier,
    pub whitelist: Vec<Address>,
    pub allocation_bonuses: Vec<u32>,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SeedCommittedEvent {
    pub round: u32,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VestingScheduleSetEvent {
    pub schedule_id: u32,
    pub asset: Address,
    pub points: u32,
    pub fee_bps: u32,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VestingShiftedEvent {
    pub schedule_id: u32,
    pub delta: i64,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VestingAllocatedEvent {
    pub schedule_id: u32,
    pub beneficiary: Address,
    pub amount: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VestedClaimedEvent {
    pub schedule_id: u32,
    pub beneficiary: Address,
    pub amount: i128,
    pub fee: i128,
    pub timestamp: u64,
}

// ── Publishers ──────────────────────────────────────────────────────────────

pub fn publish_initialized(
    env: &Env,
    admin: Address,
    governance_token: Address,
    reward_per_second: i128,
    start_time: u64,
) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            admin,
            governance_token,
            reward_per_second,
            start_time,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_pool_added(
    env: &Env,
    pool_id: u32,
    stake_asset: Address,
    alloc_points: u32,
    kind: PoolKind,
) {
    env.events().publish(
        (symbol_short!("POOL_ADD"), pool_id),
        PoolAddedEvent {
            pool_id,
            stake_asset,
            alloc_points,
            kind,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_alloc_points_set(
    env: &Env,
    pool_id: u32,
    alloc_points: u32,
    total_alloc_points: u64,
) {
    env.events().publish(
        (symbol_short!("ALLOC_SET"), pool_id),
        AllocPointsSetEvent {
            pool_id,
            alloc_points,
            total_alloc_points,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_reward_rate_set(env: &Env, new_rate: i128) {
    env.events().publish(
        (symbol_short!("RATE_SET"),),
        RewardRateSetEvent {
            new_rate,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_penalty_set(env: &Env, penalty_bps: u32) {
    env.events().publish(
        (symbol_short!("PENALTY"),),
        PenaltySetEvent {
            penalty_bps,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_funded(
    env: &Env,
    funder: Address,
    amount: i128,
    unallocated_reward: i128,
    end_time: u64,
) {
    env.events().publish(
        (symbol_short!("FUNDED"), funder.clone()),
        FundedEvent {
            funder,
            amount,
            unallocated_reward,
            end_time,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_reserve_withdrawn(env: &Env, recipient: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("RSV_OUT"), recipient.clone()),
        ReserveWithdrawnEvent {
            recipient,
            amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_paused(env: &Env, paused: bool) {
    env.events().publish(
        (symbol_short!("PAUSED"),),
        PausedEvent {
            paused,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_staked(env: &Env, staker: Address, pool_id: u32, amount: i128, reward: i128) {
    env.events().publish(
        (symbol_short!("STAKED"), staker.clone()),
        StakedEvent {
            staker,
            pool_id,
            amount,
            reward,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_unstaked(
    env: &Env,
    staker: Address,
    pool_id: u32,
    amount: i128,
    reward: i128,
    penalty: i128,
) {
    env.events().publish(
        (symbol_short!("UNSTAKED"), staker.clone()),
        UnstakedEvent {
            staker,
            pool_id,
            amount,
            reward,
            penalty,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_emergency_unstaked(
    env: &Env,
    staker: Address,
    pool_id: u32,
    amount: i128,
    penalty: i128,
) {
    env.events().publish(
        (symbol_short!("EMRG_OUT"), staker.clone()),
        EmergencyUnstakedEvent {
            staker,
            pool_id,
            amount,
            penalty,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_reward_claimed(env: &Env, staker: Address, pool_id: u32, amount: i128) {
    env.events().publish(
        (symbol_short!("CLAIMED"), staker.clone()),
        RewardClaimedEvent {
            staker,
            pool_id,
            amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_tier_changed(env: &Env, staker: Address, old_tier: Tier, new_tier: Tier) {
    env.events().publish(
        (symbol_short!("TIER"), staker.clone()),
        TierChangedEvent {
            staker,
            old_tier,
            new_tier,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_lottery_drawn(
    env: &Env,
    round: u32,
    tier: Tier,
    whitelist: Vec<Address>,
    allocation_bonuses: Vec<u32>,
) {
    env.events().publish(
        (symbol_short!("LOTTERY"), round),
        LotteryDrawnEvent {
            round,
            tier,
            whitelist,
            allocation_bonuses,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_seed_committed(env: &Env, round: u32) {
    env.events().publish(
        (symbol_short!("SEED_SET"), round),
        SeedCommittedEvent {
            round,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_vesting_set(
    env: &Env,
    schedule_id: u32,
    asset: Address,
    points: u32,
    fee_bps: u32,
) {
    env.events().publish(
        (symbol_short!("VEST_SET"), schedule_id),
        VestingScheduleSetEvent {
            schedule_id,
            asset,
            points,
            fee_bps,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_vesting_shifted(env: &Env, schedule_id: u32, delta: i64) {
    env.events().publish(
        (symbol_short!("VEST_SHFT"), schedule_id),
        VestingShiftedEvent {
            schedule_id,
            delta,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_vesting_allocated(
    env: &Env,
    schedule_id: u32,
    beneficiary: Address,
    amount: i128,
) {
    env.events().publish(
        (symbol_short!("VEST_ALOC"), beneficiary.clone()),
        VestingAllocatedEvent {
            schedule_id,
            beneficiary,
            amount,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_vested_claimed(
    env: &Env,
    schedule_id: u32,
    beneficiary: Address,
    amount: i128,
    fee: i128,
) {
    env.events().publish(
        (symbol_short!("VESTED"), beneficiary.clone()),
        VestedClaimedEvent {
            schedule_id,
            beneficiary,
            amount,
            fee,
            timestamp: env.ledger().timestamp(),
        },
    );
}
