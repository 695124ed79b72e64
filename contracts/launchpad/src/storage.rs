use soroban_sdk::{contracttype, Address, BytesN, Env, Vec};

use crate::errors::ContractError;
use crate::tiers::{LockBonus, Tier};
use crate::vesting::VestingSchedule;

// Storage TTL constants (in ledgers, ~5 seconds each)
const INSTANCE_TTL_THRESHOLD: u32 = 17_280; // ~1 day
const INSTANCE_TTL_EXTEND: u32 = 518_400; // ~30 days
const PERSISTENT_TTL_THRESHOLD: u32 = 17_280; // ~1 day
const PERSISTENT_TTL_EXTEND: u32 = 518_400; // ~30 days

/// Basis-point denominator shared by penalties, bonuses and vesting percents.
pub const MAX_BPS: u32 = 10_000;

/// Reserved id of the tier upgrade pool.
pub const TIER_UPGRADE_POOL_ID: u32 = 999_999;

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,
    Ledger,
    TierSettings,
    Pool(u32),
    PoolIndex(Address, PoolKind),
    Position(u32, Address),
    Profile(Address),
    SeedCommit(u32),
    VestingPlan(u32),
    VestingAccount(u32, Address),
}

/// How stake in a pool counts toward tiers and tickets.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PoolKind {
    /// Rewards only.
    Standard,
    /// Counts toward tier and tickets; the payload is the minimum lock in seconds.
    TierEligible(u64),
    /// Counts toward tier only, never locked.
    TierUpgrade,
}

impl PoolKind {
    pub fn counts_toward_tier(&self) -> bool {
        !matches!(self, PoolKind::Standard)
    }

    pub fn min_lock(&self) -> u64 {
        match self {
            PoolKind::TierEligible(lock) => *lock,
            _ => 0,
        }
    }
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pool {
    pub stake_asset: Address,
    pub alloc_points: u32,
    pub last_accrual_time: u64,
    pub acc_reward_per_share: i128,
    pub total_staked: i128,
    pub kind: PoolKind,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserPosition {
    pub amount: i128,
    pub reward_debt: i128,
    pub unlock_deadline: u64,
}

/// Global emission and policy state, loaded once per call.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LedgerState {
    pub governance_token: Address,
    pub reward_per_second: i128,
    pub total_alloc_points: u64,
    pub start_time: u64,
    pub end_time: u64,
    pub unallocated_reward: i128,
    pub penalty_bps: u32,
    pub pool_count: u32,
    pub has_upgrade_pool: bool,
    pub paused: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TierSettings {
    pub thresholds: Vec<i128>,
    pub tokens_per_ticket: i128,
    pub lock_bonuses: Vec<LockBonus>,
    pub penalty_free_tier: Tier,
}

/// Per-user aggregate over every pool that counts toward tiers.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakerProfile {
    pub eligible_stake: i128,
    pub upgrade_stake: i128,
    pub tier: Tier,
    pub staked_at: u64,
    pub allocation_bonus_bps: u32,
}

impl StakerProfile {
    pub fn empty() -> Self {
        StakerProfile {
            eligible_stake: 0,
            upgrade_stake: 0,
            tier: Tier::None,
            staked_at: 0,
            allocation_bonus_bps: 0,
        }
    }

    /// Stake that buys lottery tickets.
    pub fn ticket_stake(&self) -> i128 {
        self.eligible_stake - self.upgrade_stake
    }
}

/// Deposited and pending amounts of one user in one pool.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PositionSummary {
    pub user: Address,
    pub deposited: i128,
    pub pending: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VestingPlan {
    pub asset: Address,
    pub schedule: VestingSchedule,
    pub fee_bps: u32,
    pub fee_recipient: Address,
    pub total_allocated: i128,
    pub claims_started: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VestingAccount {
    pub entitlement: i128,
    pub claimed: i128,
    pub claimed_bps: u32,
}

// --- Instance storage helpers (Admin, Ledger, TierSettings) ---

pub fn has_admin(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Admin)
}

pub fn get_admin(env: &Env) -> Result<Address, ContractError> {
    env.storage()
        .instance()
        .get(&DataKey::Admin)
        .ok_or(ContractError::NotInitialized)
}

pub fn set_admin(env: &Env, admin: &Address) {
    env.storage().instance().set(&DataKey::Admin, admin);
}

pub fn get_ledger(env: &Env) -> Result<LedgerState, ContractError> {
    env.storage()
        .instance()
        .get(&DataKey::Ledger)
        .ok_or(ContractError::NotInitialized)
}

pub fn set_ledger(env: &Env, state: &LedgerState) {
    env.storage().instance().set(&DataKey::Ledger, state);
}

pub fn get_tier_settings(env: &Env) -> Result<TierSettings, ContractError> {
    env.storage()
        .instance()
        .get(&DataKey::TierSettings)
        .ok_or(ContractError::NotInitialized)
}

pub fn set_tier_settings(env: &Env, settings: &TierSettings) {
    env.storage().instance().set(&DataKey::TierSettings, settings);
}

pub fn extend_instance_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND);
}

// --- Persistent storage helpers (pools, positions, profiles, lottery, vesting) ---

pub fn get_pool(env: &Env, pool_id: u32) -> Result<Pool, ContractError> {
    let key = DataKey::Pool(pool_id);
    let pool: Pool = env
        .storage()
        .persistent()
        .get(&key)
        .ok_or(ContractError::PoolNotFound)?;
    extend_persistent(env, &key);
    Ok(pool)
}

pub fn set_pool(env: &Env, pool_id: u32, pool: &Pool) {
    let key = DataKey::Pool(pool_id);
    env.storage().persistent().set(&key, pool);
    extend_persistent(env, &key);
}

pub fn has_pool_index(env: &Env, asset: &Address, kind: &PoolKind) -> bool {
    env.storage()
        .persistent()
        .has(&DataKey::PoolIndex(asset.clone(), kind.clone()))
}

pub fn set_pool_index(env: &Env, asset: &Address, kind: &PoolKind, pool_id: u32) {
    let key = DataKey::PoolIndex(asset.clone(), kind.clone());
    env.storage().persistent().set(&key, &pool_id);
    extend_persistent(env, &key);
}

/// Every registered pool id, the tier upgrade pool last.
pub fn pool_ids(env: &Env, state: &LedgerState) -> Vec<u32> {
    let mut ids = Vec::new(env);
    for id in 0..state.pool_count {
        ids.push_back(id);
    }
    if state.has_upgrade_pool {
        ids.push_back(TIER_UPGRADE_POOL_ID);
    }
    ids
}

pub fn get_position(env: &Env, pool_id: u32, user: &Address) -> UserPosition {
    let key = DataKey::Position(pool_id, user.clone());
    match env.storage().persistent().get::<_, UserPosition>(&key) {
        Some(position) => {
            extend_persistent(env, &key);
            position
        }
        None => UserPosition {
            amount: 0,
            reward_debt: 0,
            unlock_deadline: 0,
        },
    }
}

pub fn set_position(env: &Env, pool_id: u32, user: &Address, position: &UserPosition) {
    let key = DataKey::Position(pool_id, user.clone());
    env.storage().persistent().set(&key, position);
    extend_persistent(env, &key);
}

pub fn get_profile(env: &Env, user: &Address) -> StakerProfile {
    let key = DataKey::Profile(user.clone());
    match env.storage().persistent().get::<_, StakerProfile>(&key) {
        Some(profile) => {
            extend_persistent(env, &key);
            profile
        }
        None => StakerProfile::empty(),
    }
}

pub fn set_profile(env: &Env, user: &Address, profile: &StakerProfile) {
    let key = DataKey::Profile(user.clone());
    env.storage().persistent().set(&key, profile);
    extend_persistent(env, &key);
}

pub fn get_seed_commit(env: &Env, round: u32) -> Option<BytesN<32>> {
    env.storage().persistent().get(&DataKey::SeedCommit(round))
}

pub fn set_seed_commit(env: &Env, round: u32, commitment: &BytesN<32>) {
    let key = DataKey::SeedCommit(round);
    env.storage().persistent().set(&key, commitment);
    extend_persistent(env, &key);
}

pub fn remove_seed_commit(env: &Env, round: u32) {
    env.storage().persistent().remove(&DataKey::SeedCommit(round));
}

pub fn get_vesting_plan(env: &Env, schedule_id: u32) -> Result<VestingPlan, ContractError> {
    let key = DataKey::VestingPlan(schedule_id);
    let plan: VestingPlan = env
        .storage()
        .persistent()
        .get(&key)
        .ok_or(ContractError::ScheduleNotFound)?;
    extend_persistent(env, &key);
    Ok(plan)
}

pub fn has_vesting_plan(env: &Env, schedule_id: u32) -> bool {
    env.storage()
        .persistent()
        .has(&DataKey::VestingPlan(schedule_id))
}

pub fn set_vesting_plan(env: &Env, schedule_id: u32, plan: &VestingPlan) {
    let key = DataKey::VestingPlan(schedule_id);
    env.storage().persistent().set(&key, plan);
    extend_persistent(env, &key);
}

pub fn get_vesting_account(env: &Env, schedule_id: u32, user: &Address) -> VestingAccount {
    let key = DataKey::VestingAccount(schedule_id, user.clone());
    match env.storage().persistent().get::<_, VestingAccount>(&key) {
        Some(account) => {
            extend_persistent(env, &key);
            account
        }
        None => VestingAccount {
            entitlement: 0,
            claimed: 0,
            claimed_bps: 0,
        },
    }
}

pub fn set_vesting_account(env: &Env, schedule_id: u32, user: &Address, account: &VestingAccount) {
    let key = DataKey::VestingAccount(schedule_id, user.clone());
    env.storage().persistent().set(&key, account);
    extend_persistent(env, &key);
}

fn extend_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_EXTEND);
}
