#![no_std]

mod errors;
mod events;
pub mod ledger;
pub mod lottery;
pub mod rewards;
mod storage;
pub mod tiers;
pub mod vesting;

#[cfg(test)]
mod test_lottery;

pub use errors::ContractError;
pub use lottery::{LotteryResult, StakerLotteryInfo};
pub use storage::{
    LedgerState, Pool, PoolKind, PositionSummary, StakerProfile, TierSettings, UserPosition,
    VestingAccount, VestingPlan, MAX_BPS, TIER_UPGRADE_POOL_ID,
};
pub use tiers::{LockBonus, Tier};
pub use vesting::VestingSchedule;

use ledger::StakerAccount;
use lottery::{LedgerPrng, RevealedSeed, TicketDraw};
use soroban_sdk::{contract, contractimpl, log, token, Address, Bytes, BytesN, Env, Vec};

#[contract]
pub struct LaunchpadContract;

#[contractimpl]
impl LaunchpadContract {
    // ========== Admin Functions ==========

    /// One-time initialization. Emission starts at `start_time` once funded.
    pub fn initialize(
        env: Env,
        admin: Address,
        governance_token: Address,
        reward_per_second: i128,
        start_time: u64,
        penalty_bps: u32,
        tokens_per_ticket: i128,
    ) -> Result<(), ContractError> {
        if storage::has_admin(&env) {
            return Err(ContractError::AlreadyInitialized);
        }
        if reward_per_second < 0 || tokens_per_ticket <= 0 {
            return Err(ContractError::InvalidAmount);
        }
        if penalty_bps > MAX_BPS {
            return Err(ContractError::InvalidBps);
        }

        storage::set_admin(&env, &admin);
        storage::set_ledger(
            &env,
            &LedgerState {
                governance_token: governance_token.clone(),
                reward_per_second,
                total_alloc_points: 0,
                start_time,
                end_time: start_time,
                unallocated_reward: 0,
                penalty_bps,
                pool_count: 0,
                has_upgrade_pool: false,
                paused: false,
            },
        );
        storage::set_tier_settings(&env, &tiers::default_settings(&env, tokens_per_ticket));
        storage::extend_instance_ttl(&env);

        events::publish_initialized(&env, admin, governance_token, reward_per_second, start_time);
        Ok(())
    }

    /// Register a stake pool. Tier pools must stake the governance token.
    /// The tier upgrade pool always lands on `TIER_UPGRADE_POOL_ID`.
    pub fn add_pool(
        env: Env,
        admin: Address,
        stake_asset: Address,
        alloc_points: u32,
        kind: PoolKind,
    ) -> Result<u32, ContractError> {
        Self::require_admin(&env, &admin)?;
        storage::extend_instance_ttl(&env);

        let mut state = storage::get_ledger(&env)?;
        if kind.counts_toward_tier() && stake_asset != state.governance_token {
            return Err(ContractError::InvalidPoolConfig);
        }
        if storage::has_pool_index(&env, &stake_asset, &kind) {
            return Err(ContractError::PoolAlreadyExists);
        }

        let now = env.ledger().timestamp();
        Self::accrue_all(&env, &state, now)?;

        let pool_id = if kind == PoolKind::TierUpgrade {
            state.has_upgrade_pool = true;
            TIER_UPGRADE_POOL_ID
        } else {
            let id = state.pool_count;
            state.pool_count += 1;
            id
        };
        state.total_alloc_points += alloc_points as u64;

        storage::set_pool(
            &env,
            pool_id,
            &Pool {
                stake_asset: stake_asset.clone(),
                alloc_points,
                last_accrual_time: now.max(state.start_time),
                acc_reward_per_share: 0,
                total_staked: 0,
                kind: kind.clone(),
            },
        );
        storage::set_pool_index(&env, &stake_asset, &kind, pool_id);
        storage::set_ledger(&env, &state);

        events::publish_pool_added(&env, pool_id, stake_asset, alloc_points, kind);
        Ok(pool_id)
    }

    /// Reweight a pool. Every pool is accrued under the old weights first.
    pub fn set_alloc_points(
        env: Env,
        admin: Address,
        pool_id: u32,
        alloc_points: u32,
    ) -> Result<(), ContractError> {
        Self::require_admin(&env, &admin)?;
        storage::extend_instance_ttl(&env);

        let mut state = storage::get_ledger(&env)?;
        storage::get_pool(&env, pool_id)?;
        Self::accrue_all(&env, &state, env.ledger().timestamp())?;
        let mut pool = storage::get_pool(&env, pool_id)?;

        state.total_alloc_points = state.total_alloc_points - pool.alloc_points as u64
            + alloc_points as u64;
        pool.alloc_points = alloc_points;
        storage::set_pool(&env, pool_id, &pool);
        storage::set_ledger(&env, &state);

        events::publish_alloc_points_set(&env, pool_id, alloc_points, state.total_alloc_points);
        Ok(())
    }

    /// Update the global reward rate (governance stroops per second).
    /// Updates all pools' accumulators before changing rate.
    pub fn set_reward_rate(env: Env, admin: Address, new_rate: i128) -> Result<(), ContractError> {
        Self::require_admin(&env, &admin)?;
        storage::extend_instance_ttl(&env);
        if new_rate < 0 {
            return Err(ContractError::InvalidAmount);
        }

        let mut state = storage::get_ledger(&env)?;
        Self::accrue_all(&env, &state, env.ledger().timestamp())?;
        state.reward_per_second = new_rate;
        storage::set_ledger(&env, &state);

        events::publish_reward_rate_set(&env, new_rate);
        Ok(())
    }

    pub fn set_penalty(env: Env, admin: Address, penalty_bps: u32) -> Result<(), ContractError> {
        Self::require_admin(&env, &admin)?;
        storage::extend_instance_ttl(&env);
        if penalty_bps > MAX_BPS {
            return Err(ContractError::InvalidBps);
        }

        let mut state = storage::get_ledger(&env)?;
        state.penalty_bps = penalty_bps;
        storage::set_ledger(&env, &state);

        events::publish_penalty_set(&env, penalty_bps);
        Ok(())
    }

    /// Highest tier that may leave a locked pool early without penalty.
    pub fn set_penalty_free_tier(env: Env, admin: Address, tier: Tier) -> Result<(), ContractError> {
        Self::require_admin(&env, &admin)?;
        storage::extend_instance_ttl(&env);
        let mut settings = storage::get_tier_settings(&env)?;
        settings.penalty_free_tier = tier;
        storage::set_tier_settings(&env, &settings);
        Ok(())
    }

    pub fn set_tokens_per_ticket(
        env: Env,
        admin: Address,
        tokens_per_ticket: i128,
    ) -> Result<(), ContractError> {
        Self::require_admin(&env, &admin)?;
        storage::extend_instance_ttl(&env);
        if tokens_per_ticket <= 0 {
            return Err(ContractError::InvalidAmount);
        }
        let mut settings = storage::get_tier_settings(&env)?;
        settings.tokens_per_ticket = tokens_per_ticket;
        storage::set_tier_settings(&env, &settings);
        Ok(())
    }

    /// Replace all five thresholds at once (Fan..Tycoon, strictly increasing).
    pub fn set_tier_thresholds(
        env: Env,
        admin: Address,
        thresholds: Vec<i128>,
    ) -> Result<(), ContractError> {
        Self::require_admin(&env, &admin)?;
        storage::extend_instance_ttl(&env);
        tiers::validate_thresholds(&thresholds)?;
        let mut settings = storage::get_tier_settings(&env)?;
        settings.thresholds = thresholds;
        storage::set_tier_settings(&env, &settings);
        Ok(())
    }

    pub fn set_required_stake(
        env: Env,
        admin: Address,
        tier: Tier,
        amount: i128,
    ) -> Result<(), ContractError> {
        Self::require_admin(&env, &admin)?;
        storage::extend_instance_ttl(&env);
        let mut settings = storage::get_tier_settings(&env)?;
        tiers::set_required_stake(&mut settings, tier, amount)?;
        storage::set_tier_settings(&env, &settings);
        Ok(())
    }

    pub fn set_lock_bonuses(
        env: Env,
        admin: Address,
        lock_bonuses: Vec<LockBonus>,
    ) -> Result<(), ContractError> {
        Self::require_admin(&env, &admin)?;
        storage::extend_instance_ttl(&env);
        tiers::validate_lock_bonuses(&lock_bonuses)?;
        let mut settings = storage::get_tier_settings(&env)?;
        settings.lock_bonuses = lock_bonuses;
        storage::set_tier_settings(&env, &settings);
        Ok(())
    }

    /// Transfer admin role to a new address.
    pub fn set_admin(env: Env, admin: Address, new_admin: Address) -> Result<(), ContractError> {
        Self::require_admin(&env, &admin)?;
        storage::extend_instance_ttl(&env);
        storage::set_admin(&env, &new_admin);
        Ok(())
    }

    /// Transfer governance tokens into the reward reserve and extend the
    /// emission horizon. Anyone may fund.
    pub fn fund(env: Env, funder: Address, amount: i128) -> Result<(), ContractError> {
        ledger::check_amount(amount)?;
        funder.require_auth();
        storage::extend_instance_ttl(&env);

        let mut state = storage::get_ledger(&env)?;
        let now = env.ledger().timestamp();
        Self::accrue_all(&env, &state, now)?;

        if ledger::fund(&mut state, amount, now)? {
            for pool_id in storage::pool_ids(&env, &state).iter() {
                let mut pool = storage::get_pool(&env, pool_id)?;
                rewards::resume(&mut pool, now);
                storage::set_pool(&env, pool_id, &pool);
            }
        }
        storage::set_ledger(&env, &state);

        let token_client = token::Client::new(&env, &state.governance_token);
        token_client.transfer(&funder, &env.current_contract_address(), &amount);

        events::publish_funded(&env, funder, amount, state.unallocated_reward, state.end_time);
        Ok(())
    }

    /// Take unallocated reward back out to the admin.
    pub fn withdraw_reserve(env: Env, admin: Address, amount: i128) -> Result<(), ContractError> {
        Self::require_admin(&env, &admin)?;
        storage::extend_instance_ttl(&env);

        let mut state = storage::get_ledger(&env)?;
        Self::accrue_all(&env, &state, env.ledger().timestamp())?;
        ledger::withdraw_reserve(&mut state, amount)?;
        storage::set_ledger(&env, &state);

        let token_client = token::Client::new(&env, &state.governance_token);
        token_client.transfer(&env.current_contract_address(), &admin, &amount);

        events::publish_reserve_withdrawn(&env, admin, amount);
        Ok(())
    }

    pub fn pause(env: Env, admin: Address) -> Result<(), ContractError> {
        Self::set_paused(&env, &admin, true)
    }

    pub fn unpause(env: Env, admin: Address) -> Result<(), ContractError> {
        Self::set_paused(&env, &admin, false)
    }

    /// Bring one pool's accumulator up to date.
    pub fn update_pool(env: Env, pool_id: u32) -> Result<(), ContractError> {
        storage::extend_instance_ttl(&env);
        let state = storage::get_ledger(&env)?;
        ledger::ensure_active(&state)?;

        let mut pool = storage::get_pool(&env, pool_id)?;
        rewards::accrue(&mut pool, &state, env.ledger().timestamp());
        storage::set_pool(&env, pool_id, &pool);
        Ok(())
    }

    /// Bring every pool's accumulator up to date.
    pub fn update_pools(env: Env) -> Result<(), ContractError> {
        storage::extend_instance_ttl(&env);
        let state = storage::get_ledger(&env)?;
        ledger::ensure_active(&state)?;
        Self::accrue_all(&env, &state, env.ledger().timestamp())
    }

    // ========== User Functions ==========

    /// Stake into a pool, paying out any pending reward. Returns the reward paid.
    pub fn deposit(
        env: Env,
        user: Address,
        pool_id: u32,
        amount: i128,
    ) -> Result<i128, ContractError> {
        user.require_auth();
        storage::extend_instance_ttl(&env);

        let mut state = storage::get_ledger(&env)?;
        let settings = storage::get_tier_settings(&env)?;
        let mut account = Self::load_account(&env, pool_id, &user)?;
        let now = env.ledger().timestamp();

        let settlement = ledger::deposit(&mut state, &settings, &mut account, amount, now)?;
        Self::save_account(&env, pool_id, &user, &account);
        storage::set_ledger(&env, &state);

        let stake_client = token::Client::new(&env, &account.pool.stake_asset);
        stake_client.transfer(&user, &env.current_contract_address(), &amount);
        Self::pay_reward(&env, &state, &user, settlement.reward);

        events::publish_staked(&env, user.clone(), pool_id, amount, settlement.reward);
        Self::publish_tier_change(&env, &user, settlement.tier_change);
        Ok(settlement.reward)
    }

    /// Unstake part of a position. Returns the principal sent back after any
    /// early-exit penalty.
    pub fn withdraw(
        env: Env,
        user: Address,
        pool_id: u32,
        amount: i128,
    ) -> Result<i128, ContractError> {
        user.require_auth();
        storage::extend_instance_ttl(&env);

        let mut state = storage::get_ledger(&env)?;
        let settings = storage::get_tier_settings(&env)?;
        let mut account = Self::load_account(&env, pool_id, &user)?;
        let now = env.ledger().timestamp();

        let settlement = ledger::withdraw(&mut state, &settings, &mut account, amount, now)?;
        Self::save_account(&env, pool_id, &user, &account);
        storage::set_ledger(&env, &state);

        let stake_client = token::Client::new(&env, &account.pool.stake_asset);
        stake_client.transfer(&env.current_contract_address(), &user, &settlement.returned);
        Self::pay_reward(&env, &state, &user, settlement.reward);

        events::publish_unstaked(
            &env,
            user.clone(),
            pool_id,
            settlement.returned,
            settlement.reward,
            settlement.penalty,
        );
        Self::publish_tier_change(&env, &user, settlement.tier_change);
        Ok(settlement.returned)
    }

    /// Unstake everything without collecting rewards.
    pub fn emergency_withdraw(env: Env, user: Address, pool_id: u32) -> Result<i128, ContractError> {
        user.require_auth();
        storage::extend_instance_ttl(&env);

        let mut state = storage::get_ledger(&env)?;
        let settings = storage::get_tier_settings(&env)?;
        let mut account = Self::load_account(&env, pool_id, &user)?;
        let now = env.ledger().timestamp();

        let settlement = ledger::emergency_withdraw(&mut state, &settings, &mut account, now)?;
        Self::save_account(&env, pool_id, &user, &account);
        storage::set_ledger(&env, &state);

        let stake_client = token::Client::new(&env, &account.pool.stake_asset);
        stake_client.transfer(&env.current_contract_address(), &user, &settlement.returned);

        events::publish_emergency_unstaked(
            &env,
            user.clone(),
            pool_id,
            settlement.returned,
            settlement.penalty,
        );
        Self::publish_tier_change(&env, &user, settlement.tier_change);
        Ok(settlement.returned)
    }

    /// Collect pending reward without touching the stake. Returns amount claimed.
    pub fn claim(env: Env, user: Address, pool_id: u32) -> Result<i128, ContractError> {
        user.require_auth();
        storage::extend_instance_ttl(&env);

        let mut state = storage::get_ledger(&env)?;
        let mut account = Self::load_account(&env, pool_id, &user)?;
        let reward = ledger::claim(&mut state, &mut account, env.ledger().timestamp())?;
        Self::save_account(&env, pool_id, &user, &account);
        storage::set_ledger(&env, &state);

        Self::pay_reward(&env, &state, &user, reward);

        events::publish_reward_claimed(&env, user, pool_id, reward);
        Ok(reward)
    }

    // ========== Lottery Functions ==========

    /// Commit to `sha256(secret)` for a round before its registration closes.
    /// A round takes one commitment only.
    pub fn commit_lottery_seed(
        env: Env,
        admin: Address,
        round: u32,
        commitment: BytesN<32>,
    ) -> Result<(), ContractError> {
        Self::require_admin(&env, &admin)?;
        storage::extend_instance_ttl(&env);
        if storage::get_seed_commit(&env, round).is_some() {
            return Err(ContractError::SeedAlreadyCommitted);
        }
        storage::set_seed_commit(&env, round, &commitment);
        events::publish_seed_committed(&env, round);
        Ok(())
    }

    /// Draw a round's whitelist using the host PRNG. Rounds with a committed
    /// seed must be drawn through `play_committed_lottery`.
    pub fn play_lottery(
        env: Env,
        admin: Address,
        round: u32,
        tier: Tier,
        target_count: u32,
        candidates: Vec<StakerLotteryInfo>,
    ) -> Result<LotteryResult, ContractError> {
        Self::require_admin(&env, &admin)?;
        storage::extend_instance_ttl(&env);
        if storage::get_seed_commit(&env, round).is_some() {
            return Err(ContractError::SeedAlreadyCommitted);
        }
        let mut draw = LedgerPrng::new(&env);
        run_lottery(&env, round, tier, target_count, &candidates, &mut draw)
    }

    /// Draw a round's whitelist from a previously committed secret mixed with
    /// ledger entropy. The commitment is consumed.
    pub fn play_committed_lottery(
        env: Env,
        admin: Address,
        round: u32,
        tier: Tier,
        target_count: u32,
        candidates: Vec<StakerLotteryInfo>,
        secret: Bytes,
    ) -> Result<LotteryResult, ContractError> {
        Self::require_admin(&env, &admin)?;
        storage::extend_instance_ttl(&env);

        let committed =
            storage::get_seed_commit(&env, round).ok_or(ContractError::SeedNotCommitted)?;
        if lottery::commitment(&env, &secret) != committed {
            return Err(ContractError::SeedMismatch);
        }
        storage::remove_seed_commit(&env, round);

        let mut draw = RevealedSeed::new(&env, lottery::mix_seed(&env, &secret));
        run_lottery(&env, round, tier, target_count, &candidates, &mut draw)
    }

    // ========== Vesting Functions ==========

    /// Create or replace a vesting plan. Replacing is refused once anyone has
    /// claimed against it; use `shift_vesting_schedule` then.
    #[allow(clippy::too_many_arguments)]
    pub fn set_vesting_schedule(
        env: Env,
        admin: Address,
        schedule_id: u32,
        asset: Address,
        unlock_times: Vec<u64>,
        percents_bps: Vec<u32>,
        fee_bps: u32,
        fee_recipient: Address,
    ) -> Result<(), ContractError> {
        Self::require_admin(&env, &admin)?;
        storage::extend_instance_ttl(&env);
        if fee_bps > MAX_BPS {
            return Err(ContractError::InvalidBps);
        }
        let schedule = VestingSchedule::new(unlock_times, percents_bps)?;

        let total_allocated = if storage::has_vesting_plan(&env, schedule_id) {
            let existing = storage::get_vesting_plan(&env, schedule_id)?;
            if existing.claims_started || (existing.total_allocated > 0 && existing.asset != asset)
            {
                return Err(ContractError::ScheduleLocked);
            }
            existing.total_allocated
        } else {
            0
        };

        let points = schedule.unlock_times.len();
        storage::set_vesting_plan(
            &env,
            schedule_id,
            &VestingPlan {
                asset: asset.clone(),
                schedule,
                fee_bps,
                fee_recipient,
                total_allocated,
                claims_started: false,
            },
        );

        events::publish_vesting_set(&env, schedule_id, asset, points, fee_bps);
        Ok(())
    }

    /// Move every unlock point of a plan by `delta` seconds.
    pub fn shift_vesting_schedule(
        env: Env,
        admin: Address,
        schedule_id: u32,
        delta: i64,
    ) -> Result<(), ContractError> {
        Self::require_admin(&env, &admin)?;
        storage::extend_instance_ttl(&env);

        let mut plan = storage::get_vesting_plan(&env, schedule_id)?;
        plan.schedule.shift(delta);
        storage::set_vesting_plan(&env, schedule_id, &plan);

        events::publish_vesting_shifted(&env, schedule_id, delta);
        Ok(())
    }

    /// Escrow `amount` of the plan's asset from the admin for `beneficiary`.
    pub fn allocate_vesting(
        env: Env,
        admin: Address,
        schedule_id: u32,
        beneficiary: Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        Self::require_admin(&env, &admin)?;
        storage::extend_instance_ttl(&env);
        ledger::check_amount(amount)?;

        let mut plan = storage::get_vesting_plan(&env, schedule_id)?;
        let mut account = storage::get_vesting_account(&env, schedule_id, &beneficiary);
        account.entitlement += amount;
        plan.total_allocated += amount;
        storage::set_vesting_account(&env, schedule_id, &beneficiary, &account);
        storage::set_vesting_plan(&env, schedule_id, &plan);

        let asset_client = token::Client::new(&env, &plan.asset);
        asset_client.transfer(&admin, &env.current_contract_address(), &amount);

        events::publish_vesting_allocated(&env, schedule_id, beneficiary, amount);
        Ok(())
    }

    /// Release everything unlocked so far. Returns the amount received after fees.
    pub fn claim_vested(
        env: Env,
        beneficiary: Address,
        schedule_id: u32,
    ) -> Result<i128, ContractError> {
        beneficiary.require_auth();
        storage::extend_instance_ttl(&env);

        let mut plan = storage::get_vesting_plan(&env, schedule_id)?;
        let mut account = storage::get_vesting_account(&env, schedule_id, &beneficiary);
        let released = plan
            .schedule
            .release(&mut account, env.ledger().timestamp())?;
        let fee = released * plan.fee_bps as i128 / MAX_BPS as i128;
        let net = released - fee;

        plan.claims_started = true;
        storage::set_vesting_account(&env, schedule_id, &beneficiary, &account);
        storage::set_vesting_plan(&env, schedule_id, &plan);

        let asset_client = token::Client::new(&env, &plan.asset);
        asset_client.transfer(&env.current_contract_address(), &beneficiary, &net);
        if fee > 0 {
            asset_client.transfer(&env.current_contract_address(), &plan.fee_recipient, &fee);
        }

        events::publish_vested_claimed(&env, schedule_id, beneficiary, net, fee);
        Ok(net)
    }

    // ========== View Functions ==========

    /// Query unclaimed rewards for a user in a pool.
    pub fn pending_reward(env: Env, user: Address, pool_id: u32) -> i128 {
        let (Ok(state), Ok(pool)) = (storage::get_ledger(&env), storage::get_pool(&env, pool_id))
        else {
            return 0;
        };
        let position = storage::get_position(&env, pool_id, &user);
        let acc = rewards::simulate(&pool, &state, env.ledger().timestamp());
        rewards::pending(&position, acc)
    }

    pub fn get_pool(env: Env, pool_id: u32) -> Result<Pool, ContractError> {
        storage::get_pool(&env, pool_id)
    }

    pub fn get_position(env: Env, user: Address, pool_id: u32) -> UserPosition {
        storage::get_position(&env, pool_id, &user)
    }

    pub fn get_ledger_state(env: Env) -> Result<LedgerState, ContractError> {
        storage::get_ledger(&env)
    }

    pub fn get_tier_settings(env: Env) -> Result<TierSettings, ContractError> {
        storage::get_tier_settings(&env)
    }

    /// Number of regular pools, not counting the tier upgrade pool.
    pub fn pool_count(env: Env) -> u32 {
        storage::get_ledger(&env)
            .map(|state| state.pool_count)
            .unwrap_or(0)
    }

    pub fn tier_for_stake(env: Env, amount: i128) -> Result<Tier, ContractError> {
        let settings = storage::get_tier_settings(&env)?;
        Ok(tiers::tier_for_stake(&settings.thresholds, amount))
    }

    pub fn get_tier(env: Env, user: Address) -> Result<Tier, ContractError> {
        let settings = storage::get_tier_settings(&env)?;
        let profile = storage::get_profile(&env, &user);
        Ok(tiers::tier_for_stake(&settings.thresholds, profile.eligible_stake))
    }

    /// Lottery tickets held by `user`. Fails for tiers outside the lottery.
    pub fn get_ticket_amount(env: Env, user: Address) -> Result<u64, ContractError> {
        let settings = storage::get_tier_settings(&env)?;
        let profile = storage::get_profile(&env, &user);
        let tier = tiers::tier_for_stake(&settings.thresholds, profile.eligible_stake);
        tiers::tickets_for_stake(tier, profile.ticket_stake(), settings.tokens_per_ticket)
    }

    pub fn get_staker_profile(env: Env, user: Address) -> StakerProfile {
        storage::get_profile(&env, &user)
    }

    pub fn staker_lottery_infos(
        env: Env,
        users: Vec<Address>,
    ) -> Result<Vec<StakerLotteryInfo>, ContractError> {
        let settings = storage::get_tier_settings(&env)?;
        let mut infos = Vec::new(&env);
        for user in users.iter() {
            let profile = storage::get_profile(&env, &user);
            infos.push_back(ledger::lottery_info(&user, &profile, &settings));
        }
        Ok(infos)
    }

    pub fn positions_for_users(
        env: Env,
        pool_id: u32,
        users: Vec<Address>,
    ) -> Vec<PositionSummary> {
        let mut summaries = Vec::new(&env);
        for user in users.iter() {
            let deposited = storage::get_position(&env, pool_id, &user).amount;
            let pending = Self::pending_reward(env.clone(), user.clone(), pool_id);
            summaries.push_back(PositionSummary {
                user,
                deposited,
                pending,
            });
        }
        summaries
    }

    /// Whether `user` has held tier stake without withdrawing for `duration` seconds.
    pub fn has_staked_for(env: Env, user: Address, duration: u64) -> bool {
        let profile = storage::get_profile(&env, &user);
        profile.eligible_stake > 0
            && env.ledger().timestamp() >= profile.staked_at.saturating_add(duration)
    }

    pub fn get_vesting_plan(env: Env, schedule_id: u32) -> Result<VestingPlan, ContractError> {
        storage::get_vesting_plan(&env, schedule_id)
    }

    pub fn get_vesting_account(env: Env, schedule_id: u32, user: Address) -> VestingAccount {
        storage::get_vesting_account(&env, schedule_id, &user)
    }

    pub fn claimable(env: Env, schedule_id: u32, user: Address) -> Result<i128, ContractError> {
        let plan = storage::get_vesting_plan(&env, schedule_id)?;
        let account = storage::get_vesting_account(&env, schedule_id, &user);
        Ok(plan.schedule.claimable(&account, env.ledger().timestamp()))
    }

    // ========== Internal Helpers ==========

    fn require_admin(env: &Env, caller: &Address) -> Result<(), ContractError> {
        caller.require_auth();
        let admin = storage::get_admin(env)?;
        if *caller != admin {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }

    fn set_paused(env: &Env, admin: &Address, paused: bool) -> Result<(), ContractError> {
        Self::require_admin(env, admin)?;
        storage::extend_instance_ttl(env);
        let mut state = storage::get_ledger(env)?;
        state.paused = paused;
        storage::set_ledger(env, &state);
        events::publish_paused(env, paused);
        Ok(())
    }

    fn accrue_all(env: &Env, state: &LedgerState, now: u64) -> Result<(), ContractError> {
        for pool_id in storage::pool_ids(env, state).iter() {
            let mut pool = storage::get_pool(env, pool_id)?;
            rewards::accrue(&mut pool, state, now);
            storage::set_pool(env, pool_id, &pool);
        }
        Ok(())
    }

    fn load_account(env: &Env, pool_id: u32, user: &Address) -> Result<StakerAccount, ContractError> {
        Ok(StakerAccount {
            pool: storage::get_pool(env, pool_id)?,
            position: storage::get_position(env, pool_id, user),
            profile: storage::get_profile(env, user),
        })
    }

    fn save_account(env: &Env, pool_id: u32, user: &Address, account: &StakerAccount) {
        storage::set_pool(env, pool_id, &account.pool);
        storage::set_position(env, pool_id, user, &account.position);
        if account.pool.kind.counts_toward_tier() {
            storage::set_profile(env, user, &account.profile);
        }
    }

    fn pay_reward(env: &Env, state: &LedgerState, user: &Address, reward: i128) {
        if reward > 0 {
            let token_client = token::Client::new(env, &state.governance_token);
            token_client.transfer(&env.current_contract_address(), user, &reward);
        }
    }

    fn publish_tier_change(env: &Env, user: &Address, change: Option<(Tier, Tier)>) {
        if let Some((old, new)) = change {
            events::publish_tier_changed(env, user.clone(), old, new);
        }
    }
}

/// Replace the caller's candidate views with the ledger's own before drawing.
fn run_lottery<D: TicketDraw>(
    env: &Env,
    round: u32,
    tier: Tier,
    target_count: u32,
    candidates: &Vec<StakerLotteryInfo>,
    draw: &mut D,
) -> Result<LotteryResult, ContractError> {
    let settings = storage::get_tier_settings(env)?;
    let mut refreshed = Vec::new(env);
    for candidate in candidates.iter() {
        let profile = storage::get_profile(env, &candidate.user);
        let info = ledger::lottery_info(&candidate.user, &profile, &settings);
        if info != candidate {
            log!(env, "lottery: stale candidate view", candidate.user);
        }
        refreshed.push_back(info);
    }

    let result = lottery::select(env, tier, target_count, &refreshed, draw);
    events::publish_lottery_drawn(
        env,
        round,
        tier,
        result.whitelist.clone(),
        result.allocation_bonuses.clone(),
    );
    Ok(result)
}
