use soroban_sdk::Address;

use crate::errors::ContractError;
use crate::lottery::StakerLotteryInfo;
use crate::rewards;
use crate::storage::{
    LedgerState, Pool, PoolKind, StakerProfile, TierSettings, UserPosition, MAX_BPS,
};
use crate::tiers::{self, Tier};

/// One user's view of one pool, loaded together and written back together.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakerAccount {
    pub pool: Pool,
    pub position: UserPosition,
    pub profile: StakerProfile,
}

/// What a ledger operation moved, for the caller to transfer and publish.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Settlement {
    pub reward: i128,
    pub penalty: i128,
    pub returned: i128,
    pub tier_change: Option<(Tier, Tier)>,
}

pub fn deposit(
    state: &mut LedgerState,
    settings: &TierSettings,
    account: &mut StakerAccount,
    amount: i128,
    now: u64,
) -> Result<Settlement, ContractError> {
    ensure_active(state)?;
    check_amount(amount)?;

    rewards::accrue(&mut account.pool, state, now);
    let reward = pay_pending(state, account)?;

    account.position.amount += amount;
    account.pool.total_staked += amount;
    if let PoolKind::TierEligible(lock) = account.pool.kind {
        let deadline = now.saturating_add(lock);
        account.position.unlock_deadline = account.position.unlock_deadline.max(deadline);
    }
    account.position.reward_debt =
        rewards::reward_debt(account.position.amount, account.pool.acc_reward_per_share);

    let tier_change = if account.pool.kind.counts_toward_tier() {
        track_deposit(&mut account.profile, settings, &account.pool.kind, amount, now);
        tiers::reevaluate(&mut account.profile, &settings.thresholds)
    } else {
        None
    };

    Ok(Settlement {
        reward,
        penalty: 0,
        returned: 0,
        tier_change,
    })
}

pub fn withdraw(
    state: &mut LedgerState,
    settings: &TierSettings,
    account: &mut StakerAccount,
    amount: i128,
    now: u64,
) -> Result<Settlement, ContractError> {
    ensure_active(state)?;
    check_amount(amount)?;
    if amount > account.position.amount {
        return Err(ContractError::InsufficientBalance);
    }

    rewards::accrue(&mut account.pool, state, now);
    let reward = pay_pending(state, account)?;

    let penalty = early_exit_penalty(state, settings, account, amount, now);
    state.unallocated_reward += penalty;

    account.position.amount -= amount;
    account.pool.total_staked -= amount;
    account.position.reward_debt =
        rewards::reward_debt(account.position.amount, account.pool.acc_reward_per_share);

    let tier_change = settle_withdrawal(settings, account, amount, now);

    Ok(Settlement {
        reward,
        penalty,
        returned: amount - penalty,
        tier_change,
    })
}

/// Leave the pool with the whole position, forfeiting unpaid rewards.
pub fn emergency_withdraw(
    state: &mut LedgerState,
    settings: &TierSettings,
    account: &mut StakerAccount,
    now: u64,
) -> Result<Settlement, ContractError> {
    ensure_active(state)?;
    let amount = account.position.amount;
    if amount <= 0 {
        return Err(ContractError::InsufficientBalance);
    }

    rewards::accrue(&mut account.pool, state, now);

    let penalty = early_exit_penalty(state, settings, account, amount, now);
    state.unallocated_reward += penalty;

    account.position.amount = 0;
    account.position.reward_debt = 0;
    account.pool.total_staked -= amount;

    let tier_change = settle_withdrawal(settings, account, amount, now);

    Ok(Settlement {
        reward: 0,
        penalty,
        returned: amount - penalty,
        tier_change,
    })
}

pub fn claim(
    state: &mut LedgerState,
    account: &mut StakerAccount,
    now: u64,
) -> Result<i128, ContractError> {
    ensure_active(state)?;

    rewards::accrue(&mut account.pool, state, now);
    if rewards::pending(&account.position, account.pool.acc_reward_per_share) <= 0 {
        return Err(ContractError::NothingToClaim);
    }
    let reward = pay_pending(state, account)?;
    account.position.reward_debt =
        rewards::reward_debt(account.position.amount, account.pool.acc_reward_per_share);
    Ok(reward)
}

/// Add `amount` to the reward reserve and stretch the emission horizon to
/// cover it. Returns true when emission had stopped and restarts now, in
/// which case every pool must be resumed at `now`.
pub fn fund(state: &mut LedgerState, amount: i128, now: u64) -> Result<bool, ContractError> {
    check_amount(amount)?;
    let lapsed = state.end_time < now;

    state.unallocated_reward += amount;
    if state.reward_per_second > 0 {
        let base = now.max(state.start_time);
        let runway = u64::try_from(state.unallocated_reward / state.reward_per_second)
            .unwrap_or(u64::MAX);
        state.end_time = state.end_time.max(base.saturating_add(runway));
    }

    Ok(lapsed && state.end_time > now)
}

pub fn withdraw_reserve(state: &mut LedgerState, amount: i128) -> Result<(), ContractError> {
    check_amount(amount)?;
    if amount > state.unallocated_reward {
        return Err(ContractError::InsufficientReserve);
    }
    state.unallocated_reward -= amount;
    Ok(())
}

/// The lottery view of a staker, computed from the stored profile.
pub fn lottery_info(
    user: &Address,
    profile: &StakerProfile,
    settings: &TierSettings,
) -> StakerLotteryInfo {
    let tier = tiers::tier_for_stake(&settings.thresholds, profile.eligible_stake);
    let tickets =
        tiers::tickets_for_stake(tier, profile.ticket_stake(), settings.tokens_per_ticket)
            .unwrap_or(0);

    StakerLotteryInfo {
        user: user.clone(),
        tickets,
        tier,
        staked_at: profile.staked_at,
        allocation_bonus_bps: profile.allocation_bonus_bps,
    }
}

pub fn ensure_active(state: &LedgerState) -> Result<(), ContractError> {
    if state.paused {
        return Err(ContractError::Paused);
    }
    Ok(())
}

pub fn check_amount(amount: i128) -> Result<(), ContractError> {
    if amount == 0 {
        return Err(ContractError::ZeroAmount);
    }
    if amount < 0 {
        return Err(ContractError::InvalidAmount);
    }
    Ok(())
}

fn pay_pending(state: &mut LedgerState, account: &StakerAccount) -> Result<i128, ContractError> {
    let reward = rewards::pending(&account.position, account.pool.acc_reward_per_share);
    if reward > state.unallocated_reward {
        return Err(ContractError::InsufficientReserve);
    }
    state.unallocated_reward -= reward;
    Ok(reward)
}

fn early_exit_penalty(
    state: &LedgerState,
    settings: &TierSettings,
    account: &StakerAccount,
    amount: i128,
    now: u64,
) -> i128 {
    let locked = account.pool.kind.min_lock() > 0 && now < account.position.unlock_deadline;
    // Thresholds may have moved since the profile was last evaluated.
    let tier = tiers::tier_for_stake(&settings.thresholds, account.profile.eligible_stake);
    if !locked || tier <= settings.penalty_free_tier {
        return 0;
    }
    amount * state.penalty_bps as i128 / MAX_BPS as i128
}

fn track_deposit(
    profile: &mut StakerProfile,
    settings: &TierSettings,
    kind: &PoolKind,
    amount: i128,
    now: u64,
) {
    if profile.eligible_stake == 0 {
        profile.staked_at = now;
        profile.allocation_bonus_bps = 0;
    }
    profile.eligible_stake += amount;

    match kind {
        PoolKind::TierUpgrade => profile.upgrade_stake += amount,
        PoolKind::TierEligible(lock) => {
            let bonus = tiers::bonus_for_lock(&settings.lock_bonuses, *lock);
            profile.allocation_bonus_bps = profile.allocation_bonus_bps.max(bonus);
        }
        PoolKind::Standard => {}
    }
}

fn settle_withdrawal(
    settings: &TierSettings,
    account: &mut StakerAccount,
    amount: i128,
    now: u64,
) -> Option<(Tier, Tier)> {
    if !account.pool.kind.counts_toward_tier() {
        return None;
    }

    let profile = &mut account.profile;
    profile.eligible_stake -= amount;
    if account.pool.kind == PoolKind::TierUpgrade {
        profile.upgrade_stake -= amount;
    }
    profile.staked_at = now;
    if profile.eligible_stake == 0 {
        profile.allocation_bonus_bps = 0;
    }

    tiers::reevaluate(profile, &settings.thresholds)
}
