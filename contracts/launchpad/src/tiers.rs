use soroban_sdk::{contracttype, Env, Vec};

use crate::errors::ContractError;
use crate::storage::{StakerProfile, TierSettings, MAX_BPS};

/// One whole governance token in stroops (7 decimals).
pub const TOKEN_UNIT: i128 = 10_000_000;

/// Number of ranked tiers above `Tier::None`.
pub const TIER_COUNT: u32 = 5;

const DAY: u64 = 86_400;

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Tier {
    None = 0,
    Fan = 1,
    Merchant = 2,
    Dealer = 3,
    Broker = 4,
    Tycoon = 5,
}

impl Tier {
    pub fn from_ordinal(ordinal: u32) -> Tier {
        match ordinal {
            1 => Tier::Fan,
            2 => Tier::Merchant,
            3 => Tier::Dealer,
            4 => Tier::Broker,
            5 => Tier::Tycoon,
            _ => Tier::None,
        }
    }

    /// Tiers admitted to sale rounds by lottery draw.
    pub fn is_ticket_eligible(self) -> bool {
        matches!(self, Tier::Fan | Tier::Merchant | Tier::Dealer)
    }

    /// Tiers admitted to sale rounds without a draw.
    pub fn is_auto_whitelisted(self) -> bool {
        matches!(self, Tier::Broker | Tier::Tycoon)
    }
}

/// Allocation bonus earned by locking stake for at least `min_lock` seconds.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LockBonus {
    pub min_lock: u64,
    pub bonus_bps: u32,
}

pub fn default_settings(env: &Env, tokens_per_ticket: i128) -> TierSettings {
    let mut thresholds = Vec::new(env);
    for tokens in [333_i128, 500, 5_000, 50_000, 100_000] {
        thresholds.push_back(tokens * TOKEN_UNIT);
    }

    let mut lock_bonuses = Vec::new(env);
    for (days, bonus_bps) in [(30_u64, 0_u32), (90, 1_000), (180, 2_000), (360, 3_000)] {
        lock_bonuses.push_back(LockBonus {
            min_lock: days * DAY,
            bonus_bps,
        });
    }

    TierSettings {
        thresholds,
        tokens_per_ticket,
        lock_bonuses,
        penalty_free_tier: Tier::Fan,
    }
}

/// Highest tier whose threshold is covered by `stake`.
pub fn tier_for_stake(thresholds: &Vec<i128>, stake: i128) -> Tier {
    let mut ordinal = 0;
    for threshold in thresholds.iter() {
        if stake < threshold {
            break;
        }
        ordinal += 1;
    }
    Tier::from_ordinal(ordinal)
}

pub fn tickets_for_stake(
    tier: Tier,
    ticket_stake: i128,
    tokens_per_ticket: i128,
) -> Result<u64, ContractError> {
    if !tier.is_ticket_eligible() {
        return Err(ContractError::NotTicketEligible);
    }
    if tokens_per_ticket <= 0 || ticket_stake <= 0 {
        return Ok(0);
    }
    Ok((ticket_stake / tokens_per_ticket) as u64)
}

pub fn validate_thresholds(thresholds: &Vec<i128>) -> Result<(), ContractError> {
    if thresholds.len() != TIER_COUNT {
        return Err(ContractError::InvalidThresholds);
    }
    let mut previous = 0;
    for threshold in thresholds.iter() {
        if threshold <= previous {
            return Err(ContractError::InvalidThresholds);
        }
        previous = threshold;
    }
    Ok(())
}

/// Replace one tier's threshold. `Tier::None` has no threshold and is ignored.
pub fn set_required_stake(
    settings: &mut TierSettings,
    tier: Tier,
    amount: i128,
) -> Result<(), ContractError> {
    if tier == Tier::None {
        return Ok(());
    }
    let mut thresholds = settings.thresholds.clone();
    thresholds.set(tier as u32 - 1, amount);
    validate_thresholds(&thresholds)?;
    settings.thresholds = thresholds;
    Ok(())
}

pub fn validate_lock_bonuses(bonuses: &Vec<LockBonus>) -> Result<(), ContractError> {
    let mut previous: Option<u64> = None;
    for bonus in bonuses.iter() {
        if bonus.bonus_bps > MAX_BPS {
            return Err(ContractError::InvalidBps);
        }
        if previous.is_some_and(|lock| bonus.min_lock <= lock) {
            return Err(ContractError::InvalidThresholds);
        }
        previous = Some(bonus.min_lock);
    }
    Ok(())
}

pub fn bonus_for_lock(bonuses: &Vec<LockBonus>, lock: u64) -> u32 {
    bonuses
        .iter()
        .filter(|bonus| bonus.min_lock <= lock)
        .map(|bonus| bonus.bonus_bps)
        .max()
        .unwrap_or(0)
}

/// Recompute the profile's tier. Returns `(old, new)` when it moved.
pub fn reevaluate(profile: &mut StakerProfile, thresholds: &Vec<i128>) -> Option<(Tier, Tier)> {
    let tier = tier_for_stake(thresholds, profile.eligible_stake);
    if tier == profile.tier {
        return None;
    }
    let old = profile.tier;
    profile.tier = tier;
    Some((old, tier))
}
