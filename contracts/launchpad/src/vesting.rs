use soroban_sdk::{contracttype, Vec};

use crate::errors::ContractError;
use crate::storage::{VestingAccount, MAX_BPS};

/// Unlock points as parallel lists; percents are basis points summing to 100%.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VestingSchedule {
    pub unlock_times: Vec<u64>,
    pub percents_bps: Vec<u32>,
}

impl VestingSchedule {
    pub fn new(unlock_times: Vec<u64>, percents_bps: Vec<u32>) -> Result<Self, ContractError> {
        if unlock_times.len() != percents_bps.len() {
            return Err(ContractError::SizeMismatch);
        }
        if unlock_times.is_empty() {
            return Err(ContractError::EmptySchedule);
        }

        let mut sum: u32 = 0;
        for percent in percents_bps.iter() {
            sum = sum
                .checked_add(percent)
                .ok_or(ContractError::PercentSumInvalid)?;
        }
        if sum != MAX_BPS {
            return Err(ContractError::PercentSumInvalid);
        }

        Ok(VestingSchedule {
            unlock_times,
            percents_bps,
        })
    }

    /// Move every unlock point by `delta` seconds. Percents are untouched.
    pub fn shift(&mut self, delta: i64) {
        let mut shifted = Vec::new(self.unlock_times.env());
        for time in self.unlock_times.iter() {
            shifted.push_back(time.saturating_add_signed(delta));
        }
        self.unlock_times = shifted;
    }

    pub fn unlocked_bps(&self, now: u64) -> u32 {
        self.unlock_times
            .iter()
            .zip(self.percents_bps.iter())
            .filter(|(time, _)| *time <= now)
            .map(|(_, percent)| percent)
            .sum()
    }

    /// Amount `account` could take at `now` without mutating it.
    pub fn claimable(&self, account: &VestingAccount, now: u64) -> i128 {
        let unlocked = self.unlocked_bps(now) as i128;
        let vested = account.entitlement * unlocked / MAX_BPS as i128;
        (vested - account.claimed).max(0)
    }

    /// Advance the account to everything unlocked at `now`, returning the amount released.
    pub fn release(&self, account: &mut VestingAccount, now: u64) -> Result<i128, ContractError> {
        if account.entitlement > 0 && account.claimed >= account.entitlement {
            return Err(ContractError::FullyClaimed);
        }

        let due = self.claimable(account, now);
        if due <= 0 {
            return Err(ContractError::NothingToClaim);
        }

        account.claimed += due;
        account.claimed_bps = self.unlocked_bps(now);
        Ok(due)
    }
}
