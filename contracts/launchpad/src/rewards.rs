use crate::storage::{LedgerState, Pool, UserPosition};

/// Precision multiplier for accumulated reward per share (1e12).
pub const PRECISION: i128 = 1_000_000_000_000;

/// Bring the pool's accumulated reward per share up to `now`, capped at the
/// emission horizon. Must run before any read or write of a position's amount.
pub fn accrue(pool: &mut Pool, state: &LedgerState, now: u64) {
    let horizon = now.min(state.end_time);
    if horizon <= pool.last_accrual_time {
        return;
    }

    if pool.total_staked > 0
        && pool.alloc_points > 0
        && state.total_alloc_points > 0
        && state.reward_per_second > 0
    {
        let elapsed = (horizon - pool.last_accrual_time) as i128;
        let reward = elapsed * state.reward_per_second * pool.alloc_points as i128
            / state.total_alloc_points as i128;
        pool.acc_reward_per_share += reward * PRECISION / pool.total_staked;
    }

    pool.last_accrual_time = horizon;
}

/// View-only: the accumulator value at `now` without touching the stored pool.
/// Used for pending_reward queries.
pub fn simulate(pool: &Pool, state: &LedgerState, now: u64) -> i128 {
    let mut projected = pool.clone();
    accrue(&mut projected, state, now);
    projected.acc_reward_per_share
}

/// Reward owed to a position at the given accumulator value.
pub fn pending(position: &UserPosition, acc_reward_per_share: i128) -> i128 {
    reward_debt(position.amount, acc_reward_per_share) - position.reward_debt
}

pub fn reward_debt(amount: i128, acc_reward_per_share: i128) -> i128 {
    (amount * acc_reward_per_share) / PRECISION
}

/// Skip the idle gap after a lapsed horizon so re-funding never pays it out.
pub fn resume(pool: &mut Pool, now: u64) {
    if pool.last_accrual_time < now {
        pool.last_accrual_time = now;
    }
}
