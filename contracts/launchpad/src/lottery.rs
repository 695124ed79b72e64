use soroban_sdk::{contracttype, log, Address, Bytes, BytesN, Env, Vec};

use crate::tiers::Tier;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakerLotteryInfo {
    pub user: Address,
    pub tickets: u64,
    pub tier: Tier,
    pub staked_at: u64,
    pub allocation_bonus_bps: u32,
}

/// Admitted users and their allocation bonuses, index-aligned.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LotteryResult {
    pub whitelist: Vec<Address>,
    pub allocation_bonuses: Vec<u32>,
}

/// Source of uniform draws for the lottery.
pub trait TicketDraw {
    /// Uniform value in `[0, upper)`. `upper` is never zero.
    fn draw(&mut self, upper: u64) -> u64;
}

/// The host's per-invocation PRNG.
pub struct LedgerPrng<'a> {
    env: &'a Env,
}

impl<'a> LedgerPrng<'a> {
    pub fn new(env: &'a Env) -> Self {
        LedgerPrng { env }
    }
}

impl TicketDraw for LedgerPrng<'_> {
    fn draw(&mut self, upper: u64) -> u64 {
        self.env.prng().gen_range::<u64>(0..upper)
    }
}

/// Hash chain over a seed revealed after registration closed.
pub struct RevealedSeed<'a> {
    env: &'a Env,
    seed: BytesN<32>,
    counter: u32,
}

impl<'a> RevealedSeed<'a> {
    pub fn new(env: &'a Env, seed: BytesN<32>) -> Self {
        RevealedSeed {
            env,
            seed,
            counter: 0,
        }
    }
}

impl TicketDraw for RevealedSeed<'_> {
    fn draw(&mut self, upper: u64) -> u64 {
        let mut data = Bytes::from_array(self.env, &self.seed.to_array());
        data.extend_from_array(&self.counter.to_be_bytes());
        self.counter += 1;

        let digest: BytesN<32> = self.env.crypto().sha256(&data).into();
        let mut word = [0u8; 16];
        word.copy_from_slice(&digest.to_array()[..16]);
        (u128::from_be_bytes(word) % upper as u128) as u64
    }
}

/// Hash a secret the admin commits to before a round's registration closes.
pub fn commitment(env: &Env, secret: &Bytes) -> BytesN<32> {
    env.crypto().sha256(secret).into()
}

/// Mix the revealed secret with ledger entropy so neither side alone fixes the seed.
pub fn mix_seed(env: &Env, secret: &Bytes) -> BytesN<32> {
    let mut data = secret.clone();
    for _ in 0..4 {
        data.extend_from_array(&env.prng().gen::<u64>().to_be_bytes());
    }
    env.crypto().sha256(&data).into()
}

/// Select up to `target_count` users of `required_tier`.
///
/// Candidates of another tier and repeated users are dropped with a log line.
/// Auto-whitelisted tiers admit every remaining candidate. Lottery tiers draw
/// without replacement, each draw weighted by the tickets still in play; the
/// earliest candidate wins a shared boundary and zero-ticket candidates are
/// never drawn.
pub fn select<D: TicketDraw>(
    env: &Env,
    required_tier: Tier,
    target_count: u32,
    candidates: &Vec<StakerLotteryInfo>,
    draw: &mut D,
) -> LotteryResult {
    let mut remaining: Vec<StakerLotteryInfo> = Vec::new(env);
    for candidate in candidates.iter() {
        if candidate.tier != required_tier {
            log!(env, "lottery: tier mismatch", candidate.user, candidate.tier);
            continue;
        }
        if remaining.iter().any(|kept| kept.user == candidate.user) {
            log!(env, "lottery: duplicate candidate", candidate.user);
            continue;
        }
        remaining.push_back(candidate);
    }

    let mut whitelist = Vec::new(env);
    let mut allocation_bonuses = Vec::new(env);

    if required_tier.is_auto_whitelisted() {
        for candidate in remaining.iter() {
            whitelist.push_back(candidate.user);
            allocation_bonuses.push_back(candidate.allocation_bonus_bps);
        }
    } else if required_tier.is_ticket_eligible() {
        while whitelist.len() < target_count && !remaining.is_empty() {
            let total: u64 = remaining.iter().map(|c| c.tickets).sum();
            if total == 0 {
                break;
            }

            let target = draw.draw(total) + 1;
            let mut cumulative = 0;
            let mut chosen = remaining.len() - 1;
            for (index, candidate) in remaining.iter().enumerate() {
                cumulative += candidate.tickets;
                if cumulative >= target {
                    chosen = index as u32;
                    break;
                }
            }

            if let Some(winner) = remaining.get(chosen) {
                whitelist.push_back(winner.user);
                allocation_bonuses.push_back(winner.allocation_bonus_bps);
            }
            remaining.remove(chosen);
        }
    }

    LotteryResult {
        whitelist,
        allocation_bonuses,
    }
}
