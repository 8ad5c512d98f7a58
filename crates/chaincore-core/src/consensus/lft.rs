use std::time::{Duration, Instant};

use super::ConsensusConfig;

/// `CONSENSUS_ALGORITHM = lft`: 2/3 of registered peers, vote blocks, and a
/// per-vote timer armed by peers that cancels on piggybacked confirmation
/// (see `BlockManager::handle_timer_expiry`).
pub struct LftConsensus {
    pacing: Duration,
    min_tx_threshold: usize,
    vote_block_interval: Duration,
    pub per_vote_timeout: Duration,
    last_proposed: Option<Instant>,
    last_vote_block: Option<Instant>,
}

impl LftConsensus {
    pub fn new(config: &ConsensusConfig) -> Self {
        Self {
            pacing: config.pacing,
            min_tx_threshold: config.min_tx_threshold,
            vote_block_interval: config.vote_block_interval,
            per_vote_timeout: config.per_vote_timeout,
            last_proposed: None,
            last_vote_block: None,
        }
    }

    pub fn quorum_ok(&self, yes: u32, peer_count: u32) -> bool {
        yes as u64 * 3 >= peer_count as u64 * 2
    }

    pub fn is_propose_due(&mut self, now: Instant, pending_tx: usize) -> bool {
        if pending_tx < self.min_tx_threshold {
            return false;
        }
        match self.last_proposed {
            None => true,
            Some(last) => now.duration_since(last) >= self.pacing,
        }
    }

    pub fn is_vote_block_due(&mut self, now: Instant) -> bool {
        let due = match self.last_vote_block {
            None => true,
            Some(last) => now.duration_since(last) >= self.vote_block_interval,
        };
        if due {
            self.last_vote_block = Some(now);
        }
        due
    }

    pub fn record_proposed(&mut self, now: Instant) {
        self.last_proposed = Some(now);
    }
}
