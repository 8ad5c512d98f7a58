use std::time::{Duration, Instant};

use super::ConsensusConfig;

/// `CONSENSUS_ALGORITHM = siever`: majority quorum, plus zero-tx vote
/// blocks whose `prev_block_confirm` flag implicitly confirms the
/// predecessor once any successor carries it — no explicit
/// `AnnounceConfirmedBlock` round-trip is required for that case.
pub struct SieverConsensus {
    pacing: Duration,
    min_tx_threshold: usize,
    vote_block_interval: Duration,
    last_proposed: Option<Instant>,
    last_vote_block: Option<Instant>,
}

impl SieverConsensus {
    pub fn new(config: &ConsensusConfig) -> Self {
        Self {
            pacing: config.pacing,
            min_tx_threshold: config.min_tx_threshold,
            vote_block_interval: config.vote_block_interval,
            last_proposed: None,
            last_vote_block: None,
        }
    }

    pub fn quorum_ok(&self, yes: u32, peer_count: u32) -> bool {
        yes as u64 * 2 > peer_count as u64
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
