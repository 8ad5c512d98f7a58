use std::time::{Duration, Instant};

use super::ConsensusConfig;

/// `CONSENSUS_ALGORITHM = default`: majority of registered peers, paced by
/// a single timer, no vote blocks.
pub struct DefaultConsensus {
    pacing: Duration,
    min_tx_threshold: usize,
    last_proposed: Option<Instant>,
}

impl DefaultConsensus {
    pub fn new(config: &ConsensusConfig) -> Self {
        Self {
            pacing: config.pacing,
            min_tx_threshold: config.min_tx_threshold,
            last_proposed: None,
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

    pub fn record_proposed(&mut self, now: Instant) {
        self.last_proposed = Some(now);
    }
}
