use std::time::Instant;

/// `CONSENSUS_ALGORITHM = none`: single-node channels. Every proposal
/// self-confirms immediately; there is no vote collection or pacing timer.
pub struct NoneConsensus;

impl NoneConsensus {
    pub fn quorum_ok(&self, _yes: u32, _peer_count: u32) -> bool {
        true
    }

    pub fn is_propose_due(&mut self, _now: Instant, pending_tx: usize) -> bool {
        pending_tx > 0
    }
}
