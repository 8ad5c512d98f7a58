//! Consensus strategy plug-in.
//!
//! The four variants share a narrow contract (quorum rule, pacing, and
//! whether zero-transaction "vote blocks" are legal) and are dispatched
//! through a tagged enum rather than a trait-object class hierarchy — the
//! quorum policy is a pure function of `(yes, peer_count)` and is testable
//! in isolation from the manager loop that drives it.

mod default;
mod lft;
mod none;
mod siever;

pub use default::DefaultConsensus;
pub use lft::LftConsensus;
pub use none::NoneConsensus;
pub use siever::SieverConsensus;

use std::time::{Duration, Instant};

/// `CONSENSUS_ALGORITHM` selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    None,
    Default,
    Siever,
    Lft,
}

#[derive(Debug, Clone)]
pub struct ConsensusConfig {
    pub algorithm: Algorithm,
    /// Minimum pause between proposals when the leader is otherwise idle.
    pub pacing: Duration,
    /// Minimum pending transactions before a block is proposed early.
    pub min_tx_threshold: usize,
    /// siever/lft: interval at which a vote block is emitted if no ordinary
    /// proposal was due.
    pub vote_block_interval: Duration,
    /// lft only: how long a peer waits for piggybacked confirmation before
    /// its per-vote timer expires.
    pub per_vote_timeout: Duration,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Default,
            pacing: Duration::from_millis(500),
            min_tx_threshold: 1,
            vote_block_interval: Duration::from_secs(2),
            per_vote_timeout: Duration::from_secs(2),
        }
    }
}

pub enum Consensus {
    None(NoneConsensus),
    Default(DefaultConsensus),
    Siever(SieverConsensus),
    Lft(LftConsensus),
}

impl Consensus {
    pub fn new(config: &ConsensusConfig) -> Self {
        match config.algorithm {
            Algorithm::None => Consensus::None(NoneConsensus),
            Algorithm::Default => Consensus::Default(DefaultConsensus::new(config)),
            Algorithm::Siever => Consensus::Siever(SieverConsensus::new(config)),
            Algorithm::Lft => Consensus::Lft(LftConsensus::new(config)),
        }
    }

    pub fn quorum_ok(&self, yes: u32, peer_count: u32) -> bool {
        match self {
            Consensus::None(c) => c.quorum_ok(yes, peer_count),
            Consensus::Default(c) => c.quorum_ok(yes, peer_count),
            Consensus::Siever(c) => c.quorum_ok(yes, peer_count),
            Consensus::Lft(c) => c.quorum_ok(yes, peer_count),
        }
    }

    pub fn supports_vote_blocks(&self) -> bool {
        matches!(self, Consensus::Siever(_) | Consensus::Lft(_))
    }

    pub fn arms_per_vote_timer(&self) -> bool {
        matches!(self, Consensus::Lft(_))
    }

    /// Whether a proposal should be built this tick, given how long it's
    /// been since the last one and how many transactions are waiting.
    pub fn is_propose_due(&mut self, now: Instant, pending_tx: usize) -> bool {
        match self {
            Consensus::None(c) => c.is_propose_due(now, pending_tx),
            Consensus::Default(c) => c.is_propose_due(now, pending_tx),
            Consensus::Siever(c) => c.is_propose_due(now, pending_tx),
            Consensus::Lft(c) => c.is_propose_due(now, pending_tx),
        }
    }

    /// Whether a zero-tx vote block piggybacking `prev_block_confirm` is
    /// due, for strategies that support them.
    pub fn is_vote_block_due(&mut self, now: Instant) -> bool {
        match self {
            Consensus::Siever(c) => c.is_vote_block_due(now),
            Consensus::Lft(c) => c.is_vote_block_due(now),
            _ => false,
        }
    }

    pub fn record_proposed(&mut self, now: Instant) {
        match self {
            Consensus::None(_) => {}
            Consensus::Default(c) => c.record_proposed(now),
            Consensus::Siever(c) => c.record_proposed(now),
            Consensus::Lft(c) => c.record_proposed(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_always_reaches_quorum() {
        let c = Consensus::new(&ConsensusConfig {
            algorithm: Algorithm::None,
            ..Default::default()
        });
        assert!(c.quorum_ok(0, 10));
        assert!(!c.supports_vote_blocks());
    }

    #[test]
    fn default_requires_strict_majority() {
        let c = Consensus::new(&ConsensusConfig {
            algorithm: Algorithm::Default,
            ..Default::default()
        });
        assert!(!c.quorum_ok(2, 5));
        assert!(c.quorum_ok(3, 5));
    }

    #[test]
    fn lft_requires_two_thirds() {
        let c = Consensus::new(&ConsensusConfig {
            algorithm: Algorithm::Lft,
            ..Default::default()
        });
        assert!(!c.quorum_ok(5, 9));
        assert!(c.quorum_ok(6, 9));
        assert!(c.supports_vote_blocks());
        assert!(c.arms_per_vote_timer());
    }

    #[test]
    fn siever_supports_vote_blocks_without_per_vote_timers() {
        let c = Consensus::new(&ConsensusConfig {
            algorithm: Algorithm::Siever,
            ..Default::default()
        });
        assert!(c.supports_vote_blocks());
        assert!(!c.arms_per_vote_timer());
    }
}
