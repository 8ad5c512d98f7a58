//! Node configuration: a plain struct of per-area sub-structs, each with a
//! sensible `Default`, loaded here rather than through a process-wide
//! config singleton (the core crates never reach for one).

use std::time::Duration;

use chaincore_core::Algorithm;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    pub channel: ChannelConfig,
    pub store: StoreConfig,
    pub consensus: ConsensusConfig,
    pub timer: TimerConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            channel: ChannelConfig::default(),
            store: StoreConfig::default(),
            consensus: ConsensusConfig::default(),
            timer: TimerConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// `LOOPCHAIN_DEFAULT_CHANNEL` — only the default channel is allowed to
    /// mint a fresh peer id; any other channel must find one already
    /// persisted.
    pub name: String,
    pub default_channel: String,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            default_channel: "default".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub path: String,
    /// `MAX_RETRY_CREATE_DB`.
    pub max_retry_create_db: u32,
    pub sync_writes: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "./data/chainstore".to_string(),
            max_retry_create_db: 3,
            sync_writes: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusConfig {
    pub algorithm: AlgorithmConfig,
    pub pacing_ms: u64,
    pub min_tx_threshold: usize,
    pub vote_block_interval_ms: u64,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            algorithm: AlgorithmConfig::Default,
            pacing_ms: 500,
            min_tx_threshold: 1,
            vote_block_interval_ms: 2_000,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum AlgorithmConfig {
    None,
    Default,
    Siever,
    Lft,
}

impl From<AlgorithmConfig> for Algorithm {
    fn from(value: AlgorithmConfig) -> Self {
        match value {
            AlgorithmConfig::None => Algorithm::None,
            AlgorithmConfig::Default => Algorithm::Default,
            AlgorithmConfig::Siever => Algorithm::Siever,
            AlgorithmConfig::Lft => Algorithm::Lft,
        }
    }
}

impl ConsensusConfig {
    pub fn to_core_config(&self, timer: &TimerConfig) -> chaincore_core::ConsensusConfig {
        chaincore_core::ConsensusConfig {
            algorithm: self.algorithm.into(),
            pacing: Duration::from_millis(self.pacing_ms),
            min_tx_threshold: self.min_tx_threshold,
            vote_block_interval: Duration::from_millis(self.vote_block_interval_ms),
            per_vote_timeout: Duration::from_millis(timer.peer_vote_timeout_ms),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    /// `SLEEP_SECONDS_IN_SERVICE_LOOP`, expressed in milliseconds here.
    pub sleep_interval_ms: u64,
    /// `TIMEOUT_FOR_PEER_VOTE`, expressed in milliseconds here.
    pub peer_vote_timeout_ms: u64,
    pub max_tx_per_block: usize,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            sleep_interval_ms: 100,
            peer_vote_timeout_ms: 2_000,
            max_tx_per_block: 1_000,
        }
    }
}
