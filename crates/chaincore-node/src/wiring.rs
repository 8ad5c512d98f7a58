//! Demonstration wiring: constructs a `BlockManager` over the mock
//! adapters in [`crate::adapters`] so the core is runnable end to end.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use chaincore_core::{BlockChain, BlockManager, BlockManagerHandle, Consensus, ManagerTuning};
use chaincore_store::ChainStore;
use chaincore_types::{PeerId, Role};
use tokio::task::JoinHandle;
use tracing::info;

use crate::adapters::{EchoExecutor, LoggingBroadcaster, LoggingHeightSync, MockAuthority, StaticPeerRegistry, TokioTimerService};
use crate::config::NodeConfig;
use crate::genesis;

pub struct RunningNode {
    pub handle: BlockManagerHandle,
    pub task: JoinHandle<anyhow::Result<()>>,
}

/// Opens the store, resolves this node's peer id, rebuilds the chain,
/// ensures genesis exists, and spawns the `BlockManager` worker task.
pub async fn spawn(config: &NodeConfig, role: Role) -> Result<RunningNode> {
    let store = ChainStore::open(&config.store.path, config.store.max_retry_create_db)?;

    let peer_id = resolve_peer_id(&store, config)?;

    let mut chain = BlockChain::rebuild(store)?;
    genesis::ensure_genesis(&mut chain)?;

    let consensus = Consensus::new(&config.consensus.to_core_config(&config.timer));

    let broadcaster = Arc::new(LoggingBroadcaster::new(config.channel.name.clone()));
    let peers = Arc::new(StaticPeerRegistry::new(1));
    let authority = Arc::new(MockAuthority);
    let executor = Arc::new(EchoExecutor);
    let timers = Arc::new(TokioTimerService::new());
    let height_sync = Arc::new(LoggingHeightSync::new(config.channel.name.clone()));

    let tuning = ManagerTuning {
        max_tx_per_block: config.timer.max_tx_per_block,
        sleep_interval: Duration::from_millis(config.timer.sleep_interval_ms),
    };

    let (manager, handle) = BlockManager::new(
        config.channel.name.clone(),
        peer_id,
        role,
        consensus,
        chain,
        broadcaster,
        peers,
        authority,
        executor,
        timers,
        height_sync,
        tuning,
    );

    let task = tokio::spawn(async move { manager.run().await.map_err(anyhow::Error::from) });

    info!(channel = %config.channel.name, %peer_id, "node wired and running");
    Ok(RunningNode { handle, task })
}

/// Mirrors `__make_peer_id`: only the default channel may mint a fresh
/// peer id. Any other channel must find one already persisted, or this is
/// a misconfigured deployment.
fn resolve_peer_id(store: &ChainStore, config: &NodeConfig) -> Result<PeerId> {
    if let Some(existing) = store.read_peer_id()? {
        return Ok(existing);
    }
    if config.channel.name != config.channel.default_channel {
        bail!(
            "channel '{}' has no persisted peer id and is not the default channel '{}'",
            config.channel.name,
            config.channel.default_channel
        );
    }
    Ok(store.write_peer_id_if_absent(PeerId::new())?)
}
