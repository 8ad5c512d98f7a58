//! Collaborator contracts. The manager depends only on these traits;
//! concrete adapters (P2P transport, peer membership, signing, the
//! on-chain executor, a timer runtime) are injected at construction —
//! there is no process-wide service locator.

use std::time::Duration;

use async_trait::async_trait;
use chaincore_types::{Block, Hash, InvokeResult, Transaction};
use tokio::sync::mpsc;

use crate::events::{AnnounceConfirmedBlock, AnnounceUnconfirmedBlock, GetStatus};

/// Delivers named messages to every peer in the channel.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    async fn get_status(&self, msg: GetStatus);
    async fn announce_unconfirmed_block(&self, msg: AnnounceUnconfirmedBlock);
    async fn announce_confirmed_block(&self, msg: AnnounceConfirmedBlock);
    async fn vote_unconfirmed_block(&self, block_hash: Hash, validated: bool, channel: &str);
}

/// Queried for the channel's peer count, used by quorum arithmetic.
#[async_trait]
pub trait PeerRegistry: Send + Sync {
    async fn peer_count(&self) -> u32;
}

/// Signs and verifies payloads. The manager never touches key material
/// directly.
pub trait Authority: Send + Sync {
    fn verify_transaction(&self, tx: &Transaction) -> bool;
    fn verify_block(&self, block: &Block) -> bool;
}

/// The opaque on-chain application. The manager stores whatever this
/// produces without interpreting it.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn invoke(&self, block: &Block) -> Vec<InvokeResult>;
    async fn accepts(&self, block: &Block) -> bool;
}

/// Per-hash timers. `start` hands the adapter a sender the core's run loop
/// listens on; when the timer fires (and hasn't been stopped), the adapter
/// pushes the key that expired.
pub trait TimerService: Send + Sync {
    fn start(&self, key: Hash, timeout: Duration, on_expiry: mpsc::UnboundedSender<Hash>);
    fn stop(&self, key: Hash);
}

/// Bulk fetch-and-apply recovery when local height lags a peer's. Out of
/// scope for this crate; the manager only calls `trigger` and moves on.
pub trait HeightSync: Send + Sync {
    fn trigger(&self);
}
