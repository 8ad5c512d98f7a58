use async_trait::async_trait;
use chaincore_core::ports::Broadcaster;
use chaincore_types::Hash;
use tracing::info;

use chaincore_core::events::{AnnounceConfirmedBlock, AnnounceUnconfirmedBlock, GetStatus};

/// Stands in for the P2P transport: logs what would have gone out over the
/// wire instead of actually sending it anywhere.
pub struct LoggingBroadcaster {
    node: String,
}

impl LoggingBroadcaster {
    pub fn new(node: impl Into<String>) -> Self {
        Self { node: node.into() }
    }
}

#[async_trait]
impl Broadcaster for LoggingBroadcaster {
    async fn get_status(&self, msg: GetStatus) {
        info!(node = %self.node, request = %msg.request, "broadcast: get_status");
    }

    async fn announce_unconfirmed_block(&self, msg: AnnounceUnconfirmedBlock) {
        info!(node = %self.node, channel = %msg.channel, bytes = msg.block.len(), "broadcast: announce_unconfirmed_block");
    }

    async fn announce_confirmed_block(&self, msg: AnnounceConfirmedBlock) {
        info!(
            node = %self.node,
            channel = %msg.channel,
            hash = %hex::encode(msg.block_hash),
            included_body = msg.block.is_some(),
            "broadcast: announce_confirmed_block"
        );
    }

    async fn vote_unconfirmed_block(&self, block_hash: Hash, validated: bool, channel: &str) {
        info!(node = %self.node, channel, hash = %hex::encode(block_hash), validated, "vote: vote_unconfirmed_block");
    }
}
