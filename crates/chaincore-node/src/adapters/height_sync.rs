use chaincore_core::ports::HeightSync;
use tracing::warn;

/// Stands in for the bulk fetch-and-apply recovery path: logs that a sync
/// would have been requested. A real implementation asks a peer for the
/// missing range and re-applies it through `BlockChain::add_block`.
pub struct LoggingHeightSync {
    node: String,
}

impl LoggingHeightSync {
    pub fn new(node: impl Into<String>) -> Self {
        Self { node: node.into() }
    }
}

impl HeightSync for LoggingHeightSync {
    fn trigger(&self) {
        warn!(node = %self.node, "height sync requested (demonstration adapter takes no action)");
    }
}
