use async_trait::async_trait;
use chaincore_core::ports::PeerRegistry;
use std::sync::atomic::{AtomicU32, Ordering};

/// Stands in for peer discovery/membership: a fixed peer count set at
/// construction, mutable only for tests.
pub struct StaticPeerRegistry {
    count: AtomicU32,
}

impl StaticPeerRegistry {
    pub fn new(count: u32) -> Self {
        Self {
            count: AtomicU32::new(count),
        }
    }

    pub fn set_count(&self, count: u32) {
        self.count.store(count, Ordering::SeqCst);
    }
}

#[async_trait]
impl PeerRegistry for StaticPeerRegistry {
    async fn peer_count(&self) -> u32 {
        self.count.load(Ordering::SeqCst)
    }
}
