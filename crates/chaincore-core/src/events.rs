//! Broadcast/vote RPC payloads. Names and field order are part of the wire
//! contract other nodes rely on — don't reorder fields.

use chaincore_types::Hash;

#[derive(Debug, Clone)]
pub struct GetStatus {
    pub request: String,
}

#[derive(Debug, Clone)]
pub struct AnnounceUnconfirmedBlock {
    pub block: Vec<u8>,
    pub channel: String,
}

#[derive(Debug, Clone)]
pub struct AnnounceConfirmedBlock {
    pub block_hash: Hash,
    pub channel: String,
    /// Omitted when peers are expected to already hold the block.
    pub block: Option<Vec<u8>>,
}
