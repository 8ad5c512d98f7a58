//! Genesis block creation for a freshly opened, empty chain.

use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use chaincore_core::BlockChain;
use chaincore_types::Block;
use tracing::info;

/// Writes the genesis block if `chain` has no confirmed blocks yet.
/// Idempotent: does nothing on a chain that already has a tail.
pub fn ensure_genesis(chain: &mut BlockChain) -> Result<()> {
    if chain.last_height().is_some() {
        return Ok(());
    }
    let timestamp = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
    let genesis = Block::genesis(timestamp);
    info!(hash = %hex::encode(genesis.block_hash()), "writing genesis block");
    chain.add_block(genesis, &[])?;
    Ok(())
}
