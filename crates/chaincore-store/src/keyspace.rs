//! Key-builder helpers for the flat key-value keyspace.
//!
//! Prefixes mirror the reserved-key scheme used to keep blocks, indices, and
//! node identity in one column family without collisions:
//!
//! - `B:<block_hash>`    -> encoded `Block`
//! - `H:<height>`        -> `block_hash` at that height
//! - `T:<tx_hash>`       -> `block_hash` of the block that confirmed it
//! - `I:<tx_hash>`       -> encoded `InvokeResult`
//! - `M:peer_id`         -> this node's `PeerId`, written at most once
//! - `M:last_height`     -> highest confirmed height

use chaincore_types::Hash;

const BLOCK_PREFIX: u8 = b'B';
const HEIGHT_PREFIX: u8 = b'H';
const TX_PREFIX: u8 = b'T';
const INVOKE_PREFIX: u8 = b'I';
const META_PREFIX: u8 = b'M';

pub const META_PEER_ID: &[u8] = b"peer_id";
pub const META_LAST_HEIGHT: &[u8] = b"last_height";

pub fn block_key(hash: &Hash) -> Vec<u8> {
    prefixed(BLOCK_PREFIX, hash)
}

pub fn height_key(height: u64) -> Vec<u8> {
    prefixed(HEIGHT_PREFIX, &height.to_be_bytes())
}

pub fn tx_key(tx_hash: &Hash) -> Vec<u8> {
    prefixed(TX_PREFIX, tx_hash)
}

pub fn invoke_key(tx_hash: &Hash) -> Vec<u8> {
    prefixed(INVOKE_PREFIX, tx_hash)
}

pub fn meta_key(name: &[u8]) -> Vec<u8> {
    prefixed(META_PREFIX, name)
}

fn prefixed(prefix: u8, suffix: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + suffix.len());
    key.push(prefix);
    key.extend_from_slice(suffix);
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn height_keys_sort_in_height_order() {
        let a = height_key(1);
        let b = height_key(2);
        let c = height_key(256);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn distinct_families_never_collide() {
        let hash = [7u8; 32];
        assert_ne!(block_key(&hash), tx_key(&hash));
        assert_ne!(tx_key(&hash), invoke_key(&hash));
    }
}
