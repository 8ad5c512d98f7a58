//! Block entity.
//!
//! `block_hash = H(header fields ∥ merkle_root)`; two blocks with equal hash
//! are byte-equal (enforced by constructing `block_hash` once, at creation,
//! from the rest of the struct — see `Block::new`).

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{Hash, Transaction};

/// Kind of payload a block carries.
///
/// `Vote` blocks (siever/lft only) carry zero transactions and exist solely
/// to piggyback a `prev_block_confirm` signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockType {
    General,
    PeerList,
    Vote,
}

/// A block proposal or confirmed block.
///
/// Genesis is height 0 with `prev_block_hash == [0u8; 32]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    block_hash: Hash,
    pub prev_block_hash: Hash,
    pub height: u64,
    pub timestamp: u64,
    pub merkle_root: Hash,
    pub confirmed_transaction_list: Vec<Transaction>,
    pub block_type: BlockType,
    /// Piggyback signal: "my predecessor is now confirmed" (siever/lft).
    pub prev_block_confirm: bool,
    /// Leader signature over `block_hash`, absent until signed.
    pub signature: Option<Vec<u8>>,
}

impl Block {
    /// Builds a block and derives its hash from the header fields and the
    /// merkle root. Callers must pass the merkle root of
    /// `confirmed_transaction_list` themselves (merkle computation is a
    /// pure function over the tx hashes, kept in `merkle_root` below so unit
    /// tests can construct blocks without recomputing it).
    pub fn new(
        prev_block_hash: Hash,
        height: u64,
        timestamp: u64,
        merkle_root: Hash,
        confirmed_transaction_list: Vec<Transaction>,
        block_type: BlockType,
        prev_block_confirm: bool,
    ) -> Self {
        let block_hash = Self::compute_hash(prev_block_hash, height, timestamp, &merkle_root);
        Self {
            block_hash,
            prev_block_hash,
            height,
            timestamp,
            merkle_root,
            confirmed_transaction_list,
            block_type,
            prev_block_confirm,
            signature: None,
        }
    }

    /// Genesis block: height 0, zero parent hash, no transactions.
    pub fn genesis(timestamp: u64) -> Self {
        Self::new(
            [0u8; 32],
            0,
            timestamp,
            merkle_root(&[]),
            Vec::new(),
            BlockType::General,
            false,
        )
    }

    pub fn block_hash(&self) -> Hash {
        self.block_hash
    }

    pub fn with_signature(mut self, signature: Vec<u8>) -> Self {
        self.signature = Some(signature);
        self
    }

    fn compute_hash(prev_block_hash: Hash, height: u64, timestamp: u64, merkle_root: &Hash) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update(prev_block_hash);
        hasher.update(height.to_le_bytes());
        hasher.update(timestamp.to_le_bytes());
        hasher.update(merkle_root);
        hasher.finalize().into()
    }
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.block_hash == other.block_hash
    }
}
impl Eq for Block {}

impl std::hash::Hash for Block {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.block_hash.hash(state);
    }
}

/// Computes the merkle root of an ordered transaction list by iterated
/// pairwise hashing (duplicate-last-leaf on odd levels).
pub fn merkle_root(txs: &[Transaction]) -> Hash {
    if txs.is_empty() {
        return [0u8; 32];
    }
    let mut level: Vec<Hash> = txs.iter().map(|tx| tx.tx_hash).collect();
    while level.len() > 1 {
        if level.len() % 2 == 1 {
            level.push(*level.last().unwrap());
        }
        level = level
            .chunks(2)
            .map(|pair| {
                let mut hasher = Sha256::new();
                hasher.update(pair[0]);
                hasher.update(pair[1]);
                hasher.finalize().into()
            })
            .collect();
    }
    level[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_hash_implies_byte_equal() {
        let a = Block::genesis(1000);
        let b = Block::genesis(1000);
        assert_eq!(a.block_hash(), b.block_hash());
        assert_eq!(a.height, b.height);
        assert_eq!(a.prev_block_hash, b.prev_block_hash);
    }

    #[test]
    fn merkle_root_empty_is_zero() {
        assert_eq!(merkle_root(&[]), [0u8; 32]);
    }

    #[test]
    fn merkle_root_odd_count_duplicates_last() {
        let txs = vec![
            Transaction::new(1, b"a".to_vec(), vec![]),
            Transaction::new(1, b"b".to_vec(), vec![]),
            Transaction::new(1, b"c".to_vec(), vec![]),
        ];
        // Should not panic on odd-length levels, and should be deterministic.
        let r1 = merkle_root(&txs);
        let r2 = merkle_root(&txs);
        assert_eq!(r1, r2);
    }

    #[test]
    fn different_height_different_hash() {
        let txs = vec![Transaction::new(1, b"a".to_vec(), vec![])];
        let root = merkle_root(&txs);
        let b1 = Block::new([0u8; 32], 1, 10, root, txs.clone(), BlockType::General, false);
        let b2 = Block::new([0u8; 32], 2, 10, root, txs, BlockType::General, false);
        assert_ne!(b1.block_hash(), b2.block_hash());
    }
}
