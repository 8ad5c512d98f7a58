//! `CandidateBlocks`: per-hash registry of proposals awaiting quorum.
//!
//! Pure bookkeeping — quorum policy lives in [`crate::consensus`]. Shared
//! between the worker task and the vote-reception path behind a
//! `parking_lot::RwLock` (see [`crate::manager`]).

use std::collections::HashMap;

use chaincore_types::{Block, Hash, InvokeResult, PeerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    Yes,
    No,
}

pub struct CandidateBlock {
    pub block: Block,
    /// Invoke results computed when the block was proposed, carried through
    /// to `ChainStore::put_block` at confirmation time.
    pub invoke_results: Vec<InvokeResult>,
    votes: HashMap<PeerId, Vote>,
}

impl CandidateBlock {
    fn new(block: Block, invoke_results: Vec<InvokeResult>) -> Self {
        Self {
            block,
            invoke_results,
            votes: HashMap::new(),
        }
    }
}

#[derive(Default)]
pub struct CandidateBlocks {
    blocks: HashMap<Hash, CandidateBlock>,
}

impl CandidateBlocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent insert by hash. A second registration of the same block
    /// is a no-op; its votes and invoke results are preserved.
    pub fn register(&mut self, block: Block) {
        self.register_with_results(block, Vec::new());
    }

    pub fn register_with_results(&mut self, block: Block, invoke_results: Vec<InvokeResult>) {
        self.blocks
            .entry(block.block_hash())
            .or_insert_with(|| CandidateBlock::new(block, invoke_results));
    }

    /// Records a vote. Idempotent per peer — the last vote for a given
    /// `(block_hash, peer)` pair wins. Returns `false` if the block isn't
    /// registered.
    pub fn vote(&mut self, block_hash: Hash, peer: PeerId, vote: Vote) -> bool {
        match self.blocks.get_mut(&block_hash) {
            Some(candidate) => {
                candidate.votes.insert(peer, vote);
                true
            }
            None => false,
        }
    }

    /// `(yes, no, total)` tally, or `None` if the block isn't registered.
    pub fn tally(&self, block_hash: &Hash) -> Option<(u32, u32, u32)> {
        let candidate = self.blocks.get(block_hash)?;
        let yes = candidate.votes.values().filter(|v| **v == Vote::Yes).count() as u32;
        let no = candidate.votes.values().filter(|v| **v == Vote::No).count() as u32;
        Some((yes, no, candidate.votes.len() as u32))
    }

    pub fn get(&self, block_hash: &Hash) -> Option<&CandidateBlock> {
        self.blocks.get(block_hash)
    }

    pub fn remove(&mut self, block_hash: &Hash) -> Option<CandidateBlock> {
        self.blocks.remove(block_hash)
    }

    /// Evicts every candidate at or below `height` — superseded once that
    /// height has a confirmed block.
    pub fn evict_below(&mut self, height: u64) {
        self.blocks.retain(|_, candidate| candidate.block.height > height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chaincore_types::Block;

    #[test]
    fn register_is_idempotent() {
        let mut candidates = CandidateBlocks::new();
        let block = Block::genesis(1);
        candidates.register(block.clone());
        candidates.register(block.clone());
        assert_eq!(candidates.tally(&block.block_hash()), Some((0, 0, 0)));
    }

    #[test]
    fn voting_twice_with_same_peer_overwrites_not_duplicates() {
        let mut candidates = CandidateBlocks::new();
        let block = Block::genesis(1);
        candidates.register(block.clone());
        let peer = PeerId::new();

        assert!(candidates.vote(block.block_hash(), peer, Vote::Yes));
        assert_eq!(candidates.tally(&block.block_hash()), Some((1, 0, 1)));

        assert!(candidates.vote(block.block_hash(), peer, Vote::No));
        assert_eq!(candidates.tally(&block.block_hash()), Some((0, 1, 1)));
    }

    #[test]
    fn vote_on_unregistered_block_is_rejected() {
        let mut candidates = CandidateBlocks::new();
        assert!(!candidates.vote([1u8; 32], PeerId::new(), Vote::Yes));
    }

    #[test]
    fn evict_below_drops_superseded_heights() {
        let mut candidates = CandidateBlocks::new();
        let low = Block::new([0u8; 32], 1, 1, [0u8; 32], vec![], chaincore_types::BlockType::General, false);
        let high = Block::new([0u8; 32], 5, 1, [0u8; 32], vec![], chaincore_types::BlockType::General, false);
        candidates.register(low.clone());
        candidates.register(high.clone());

        candidates.evict_below(3);
        assert!(candidates.get(&low.block_hash()).is_none());
        assert!(candidates.get(&high.block_hash()).is_some());
    }
}
