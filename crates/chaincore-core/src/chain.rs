//! In-memory chain head plus unconfirmed staging, backed by a `ChainStore`.

use chaincore_types::{Block, Hash, InvokeResult};
use chaincore_store::ChainStore;
use tracing::{info, warn};

use crate::errors::{ChainError, ChainResult};

/// Outcome of staging a proposed block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    /// Parent matches the current tail and height is contiguous.
    Staged,
    /// Height is not `last_height + 1`.
    HeightMismatch,
    /// Height is correct but `prev_block_hash` doesn't match the tail hash.
    HashMismatch,
}

impl StageOutcome {
    pub fn reason(&self) -> &'static str {
        match self {
            StageOutcome::Staged => "ok",
            StageOutcome::HeightMismatch => "block_height",
            StageOutcome::HashMismatch => "hash",
        }
    }
}

/// Wraps a [`ChainStore`] with the chain-head bookkeeping the manager loop
/// and consensus strategies need on every tick: the confirmed tail, the
/// currently staged (unconfirmed) proposal, the running transaction count,
/// and the made-block counter used by leader-rotation heuristics external
/// to this crate.
pub struct BlockChain {
    store: ChainStore,
    genesis_hash: Option<Hash>,
    tail: Option<Block>,
    unconfirmed: Option<Block>,
    total_tx: u64,
    made_block_count: u64,
}

impl BlockChain {
    /// Walks `H:0..=H:last_height` and re-hydrates `genesis_hash`, `tail`,
    /// and `total_tx`. Fails with [`ChainError::Corrupt`] if a height is
    /// missing or a stored block's parent hash disagrees with the previous
    /// height's hash.
    pub fn rebuild(store: ChainStore) -> ChainResult<Self> {
        let mut chain = Self {
            store,
            genesis_hash: None,
            tail: None,
            unconfirmed: None,
            total_tx: 0,
            made_block_count: 0,
        };

        let Some(last_height) = chain.store.get_last_height()? else {
            return Ok(chain);
        };

        let mut prev_hash: Option<Hash> = None;
        for height in 0..=last_height {
            let hash = chain
                .store
                .get_block_hash_at_height(height)?
                .ok_or_else(|| ChainError::Corrupt(format!("missing height index at {height}")))?;
            let block = chain
                .store
                .get_block(&hash)?
                .ok_or_else(|| ChainError::Corrupt(format!("missing block body for height {height}")))?;

            if let Some(expected_prev) = prev_hash {
                if block.prev_block_hash != expected_prev {
                    return Err(ChainError::Corrupt(format!(
                        "block at height {height} has parent hash mismatch"
                    )));
                }
            }

            chain.total_tx += block.confirmed_transaction_list.len() as u64;
            prev_hash = Some(block.block_hash());
            if height == 0 {
                chain.genesis_hash = Some(block.block_hash());
            }
            if height == last_height {
                chain.tail = Some(block);
            }
        }

        info!(last_height, total_tx = chain.total_tx, "chain rebuilt from store");
        Ok(chain)
    }

    pub fn total_tx_count(&self) -> u64 {
        self.total_tx
    }

    pub fn made_block_count(&self) -> u64 {
        self.made_block_count
    }

    pub fn increase_made_block_count(&mut self) {
        self.made_block_count += 1;
    }

    pub fn last_height(&self) -> Option<u64> {
        self.tail.as_ref().map(|b| b.height)
    }

    pub fn tail_hash(&self) -> Option<Hash> {
        self.tail.as_ref().map(|b| b.block_hash())
    }

    pub fn tail(&self) -> Option<&Block> {
        self.tail.as_ref()
    }

    /// Appends an already-confirmed block. Requires `block.height ==
    /// last_height + 1` and `block.prev_block_hash == tail.hash` (or, for
    /// the first block, `prev_block_hash == [0u8; 32]`).
    pub fn add_block(&mut self, block: Block, invoke_results: &[InvokeResult]) -> ChainResult<()> {
        let expected_height = self.last_height().map_or(0, |h| h + 1);
        let expected_parent = self.tail_hash().unwrap_or([0u8; 32]);
        if block.height != expected_height || block.prev_block_hash != expected_parent {
            return Err(ChainError::Diverged(format!(
                "add_block height={} parent={:02x?} does not extend tail height={:?}",
                block.height, block.prev_block_hash, self.last_height()
            )));
        }

        self.store.put_block(&block, invoke_results)?;
        self.total_tx += block.confirmed_transaction_list.len() as u64;
        if block.height == 0 {
            self.genesis_hash = Some(block.block_hash());
        }
        self.tail = Some(block);
        Ok(())
    }

    /// Stages a proposal. Replaces any prior unconfirmed block on success.
    pub fn add_unconfirm_block(&mut self, block: Block) -> StageOutcome {
        let expected_height = self.last_height().map_or(0, |h| h + 1);
        if block.height != expected_height {
            return StageOutcome::HeightMismatch;
        }
        let expected_parent = self.tail_hash().unwrap_or([0u8; 32]);
        if block.prev_block_hash != expected_parent {
            return StageOutcome::HashMismatch;
        }
        self.unconfirmed = Some(block);
        StageOutcome::Staged
    }

    pub fn staged(&self) -> Option<&Block> {
        self.unconfirmed.as_ref()
    }

    /// Promotes the staged unconfirmed block whose hash matches
    /// `block_hash` to confirmed, persisting it (and any invoke results
    /// produced while it was a proposal) atomically. Returns the number of
    /// transactions the newly confirmed block added.
    pub fn confirm_block(&mut self, block_hash: Hash, invoke_results: &[InvokeResult]) -> ChainResult<u64> {
        match self.unconfirmed.take() {
            Some(block) if block.block_hash() == block_hash => {
                let added = block.confirmed_transaction_list.len() as u64;
                self.add_block(block, invoke_results)?;
                Ok(added)
            }
            other => {
                self.unconfirmed = other;
                warn!(hash = %hex::encode(block_hash), "confirm_block: no staged block matches");
                Err(ChainError::UnconfirmedNotFound(block_hash))
            }
        }
    }

    pub fn find_tx_by_key(&self, tx_hash: &Hash) -> ChainResult<Option<Hash>> {
        Ok(self.store.find_tx_block_hash(tx_hash)?)
    }

    pub fn find_invoke_result_by_tx_hash(&self, tx_hash: &Hash) -> ChainResult<Option<InvokeResult>> {
        Ok(self.store.find_invoke_result(tx_hash)?)
    }

    pub fn get_block(&self, hash: &Hash) -> ChainResult<Option<Block>> {
        Ok(self.store.get_block(hash)?)
    }

    /// Wipes every persisted key and resets in-memory state to genesis-less.
    pub fn clear_all_blocks(&mut self) -> ChainResult<()> {
        self.store.clear_all()?;
        self.genesis_hash = None;
        self.tail = None;
        self.unconfirmed = None;
        self.total_tx = 0;
        self.made_block_count = 0;
        Ok(())
    }

    pub fn store(&self) -> &ChainStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chaincore_types::{BlockType, Transaction};
    use tempfile::TempDir;

    fn fresh_chain() -> (TempDir, BlockChain) {
        let dir = TempDir::new().unwrap();
        let store = ChainStore::open_with_sync(dir.path(), 1, false).unwrap();
        (dir, BlockChain::rebuild(store).unwrap())
    }

    #[test]
    fn rebuild_on_empty_store_has_no_tail() {
        let (_dir, chain) = fresh_chain();
        assert_eq!(chain.last_height(), None);
        assert_eq!(chain.total_tx_count(), 0);
    }

    #[test]
    fn add_block_extends_tail_and_counts_tx() {
        let (_dir, mut chain) = fresh_chain();
        let genesis = Block::genesis(1);
        chain.add_block(genesis.clone(), &[]).unwrap();

        let tx = Transaction::new(2, b"x".to_vec(), vec![]);
        let root = chaincore_types::block::merkle_root(std::slice::from_ref(&tx));
        let b1 = Block::new(genesis.block_hash(), 1, 2, root, vec![tx], BlockType::General, false);
        chain.add_block(b1.clone(), &[]).unwrap();

        assert_eq!(chain.last_height(), Some(1));
        assert_eq!(chain.total_tx_count(), 1);
        assert_eq!(chain.tail_hash(), Some(b1.block_hash()));
    }

    #[test]
    fn add_block_rejects_non_contiguous_height() {
        let (_dir, mut chain) = fresh_chain();
        let genesis = Block::genesis(1);
        chain.add_block(genesis.clone(), &[]).unwrap();

        let bad = Block::new(genesis.block_hash(), 5, 2, [0u8; 32], vec![], BlockType::General, false);
        let err = chain.add_block(bad, &[]).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn add_unconfirm_block_reports_height_and_hash_mismatches() {
        let (_dir, mut chain) = fresh_chain();
        let genesis = Block::genesis(1);
        chain.add_block(genesis.clone(), &[]).unwrap();

        let too_far = Block::new(genesis.block_hash(), 7, 2, [0u8; 32], vec![], BlockType::General, false);
        assert_eq!(chain.add_unconfirm_block(too_far), StageOutcome::HeightMismatch);

        let wrong_parent = Block::new([9u8; 32], 1, 2, [0u8; 32], vec![], BlockType::General, false);
        assert_eq!(chain.add_unconfirm_block(wrong_parent), StageOutcome::HashMismatch);
    }

    #[test]
    fn confirm_block_promotes_staged_proposal() {
        let (_dir, mut chain) = fresh_chain();
        let genesis = Block::genesis(1);
        chain.add_block(genesis.clone(), &[]).unwrap();

        let proposal = Block::new(genesis.block_hash(), 1, 2, [0u8; 32], vec![], BlockType::General, false);
        assert_eq!(chain.add_unconfirm_block(proposal.clone()), StageOutcome::Staged);

        let added = chain.confirm_block(proposal.block_hash(), &[]).unwrap();
        assert_eq!(added, 0);
        assert_eq!(chain.tail_hash(), Some(proposal.block_hash()));
    }

    #[test]
    fn confirm_block_unknown_hash_is_recoverable() {
        let (_dir, mut chain) = fresh_chain();
        let genesis = Block::genesis(1);
        chain.add_block(genesis, &[]).unwrap();

        let err = chain.confirm_block([42u8; 32], &[]).unwrap_err();
        assert!(!err.is_fatal());
    }
}
