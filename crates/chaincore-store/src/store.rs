//! `ChainStore`: durable storage of blocks, height/tx indices, invoke
//! results, and node identity, backed by a single RocksDB instance.
//!
//! All writes that must land together (a confirmed block, its height index,
//! its transaction index entries, and its invoke results) go through one
//! `rocksdb::WriteBatch` so a crash never leaves the indices pointing at a
//! block the store doesn't have, or vice versa.

use std::path::{Path, PathBuf};

use chaincore_types::{Block, Hash, InvokeResult, PeerId};
use rocksdb::{DBCompressionType, Options, WriteBatch, WriteOptions, DB};

use crate::error::{StoreError, StoreResult};
use crate::keyspace::{block_key, height_key, invoke_key, meta_key, tx_key, META_LAST_HEIGHT, META_PEER_ID};

pub struct ChainStore {
    db: DB,
    sync_writes: bool,
}

impl ChainStore {
    pub const DEFAULT_MAX_RETRY: u32 = 3;

    /// Opens (creating if missing) the store at `path`. On failure the open
    /// is retried against `path-1`, `path-2`, … up to `max_retry` times
    /// before giving up — a corrupt lock file from an unclean shutdown on
    /// one path shouldn't prevent the node from starting at all.
    pub fn open(path: impl AsRef<Path>, max_retry: u32) -> StoreResult<Self> {
        Self::open_with_sync(path, max_retry, true)
    }

    pub fn open_with_sync(path: impl AsRef<Path>, max_retry: u32, sync_writes: bool) -> StoreResult<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        opts.set_compression_type(DBCompressionType::Snappy);

        let attempts = max_retry.max(1);
        let mut last_err = None;
        for attempt in 0..attempts {
            let candidate = retry_path(path.as_ref(), attempt);
            match DB::open(&opts, &candidate) {
                Ok(db) => return Ok(Self { db, sync_writes }),
                Err(err) => {
                    tracing::warn!(attempt, path = %candidate.display(), error = %err, "failed to open chain store");
                    last_err = Some(err);
                }
            }
        }
        Err(StoreError::Init {
            path: path.as_ref().display().to_string(),
            attempts,
            source: last_err.expect("loop runs at least once"),
        })
    }

    /// Atomically persists a confirmed block: the block itself, its height
    /// index entry, one transaction-index entry per confirmed transaction,
    /// any invoke results produced for those transactions, and the updated
    /// `last_height` marker.
    pub fn put_block(&self, block: &Block, invoke_results: &[InvokeResult]) -> StoreResult<()> {
        let mut batch = WriteBatch::default();
        let hash = block.block_hash();

        let encoded_block = bincode::serialize(block).map_err(|source| StoreError::Encode {
            family: "block",
            source,
        })?;
        batch.put(block_key(&hash), encoded_block);
        batch.put(height_key(block.height), hash);

        for tx in &block.confirmed_transaction_list {
            batch.put(tx_key(&tx.tx_hash), hash);
        }
        for result in invoke_results {
            let encoded = bincode::serialize(result).map_err(|source| StoreError::Encode {
                family: "invoke_result",
                source,
            })?;
            batch.put(invoke_key(&result.tx_hash), encoded);
        }
        batch.put(meta_key(META_LAST_HEIGHT), block.height.to_be_bytes());

        self.write_batch(batch)
    }

    pub fn get_block(&self, hash: &Hash) -> StoreResult<Option<Block>> {
        match self.db.get(block_key(hash))? {
            Some(bytes) => {
                let block = bincode::deserialize(&bytes).map_err(|source| StoreError::Decode {
                    family: "block",
                    source,
                })?;
                Ok(Some(block))
            }
            None => Ok(None),
        }
    }

    pub fn get_block_hash_at_height(&self, height: u64) -> StoreResult<Option<Hash>> {
        match self.db.get(height_key(height))? {
            Some(bytes) => Ok(Some(to_hash(&bytes))),
            None => Ok(None),
        }
    }

    pub fn get_last_height(&self) -> StoreResult<Option<u64>> {
        match self.db.get(meta_key(META_LAST_HEIGHT))? {
            Some(bytes) => Ok(Some(to_u64(&bytes))),
            None => Ok(None),
        }
    }

    pub fn find_tx_block_hash(&self, tx_hash: &Hash) -> StoreResult<Option<Hash>> {
        match self.db.get(tx_key(tx_hash))? {
            Some(bytes) => Ok(Some(to_hash(&bytes))),
            None => Ok(None),
        }
    }

    pub fn find_invoke_result(&self, tx_hash: &Hash) -> StoreResult<Option<InvokeResult>> {
        match self.db.get(invoke_key(tx_hash))? {
            Some(bytes) => {
                let result = bincode::deserialize(&bytes).map_err(|source| StoreError::Decode {
                    family: "invoke_result",
                    source,
                })?;
                Ok(Some(result))
            }
            None => Ok(None),
        }
    }

    pub fn read_peer_id(&self) -> StoreResult<Option<PeerId>> {
        match self.db.get(meta_key(META_PEER_ID))? {
            Some(bytes) if bytes.len() == 16 => {
                let mut buf = [0u8; 16];
                buf.copy_from_slice(&bytes);
                Ok(Some(PeerId::from_bytes(buf)))
            }
            Some(_) | None => Ok(None),
        }
    }

    /// Returns the stored peer id, writing `candidate` only if no id has
    /// ever been written. The peer-id key, once set, is never overwritten —
    /// a restart always reuses the identity a node was first assigned.
    pub fn write_peer_id_if_absent(&self, candidate: PeerId) -> StoreResult<PeerId> {
        if let Some(existing) = self.read_peer_id()? {
            return Ok(existing);
        }
        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(self.sync_writes);
        self.db
            .put_opt(meta_key(META_PEER_ID), candidate.as_bytes(), &write_opts)?;
        Ok(candidate)
    }

    /// Deletes every key this store owns. Used by `clear_all_blocks`; the
    /// node is expected to rebuild from genesis afterwards.
    pub fn clear_all(&self) -> StoreResult<()> {
        let mut batch = WriteBatch::default();
        let iter = self.db.iterator(rocksdb::IteratorMode::Start);
        for item in iter {
            let (key, _) = item?;
            batch.delete(key);
        }
        self.write_batch(batch)
    }

    fn write_batch(&self, batch: WriteBatch) -> StoreResult<()> {
        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(self.sync_writes);
        self.db.write_opt(batch, &write_opts)?;
        Ok(())
    }
}

fn retry_path(base: &Path, attempt: u32) -> PathBuf {
    if attempt == 0 {
        return base.to_path_buf();
    }
    let mut name = base.as_os_str().to_owned();
    name.push(format!("-retry{attempt}"));
    PathBuf::from(name)
}

fn to_hash(bytes: &[u8]) -> Hash {
    let mut hash = [0u8; 32];
    let len = bytes.len().min(32);
    hash[..len].copy_from_slice(&bytes[..len]);
    hash
}

fn to_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    let len = bytes.len().min(8);
    buf[..len].copy_from_slice(&bytes[..len]);
    u64::from_be_bytes(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chaincore_types::{BlockType, Transaction};
    use tempfile::TempDir;

    fn open_test_store() -> (TempDir, ChainStore) {
        let dir = TempDir::new().expect("tempdir");
        let store = ChainStore::open_with_sync(dir.path(), 1, false).expect("open store");
        (dir, store)
    }

    #[test]
    fn put_and_get_block_round_trips() {
        let (_dir, store) = open_test_store();
        let block = Block::genesis(1_000);
        store.put_block(&block, &[]).unwrap();

        let fetched = store.get_block(&block.block_hash()).unwrap().unwrap();
        assert_eq!(fetched.block_hash(), block.block_hash());
        assert_eq!(store.get_last_height().unwrap(), Some(0));
        assert_eq!(
            store.get_block_hash_at_height(0).unwrap(),
            Some(block.block_hash())
        );
    }

    #[test]
    fn put_block_indexes_transactions_and_invoke_results() {
        let (_dir, store) = open_test_store();
        let tx = Transaction::new(1, b"payload".to_vec(), vec![]);
        let root = chaincore_types::block::merkle_root(std::slice::from_ref(&tx));
        let block = Block::new([0u8; 32], 1, 2_000, root, vec![tx.clone()], BlockType::General, false);
        let invoke = InvokeResult::new(tx.tx_hash, true, b"ok".to_vec());

        store.put_block(&block, &[invoke.clone()]).unwrap();

        assert_eq!(
            store.find_tx_block_hash(&tx.tx_hash).unwrap(),
            Some(block.block_hash())
        );
        let fetched_invoke = store.find_invoke_result(&tx.tx_hash).unwrap().unwrap();
        assert_eq!(fetched_invoke.result_data, invoke.result_data);
    }

    #[test]
    fn peer_id_is_written_once_and_reused() {
        let (_dir, store) = open_test_store();
        assert_eq!(store.read_peer_id().unwrap(), None);

        let first = PeerId::new();
        let accepted = store.write_peer_id_if_absent(first).unwrap();
        assert_eq!(accepted, first);

        let second = PeerId::new();
        let still_first = store.write_peer_id_if_absent(second).unwrap();
        assert_eq!(still_first, first);
        assert_eq!(store.read_peer_id().unwrap(), Some(first));
    }

    #[test]
    fn missing_block_is_none() {
        let (_dir, store) = open_test_store();
        assert_eq!(store.get_block(&[9u8; 32]).unwrap(), None);
        assert_eq!(store.get_last_height().unwrap(), None);
    }
}
