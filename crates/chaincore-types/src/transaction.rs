//! Transaction entity.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::Hash;

/// An opaque client transaction. `data` is interpreted only by the
/// `Executor` collaborator; the core treats it as bytes.
///
/// Immutable once minted into a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub tx_hash: Hash,
    pub timestamp: u64,
    pub data: Vec<u8>,
    pub signature: Vec<u8>,
}

impl Transaction {
    /// Builds a transaction and derives its content hash from
    /// `(timestamp, data, signature)`.
    pub fn new(timestamp: u64, data: Vec<u8>, signature: Vec<u8>) -> Self {
        let tx_hash = Self::compute_hash(timestamp, &data, &signature);
        Self {
            tx_hash,
            timestamp,
            data,
            signature,
        }
    }

    fn compute_hash(timestamp: u64, data: &[u8], signature: &[u8]) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update(timestamp.to_le_bytes());
        hasher.update(data);
        hasher.update(signature);
        hasher.finalize().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let a = Transaction::new(1, b"payload".to_vec(), vec![1, 2, 3]);
        let b = Transaction::new(1, b"payload".to_vec(), vec![1, 2, 3]);
        assert_eq!(a.tx_hash, b.tx_hash);
    }

    #[test]
    fn distinct_payloads_hash_differently() {
        let a = Transaction::new(1, b"payload-a".to_vec(), vec![]);
        let b = Transaction::new(1, b"payload-b".to_vec(), vec![]);
        assert_ne!(a.tx_hash, b.tx_hash);
    }
}
