//! Invoke-result record.

use serde::{Deserialize, Serialize};

use crate::Hash;

/// Per-transaction output of `Executor::invoke`, stored immediately after
/// invocation succeeds during block confirmation. Must survive restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvokeResult {
    pub tx_hash: Hash,
    pub success: bool,
    /// Opaque result payload, interpreted by the application layer only.
    pub result_data: Vec<u8>,
}

impl InvokeResult {
    pub fn new(tx_hash: Hash, success: bool, result_data: Vec<u8>) -> Self {
        Self {
            tx_hash,
            success,
            result_data,
        }
    }
}
