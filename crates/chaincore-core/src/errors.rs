//! Error taxonomy for the chain, consensus, and manager layers.
//!
//! One variant per invariant violation, each carrying enough context to log
//! usefully. `ChainError::Corrupt` and `ChainError::Diverged` are the fatal
//! kinds that must abort the worker task; everything else is recoverable.

use chaincore_types::Hash;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("chain store is corrupt: {0}")]
    Corrupt(String),

    #[error("chain diverged from the confirmed tail: {0}")]
    Diverged(String),

    /// `confirm_block` was asked to promote a hash with no matching staged
    /// proposal. Recoverable: callers must trigger height sync.
    #[error("no staged unconfirmed block matches hash {0:02x?}")]
    UnconfirmedNotFound(Hash),

    #[error(transparent)]
    Store(#[from] chaincore_store::StoreError),

    #[error("transaction payload could not be decoded: {0}")]
    TxDecode(#[from] bincode::Error),
}

pub type ChainResult<T> = Result<T, ChainError>;

impl ChainError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, ChainError::Corrupt(_) | ChainError::Diverged(_))
    }
}

#[derive(Debug, Error)]
pub enum ConsensusError {
    #[error("validation failed: {0}")]
    Validation(String),
}

pub type ConsensusResult<T> = Result<T, ConsensusError>;

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Consensus(#[from] ConsensusError),

    #[error("worker command channel closed")]
    ChannelClosed,
}

pub type ManagerResult<T> = Result<T, ManagerError>;

impl ManagerError {
    pub fn is_fatal(&self) -> bool {
        match self {
            ManagerError::Chain(e) => e.is_fatal(),
            ManagerError::Consensus(_) => false,
            ManagerError::ChannelClosed => false,
        }
    }
}
