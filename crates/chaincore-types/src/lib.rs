//! # Chaincore Types
//!
//! Shared domain entities for the channel block-management core:
//! transactions, blocks, peer identity, and the invoke-result record
//! produced by the on-chain `Executor`.
//!
//! Single source of truth so that `chaincore-store` and `chaincore-core`
//! depend on one set of types instead of redefining them at each boundary.

pub mod block;
pub mod invoke;
pub mod peer;
pub mod transaction;

pub use block::{Block, BlockType};
pub use invoke::InvokeResult;
pub use peer::{PeerId, Role};
pub use transaction::Transaction;

/// A 32-byte content hash (block hash, transaction hash, merkle root, …).
pub type Hash = [u8; 32];
