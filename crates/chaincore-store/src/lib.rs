//! # Chaincore Store
//!
//! Durable storage for confirmed blocks, the height and transaction indices
//! built over them, invoke results, and this node's persisted identity.
//!
//! Built on [`rocksdb`], the same engine used for block storage elsewhere in
//! this codebase. Unlike a multi-column-family layout, everything here lives
//! in one flat keyspace partitioned by a one-byte family prefix (see
//! [`keyspace`]) — the simpler scheme matches the reserved-key design this
//! store is replacing.

pub mod error;
pub mod keyspace;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use store::ChainStore;
