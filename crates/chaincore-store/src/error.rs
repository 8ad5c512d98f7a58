//! Storage error taxonomy.
//!
//! One variant per failure mode, following the per-invariant error style used
//! throughout the storage layer this crate is modelled on.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The database could not be opened after exhausting all retries.
    #[error("failed to open chain store at {path} after {attempts} attempt(s): {source}")]
    Init {
        path: String,
        attempts: u32,
        #[source]
        source: rocksdb::Error,
    },

    #[error("store i/o error: {0}")]
    Io(#[from] rocksdb::Error),

    #[error("failed to encode value for key family {family}: {source}")]
    Encode {
        family: &'static str,
        #[source]
        source: bincode::Error,
    },

    #[error("failed to decode value for key family {family}: {source}")]
    Decode {
        family: &'static str,
        #[source]
        source: bincode::Error,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;
