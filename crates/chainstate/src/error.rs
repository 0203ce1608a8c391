use std::fmt;

use cjdcoind_storage::StoreError;

use crate::flatfiles::FlatFileError;
use crate::validation::ValidationError;

#[derive(Debug)]
pub enum ChainDbError {
    Store(StoreError),
    FlatFile(FlatFileError),
    Validation(ValidationError),
    /// No committed block has the requested hash.
    BlockNotFound,
    /// The requested height is negative or beyond the tip.
    HeightNotFound,
    /// No committed transaction has the requested txid.
    TxNotFound,
    /// Every committed occurrence of the txid is fully spent.
    NoUnspentTx,
    /// An input consumes an output that is already spent or unknown.
    DoubleSpend,
    /// The block's previous hash does not match the current tip.
    PrevHashMismatch,
    /// The block hash is already committed.
    DuplicateBlock,
    /// A block at a checkpoint height carries the wrong hash.
    BadCheckpoint,
    /// An earlier I/O fault left the engine degraded.
    Degraded,
    /// Stored data failed to decode; the database needs a resync.
    CorruptIndex(&'static str),
}

impl fmt::Display for ChainDbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainDbError::Store(err) => write!(f, "{err}"),
            ChainDbError::FlatFile(err) => write!(f, "{err}"),
            ChainDbError::Validation(err) => write!(f, "{err}"),
            ChainDbError::BlockNotFound => write!(f, "block not found"),
            ChainDbError::HeightNotFound => write!(f, "height out of range"),
            ChainDbError::TxNotFound => write!(f, "transaction not found"),
            ChainDbError::NoUnspentTx => write!(f, "transaction fully spent"),
            ChainDbError::DoubleSpend => write!(f, "output already spent"),
            ChainDbError::PrevHashMismatch => {
                write!(f, "previous hash does not match the chain tip")
            }
            ChainDbError::DuplicateBlock => write!(f, "block already committed"),
            ChainDbError::BadCheckpoint => write!(f, "block hash disagrees with checkpoint"),
            ChainDbError::Degraded => write!(f, "engine degraded by an earlier i/o fault"),
            ChainDbError::CorruptIndex(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for ChainDbError {}

impl From<StoreError> for ChainDbError {
    fn from(err: StoreError) -> Self {
        ChainDbError::Store(err)
    }
}

impl From<FlatFileError> for ChainDbError {
    fn from(err: FlatFileError) -> Self {
        ChainDbError::FlatFile(err)
    }
}

impl From<ValidationError> for ChainDbError {
    fn from(err: ValidationError) -> Self {
        ChainDbError::Validation(err)
    }
}
