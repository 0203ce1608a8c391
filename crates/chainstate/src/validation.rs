//! Context-free block checks and checkpoint rules.

use std::fmt;

use cjdcoind_consensus::constants::MAX_BLOCK_SIZE;
use cjdcoind_consensus::{Hash256, Params};
use cjdcoind_pow::difficulty::{check_proof_of_work, PowError};
use cjdcoind_primitives::Block;

// How deep a block must be buried before it can serve as a checkpoint.
const CHECKPOINT_CONFIRMATIONS: i64 = 2016;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValidationError {
    InvalidBlock(&'static str),
    Pow(PowError),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidBlock(message) => write!(f, "{message}"),
            ValidationError::Pow(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<PowError> for ValidationError {
    fn from(err: PowError) -> Self {
        ValidationError::Pow(err)
    }
}

/// Which checks to run while connecting a block. Callers replaying data they
/// already validated skip the expensive ones.
#[derive(Clone, Copy, Debug)]
pub struct ValidationFlags {
    pub check_sanity: bool,
    pub check_merkle: bool,
    pub check_pow: bool,
}

impl ValidationFlags {
    pub fn full() -> Self {
        Self {
            check_sanity: true,
            check_merkle: true,
            check_pow: true,
        }
    }

    /// For trusted replay: structural checks only.
    pub fn trusted() -> Self {
        Self {
            check_sanity: true,
            check_merkle: false,
            check_pow: false,
        }
    }
}

impl Default for ValidationFlags {
    fn default() -> Self {
        Self::full()
    }
}

/// Structural checks that need no chain context.
pub fn check_block_sanity(
    block: &Block,
    params: &Params,
    flags: &ValidationFlags,
) -> Result<(), ValidationError> {
    if block.transactions.is_empty() {
        return Err(ValidationError::InvalidBlock("block has no transactions"));
    }
    if !block.transactions[0].is_coinbase() {
        return Err(ValidationError::InvalidBlock(
            "first transaction is not a coinbase",
        ));
    }
    for tx in &block.transactions[1..] {
        if tx.is_coinbase() {
            return Err(ValidationError::InvalidBlock(
                "block has more than one coinbase",
            ));
        }
    }
    for tx in &block.transactions {
        if tx.vin.is_empty() {
            return Err(ValidationError::InvalidBlock("transaction has no inputs"));
        }
        if tx.vout.is_empty() {
            return Err(ValidationError::InvalidBlock("transaction has no outputs"));
        }
    }

    if block.consensus_encode().len() > MAX_BLOCK_SIZE as usize {
        return Err(ValidationError::InvalidBlock(
            "block exceeds the maximum block size",
        ));
    }

    if flags.check_merkle && block.compute_merkle_root() != block.header.merkle_root {
        return Err(ValidationError::InvalidBlock("merkle root mismatch"));
    }
    if flags.check_pow {
        check_proof_of_work(&block.block_hash(), block.header.bits, params.pow_limit)?;
    }
    Ok(())
}

/// Whether the block at a checkpoint height carries the recorded hash.
pub fn check_checkpoint(
    params: &Params,
    height: i64,
    block_hash: &Hash256,
) -> Result<(), ValidationError> {
    match params.checkpoint_at(height) {
        Some(checkpoint) if checkpoint.hash != *block_hash => Err(
            ValidationError::InvalidBlock("block hash disagrees with checkpoint"),
        ),
        _ => Ok(()),
    }
}

/// Whether a committed block is eligible to become a new hard-coded
/// checkpoint: past the latest existing checkpoint and buried deep enough
/// that a reorg across it is out of the question.
pub fn is_checkpoint_candidate(params: &Params, height: i64, tip_height: i64) -> bool {
    let after_latest = match params.latest_checkpoint() {
        Some(checkpoint) => height > checkpoint.height,
        None => height > 0,
    };
    after_latest && tip_height - height >= CHECKPOINT_CONFIRMATIONS
}
