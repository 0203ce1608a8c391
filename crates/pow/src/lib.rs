//! Proof-of-work target arithmetic.

pub mod difficulty;

pub use difficulty::{
    block_proof, compact_to_target, get_next_work_required, target_to_compact, CompactTarget,
    HeaderInfo,
};
