//! Consensus-wide constants shared across validation.

/// The maximum allowed size for a serialized block, in bytes (network rule).
pub const MAX_BLOCK_SIZE: u32 = 1_000_000;
/// The maximum allowed size of a raw script, in bytes (network rule).
pub const MAX_SCRIPT_SIZE: usize = 10_000;
/// The maximum allowed size of a single pushed script element (network rule).
pub const MAX_SCRIPT_ELEMENT_SIZE: usize = 520;
/// Coinbase transaction outputs can only be spent after this number of new
/// blocks on every built-in network.
pub const COINBASE_MATURITY: u16 = 100;
