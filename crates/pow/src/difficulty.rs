//! Compact-target encoding and per-block work.
//!
//! The compact form packs a 256-bit target into 32 bits the way a floating
//! point number would: one exponent byte followed by a 23-bit mantissa and a
//! sign bit.

use cjdcoind_consensus::{Hash256, Params};
use primitive_types::{U256, U512};

pub type CompactTarget = u32;

const SIGN_BIT: u32 = 0x0080_0000;
const MANTISSA_MASK: u32 = 0x007f_ffff;

/// Expanded form of a compact target. Consensus code treats negative and
/// overflowing encodings as invalid but they are representable on the wire,
/// so decoding reports them rather than failing.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ExpandedTarget {
    pub value: U256,
    pub negative: bool,
    pub overflow: bool,
}

/// Converts the compact representation into a 256-bit target.
pub fn compact_to_target(compact: CompactTarget) -> ExpandedTarget {
    let mantissa = compact & MANTISSA_MASK;
    let negative = compact & SIGN_BIT != 0 && mantissa != 0;
    let exponent = compact >> 24;

    if exponent <= 3 {
        let value = U256::from(mantissa >> (8 * (3 - exponent)));
        return ExpandedTarget {
            value,
            negative,
            overflow: false,
        };
    }

    let shift = 8 * (exponent - 3);
    // 256 bits hold the mantissa's 3 bytes shifted by at most 29 bytes.
    let overflow = mantissa != 0 && shift > 8 * 29;
    let value = if overflow {
        U256::zero()
    } else {
        U256::from(mantissa) << shift
    };
    ExpandedTarget {
        value,
        negative,
        overflow,
    }
}

/// Converts a 256-bit target into compact representation, the inverse of
/// [`compact_to_target`] up to canonicalization.
pub fn target_to_compact(target: U256) -> CompactTarget {
    if target.is_zero() {
        return 0;
    }

    let bits = 256 - target.leading_zeros() as usize;
    let mut exponent = bits.div_ceil(8) as u32;
    let mut mantissa = if exponent <= 3 {
        target.low_u32() << (8 * (3 - exponent))
    } else {
        (target >> (8 * (exponent - 3))).low_u32()
    };

    // Normalize a mantissa that collides with the sign bit.
    if mantissa & SIGN_BIT != 0 {
        mantissa >>= 8;
        exponent += 1;
    }

    (exponent << 24) | mantissa
}

/// The hash interpreted as a 256-bit big-endian number, for comparison
/// against a target.
pub fn hash_to_work_value(hash: &Hash256) -> U256 {
    U256::from_little_endian(hash)
}

/// Amount of work a block with the given bits adds to its chain:
/// 2^256 / (target + 1), saturated for degenerate targets.
pub fn block_proof(bits: CompactTarget) -> U256 {
    let expanded = compact_to_target(bits);
    if expanded.negative || expanded.overflow || expanded.value.is_zero() {
        return U256::zero();
    }
    // (2^256 - 1 - target) / (target + 1) + 1 avoids the unrepresentable
    // 2^256 numerator.
    (U256::MAX - expanded.value) / (expanded.value + 1) + 1
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PowError {
    /// The claimed target is negative, zero, or overflows 256 bits.
    InvalidTarget,
    /// The claimed target is easier than the network allows.
    TargetTooHigh,
    /// The block hash does not meet the claimed target.
    InsufficientWork,
    /// The header window does not reach back to the retarget boundary.
    MissingHeaders,
}

impl std::fmt::Display for PowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PowError::InvalidTarget => write!(f, "invalid proof of work target"),
            PowError::TargetTooHigh => write!(f, "target exceeds the proof of work limit"),
            PowError::InsufficientWork => write!(f, "block hash does not meet the target"),
            PowError::MissingHeaders => {
                write!(f, "not enough headers to compute the next target")
            }
        }
    }
}

impl std::error::Error for PowError {}

/// The header facts difficulty calculation needs.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct HeaderInfo {
    pub height: i64,
    pub time: i64,
    pub bits: CompactTarget,
}

/// Compact target required for the block after the last header in `window`.
///
/// `window` is ordered oldest to newest and must include the first header of
/// the current retarget period when the next block sits on a boundary.
/// `next_time` is the prospective timestamp of the block being built, used
/// only by the reduced-minimum-difficulty rule of test networks.
pub fn get_next_work_required(
    window: &[HeaderInfo],
    next_time: Option<i64>,
    params: &Params,
) -> Result<CompactTarget, PowError> {
    let Some(last) = window.last() else {
        // The genesis block starts at the limit.
        return Ok(params.pow_limit_bits);
    };

    let per_block = params.target_time_per_block.as_secs() as i64;
    let timespan = params.target_timespan.as_secs() as i64;
    let blocks_per_retarget = timespan / per_block;

    if (last.height + 1) % blocks_per_retarget != 0 {
        if params.reduce_min_difficulty {
            // Enough idle time lets a block in at the minimum difficulty.
            if let Some(next_time) = next_time {
                let reduction_time = params.min_diff_reduction_time.as_secs() as i64;
                if next_time > last.time + reduction_time {
                    return Ok(params.pow_limit_bits);
                }
            }
            // Otherwise continue from the last real difficulty, skipping
            // any special minimum-difficulty blocks.
            for header in window.iter().rev() {
                if header.height % blocks_per_retarget == 0
                    || header.bits != params.pow_limit_bits
                {
                    return Ok(header.bits);
                }
            }
            return Ok(params.pow_limit_bits);
        }
        return Ok(last.bits);
    }

    // Retarget boundary: scale the old target by the actual timespan of the
    // closing period, clamped by the adjustment factor.
    let first_height = last.height + 1 - blocks_per_retarget;
    let first = window
        .iter()
        .find(|header| header.height == first_height)
        .ok_or(PowError::MissingHeaders)?;

    let actual = (last.time - first.time).clamp(
        timespan / params.retarget_adjustment_factor,
        timespan * params.retarget_adjustment_factor,
    );

    let old_target = compact_to_target(last.bits);
    if old_target.negative || old_target.overflow || old_target.value.is_zero() {
        return Err(PowError::InvalidTarget);
    }
    // The intermediate product can exceed 256 bits for easy targets.
    let scaled = U512::from(old_target.value) * U512::from(actual as u64)
        / U512::from(timespan as u64);
    let new_target = U256::try_from(scaled).unwrap_or(params.pow_limit);

    Ok(target_to_compact(new_target.min(params.pow_limit)))
}

/// Checks a block hash against its claimed compact target and the network
/// proof-of-work limit.
pub fn check_proof_of_work(
    block_hash: &Hash256,
    bits: CompactTarget,
    pow_limit: U256,
) -> Result<(), PowError> {
    let expanded = compact_to_target(bits);
    if expanded.negative || expanded.overflow || expanded.value.is_zero() {
        return Err(PowError::InvalidTarget);
    }
    if expanded.value > pow_limit {
        return Err(PowError::TargetTooHigh);
    }
    if hash_to_work_value(block_hash) > expanded.value {
        return Err(PowError::InsufficientWork);
    }
    Ok(())
}
