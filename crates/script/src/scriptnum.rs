//! Minimal sign-magnitude little-endian number encoding used on the stack.

use crate::ScriptError;

// A magnitude needs at most 8 bytes once padding is stripped; the top
// magnitude bit of an 8-byte value collides with i64 range.
const MAX_SIGNIFICANT_BYTES: usize = 8;

/// Encodes a number as the shortest sign-magnitude little-endian byte
/// string: empty for zero, high bit of the final byte carrying the sign.
pub fn encode_script_num(value: i64) -> Vec<u8> {
    if value == 0 {
        return Vec::new();
    }

    let negative = value < 0;
    let mut magnitude = value.unsigned_abs();
    let mut out = Vec::with_capacity(9);
    while magnitude > 0 {
        out.push((magnitude & 0xff) as u8);
        magnitude >>= 8;
    }

    // If the most significant byte already carries the 0x80 bit, the sign
    // needs a byte of its own.
    let top = *out.last().unwrap_or(&0);
    if top & 0x80 != 0 {
        out.push(if negative { 0x80 } else { 0x00 });
    } else if negative {
        let last = out.len() - 1;
        out[last] |= 0x80;
    }
    out
}

/// Decodes a sign-magnitude little-endian byte string. Leading zero bytes
/// are tolerated, negative zero decodes to 0, and anything whose magnitude
/// does not fit a signed 64-bit integer fails.
pub fn decode_script_num(bytes: &[u8]) -> Result<i64, ScriptError> {
    if bytes.is_empty() {
        return Ok(0);
    }

    let negative = bytes[bytes.len() - 1] & 0x80 != 0;
    let mut magnitude_bytes = bytes.to_vec();
    let last = magnitude_bytes.len() - 1;
    magnitude_bytes[last] &= 0x7f;
    while magnitude_bytes.last() == Some(&0) {
        magnitude_bytes.pop();
    }

    if magnitude_bytes.len() > MAX_SIGNIFICANT_BYTES {
        return Err(ScriptError::InvalidStackOperation);
    }
    let mut magnitude: u64 = 0;
    for (index, byte) in magnitude_bytes.iter().enumerate() {
        magnitude |= (*byte as u64) << (8 * index);
    }
    if magnitude > i64::MAX as u64 {
        return Err(ScriptError::InvalidStackOperation);
    }

    let value = magnitude as i64;
    Ok(if negative { -value } else { value })
}
