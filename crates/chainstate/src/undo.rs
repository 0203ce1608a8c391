//! Per-block journal of spent-bit mutations, recorded at insertion so
//! rollback restores exactly the bits that were set.

use cjdcoind_consensus::Hash256;
use cjdcoind_primitives::encoding::{DecodeError, Decoder, Encoder};

/// One bit set while connecting a block: which entry in the txid's list,
/// and which output bit.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SpentRef {
    pub txid: Hash256,
    /// Index into the txid's entry list at the time the bit was set. The
    /// list is append-only until rollback, so the index stays valid.
    pub entry_index: u32,
    pub output: u32,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BlockUndo {
    /// In the order the bits were set (transaction order, then input order).
    pub spent: Vec<SpentRef>,
}

impl BlockUndo {
    pub fn encode(&self) -> Vec<u8> {
        let mut encoder = Encoder::with_capacity(9 + self.spent.len() * 40);
        encoder.write_var_int(self.spent.len() as u64);
        for spent in &self.spent {
            encoder.write_hash(&spent.txid);
            encoder.write_u32_le(spent.entry_index);
            encoder.write_u32_le(spent.output);
        }
        encoder.into_inner()
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut decoder = Decoder::new(bytes);
        let count = decoder.read_var_int()?;
        if count > decoder.remaining() as u64 {
            return Err(DecodeError::UnexpectedEnd);
        }
        let mut spent = Vec::with_capacity(count as usize);
        for _ in 0..count {
            spent.push(SpentRef {
                txid: decoder.read_hash()?,
                entry_index: decoder.read_u32_le()?,
                output: decoder.read_u32_le()?,
            });
        }
        if !decoder.is_empty() {
            return Err(DecodeError::TrailingBytes);
        }
        Ok(Self { spent })
    }
}

#[cfg(test)]
mod tests {
    use super::{BlockUndo, SpentRef};

    #[test]
    fn journal_roundtrip() {
        let undo = BlockUndo {
            spent: vec![
                SpentRef {
                    txid: [3u8; 32],
                    entry_index: 0,
                    output: 1,
                },
                SpentRef {
                    txid: [4u8; 32],
                    entry_index: 2,
                    output: 0,
                },
            ],
        };
        assert_eq!(BlockUndo::decode(&undo.encode()).expect("decode"), undo);
        assert_eq!(
            BlockUndo::decode(&BlockUndo::default().encode()).expect("decode"),
            BlockUndo::default()
        );
    }
}
