use cjdcoind_consensus::Hash256;

use crate::encoding::{DecodeError, Decoder, Encoder};

/// Reference to an output of a prior transaction.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct OutPoint {
    pub hash: Hash256,
    pub index: u32,
}

impl OutPoint {
    pub const NULL_INDEX: u32 = u32::MAX;

    pub fn null() -> Self {
        Self {
            hash: [0u8; 32],
            index: Self::NULL_INDEX,
        }
    }

    /// Coinbase inputs reference the null outpoint.
    pub fn is_null(&self) -> bool {
        self.index == Self::NULL_INDEX && self.hash == [0u8; 32]
    }

    pub fn encode(&self, encoder: &mut Encoder) {
        encoder.write_hash(&self.hash);
        encoder.write_u32_le(self.index);
    }

    pub fn decode(decoder: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        let hash = decoder.read_hash()?;
        let index = decoder.read_u32_le()?;
        Ok(Self { hash, index })
    }
}
